/// Intermediate representation produced by the annotation parser.
///
/// One `ParsedTemplate` is created per input file and consumed exactly once
/// by the code generator. All collections preserve encounter order so that
/// generation is deterministic and diff-stable.

use std::path::PathBuf;

use serde::Serialize;

/// The parsed form of one annotated HTML email template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTemplate {
    /// Source location, for diagnostics only.
    pub file_path: PathBuf,
    /// Extracted subject line text; empty when no subject was declared.
    pub subject: String,
    /// Template body with all directive lines stripped.
    pub html: String,
    /// Record types declared via dotted `@type` annotations, in first-mention order.
    pub structs: Vec<ParsedStruct>,
    /// Top-level variables, declared or inferred, in encounter order.
    pub variables: Vec<ParsedVariable>,
    /// Distinct type names that appeared in any annotation, in first-use order.
    pub types: Vec<String>,
}

impl ParsedTemplate {
    /// Whether a non-empty subject template was declared.
    pub fn has_subject(&self) -> bool {
        !self.subject.is_empty()
    }

    /// The file stem the generated unit is named after (`simple.html` -> `simple`).
    pub fn file_stem(&self) -> &str {
        self.file_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("")
    }
}

/// A record type built up from dotted `@type Parent.Field` annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedStruct {
    pub name: String,
    /// Fields in encounter order within the source text.
    pub fields: Vec<ParsedField>,
}

/// One field of a [`ParsedStruct`].
///
/// The type is carried as an opaque string; an empty type means the field is
/// itself struct-typed by its own name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedField {
    pub name: String,
    pub ty: String,
}

/// A top-level (non-nested) variable with an opaque type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedVariable {
    pub name: String,
    pub ty: String,
}
