//! Annotation parser for typed HTML email templates.
//!
//! Reads one template's text, extracts directives (subject line, type
//! declarations) and bare `{{name}}` variable references, and produces a
//! [`ParsedTemplate`] free of directive syntax. Malformed directives are
//! never an error; they are carried through as body text.

pub mod ast;
pub mod directive;
pub mod error;
pub mod idents;

pub use ast::{ParsedField, ParsedStruct, ParsedTemplate, ParsedVariable};
pub use directive::Directive;
pub use error::ParseError;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::idents::upper_first;

/// Matches bare placeholder variables like `{{var}}` or `{{- var -}}`
/// (no dots, no calls). Trim markers must sit directly against the braces,
/// the same grammar the generator's normalization pass accepts.
static SIMPLE_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{-?\s*([A-Za-z][A-Za-z0-9_]*)\s*-?\}\}").unwrap());

/// Parse template text into its intermediate representation.
///
/// The path is recorded for diagnostics and output naming only; no I/O is
/// performed here.
pub fn parse_str(path: impl Into<PathBuf>, text: &str) -> ParsedTemplate {
    let mut subject = String::new();
    let mut html = String::new();
    let mut structs: IndexMap<String, ParsedStruct> = IndexMap::new();
    let mut variables: Vec<ParsedVariable> = Vec::new();
    let mut types: IndexSet<String> = IndexSet::new();

    for line in text.lines() {
        match directive::classify(line) {
            Directive::Subject(text) => {
                // First subject wins; later subject lines are still
                // stripped from the body but their text is ignored.
                if subject.is_empty() {
                    subject = text.to_string();
                }
            }
            Directive::TypeDecl { name, ty } => {
                apply_type_decl(name, ty, &mut structs, &mut variables, &mut types);
            }
            Directive::Body => {
                html.push_str(line);
                html.push('\n');
            }
        }
    }

    let mut template = ParsedTemplate {
        file_path: path.into(),
        subject,
        html,
        structs: structs.into_values().collect(),
        variables,
        types: types.into_iter().collect(),
    };
    infer_simple_variables(&mut template);
    template
}

/// Parse one template file. Fails only if the file cannot be read.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedTemplate, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(path, &text))
}

/// Parse every `*.html` file under a directory tree, fail-fast on the first
/// file that cannot be read. Files are visited in sorted order so the
/// aggregate is deterministic.
pub fn parse_dir(dir: impl AsRef<Path>) -> Result<Vec<ParsedTemplate>, ParseError> {
    let dir = dir.as_ref();
    let pattern = dir.join("**").join("*.html");
    let paths =
        glob::glob(&pattern.to_string_lossy()).map_err(|source| ParseError::Pattern {
            dir: dir.to_path_buf(),
            source,
        })?;

    let mut templates = Vec::new();
    for entry in paths {
        templates.push(parse_file(entry?)?);
    }
    Ok(templates)
}

/// Apply one `@type` declaration to the accumulating template state.
///
/// Structs are stored in an insertion-ordered map with idempotent
/// get-or-create, so an implicit dotted mention and an explicit bare
/// declaration converge to the same record regardless of order.
fn apply_type_decl(
    name: &str,
    ty: Option<&str>,
    structs: &mut IndexMap<String, ParsedStruct>,
    variables: &mut Vec<ParsedVariable>,
    types: &mut IndexSet<String>,
) {
    match name.split_once('.') {
        None => match ty {
            // Bare name without a type declares an (initially empty) struct.
            None => {
                ensure_struct(structs, name);
            }
            // Bare name with a type declares a top-level variable; the
            // first declaration of a name wins.
            Some(ty) => {
                if variables.iter().any(|v| v.name == name) {
                    return;
                }
                variables.push(ParsedVariable {
                    name: name.to_string(),
                    ty: ty.to_string(),
                });
                types.insert(ty.to_string());
            }
        },
        Some((parent, child)) => {
            if let Some(ty) = ty {
                types.insert(ty.to_string());
            }
            ensure_struct(structs, parent).fields.push(ParsedField {
                name: upper_first(child),
                ty: ty.unwrap_or_default().to_string(),
            });
        }
    }
}

fn ensure_struct<'a>(
    structs: &'a mut IndexMap<String, ParsedStruct>,
    name: &str,
) -> &'a mut ParsedStruct {
    let struct_name = upper_first(name);
    structs
        .entry(struct_name.clone())
        .or_insert_with(|| ParsedStruct {
            name: struct_name,
            fields: Vec::new(),
        })
}

/// Scan the subject and body for simple `{{var}}` placeholders and record
/// any name without a prior declaration as a `string`-typed variable.
///
/// Names whose normalized form collides with a declared struct name are
/// skipped: the reference would be ambiguous.
fn infer_simple_variables(template: &mut ParsedTemplate) {
    let mut candidates: IndexSet<String> = IndexSet::new();
    for text in [&template.subject, &template.html] {
        for caps in SIMPLE_VAR_RE.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                candidates.insert(name.as_str().to_string());
            }
        }
    }

    for name in candidates {
        if template.variables.iter().any(|v| v.name == name) {
            continue;
        }
        let normalized = upper_first(&name);
        if template
            .structs
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&normalized))
        {
            continue;
        }
        template.variables.push(ParsedVariable {
            name,
            ty: "string".to_string(),
        });
        if !template.types.iter().any(|t| t == "string") {
            template.types.push("string".to_string());
        }
    }
}
