/// Per-line directive classifier.
///
/// A line matches at most one directive kind, checked in priority order:
/// subject, then type declaration, then body. A directive must occupy its
/// own line; anything else, including malformed directive syntax, is body
/// text.

use once_cell::sync::Lazy;
use regex::Regex;

static SUBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<!--\s*\$Subject:\s*(.*?)\s*-->\s*$").unwrap());

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<!--\s*@type\s+([A-Za-z0-9_.]+)\s*([\[\]A-Za-z0-9_.]*)\s*-->\s*$").unwrap()
});

/// Classified form of one template line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    /// `<!-- $Subject: text -->`, with the text trimmed.
    Subject(&'a str),
    /// `<!-- @type name [type] -->`; the name may be dotted (`Parent.Field`).
    TypeDecl { name: &'a str, ty: Option<&'a str> },
    /// Ordinary body text.
    Body,
}

/// Classify a single line of template text.
pub fn classify(line: &str) -> Directive<'_> {
    if let Some(caps) = SUBJECT_RE.captures(line) {
        if let Some(text) = caps.get(1) {
            return Directive::Subject(text.as_str());
        }
    }
    if let Some(caps) = TYPE_RE.captures(line) {
        if let Some(name) = caps.get(1) {
            let ty = caps.get(2).map(|m| m.as_str()).filter(|t| !t.is_empty());
            return Directive::TypeDecl {
                name: name.as_str(),
                ty,
            };
        }
    }
    Directive::Body
}
