/// Code generation module
///
/// Transforms parsed email templates into self-contained Rust modules. Each
/// template yields one `<stem>.email.rs` unit holding a data struct, a
/// result struct, normalized template constants, and a rendering function
/// built on `tera`. A `mod.rs` aggregator makes the output directory a
/// usable module tree.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use mailforge_parser::idents::{exported_name, screaming_case, snake_case, upper_first};
use mailforge_parser::{ParsedStruct, ParsedTemplate};

use crate::error::{CompileError, Result};

/// Matches placeholders to normalize: a bare identifier or a single dotted
/// `Parent.Field` path, with optional trim markers.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(-?)\s*([A-Za-z][A-Za-z0-9_]*(?:\.[A-Za-z][A-Za-z0-9_]*)?)\s*(-?)\}\}")
        .unwrap()
});

/// Rust source generator for one parsed template.
pub struct CodeGenerator {
    /// Output buffer
    output: String,
}

impl CodeGenerator {
    /// Create a new code generator
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Generate the complete Rust module for one parsed template.
    pub fn generate(&mut self, template: &ParsedTemplate, version: &str) -> Result<String> {
        let base = exported_name(template.file_stem());
        let snake = snake_case(&base);
        let screaming = screaming_case(&base);

        self.generate_header(template, version)?;
        self.generate_data_struct(template, &base)?;
        for decl in &template.structs {
            self.generate_nested_struct(decl)?;
        }
        self.generate_result_struct(&base)?;
        self.generate_constants(template, &screaming)?;
        self.generate_render_fn(template, &base, &snake, &screaming)?;

        Ok(std::mem::take(&mut self.output))
    }

    fn generate_header(&mut self, template: &ParsedTemplate, version: &str) -> Result<()> {
        let source = template
            .file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("<unknown>");
        writeln!(
            self.output,
            "// Code generated by mailforge {version} from {source}. DO NOT EDIT."
        )?;
        writeln!(self.output)?;
        writeln!(self.output, "use serde::Serialize;")?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Generate the data struct: one field per top-level variable plus one
    /// per declared struct, in encounter order.
    fn generate_data_struct(&mut self, template: &ParsedTemplate, base: &str) -> Result<()> {
        writeln!(
            self.output,
            "/// Variables substituted into the {base} email templates."
        )?;
        writeln!(self.output, "#[derive(Debug, Clone, Serialize)]")?;
        writeln!(self.output, "#[allow(non_snake_case)]")?;
        if template.variables.is_empty() && template.structs.is_empty() {
            writeln!(self.output, "pub struct {base}EmailData {{}}")?;
        } else {
            writeln!(self.output, "pub struct {base}EmailData {{")?;
            for variable in &template.variables {
                writeln!(
                    self.output,
                    "    pub {}: {},",
                    upper_first(&variable.name),
                    rust_type(&variable.ty)
                )?;
            }
            for decl in &template.structs {
                writeln!(self.output, "    pub {}: {},", decl.name, decl.name)?;
            }
            writeln!(self.output, "}}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    /// Generate a nested struct declared via dotted annotations. Field types
    /// are carried verbatim through [`rust_type`]; an empty type means the
    /// field is struct-typed by its own name.
    fn generate_nested_struct(&mut self, decl: &ParsedStruct) -> Result<()> {
        writeln!(self.output, "#[derive(Debug, Clone, Serialize)]")?;
        writeln!(self.output, "#[allow(non_snake_case)]")?;
        if decl.fields.is_empty() {
            writeln!(self.output, "pub struct {} {{}}", decl.name)?;
        } else {
            writeln!(self.output, "pub struct {} {{", decl.name)?;
            for field in &decl.fields {
                let ty = if field.ty.is_empty() {
                    field.name.clone()
                } else {
                    rust_type(&field.ty)
                };
                writeln!(self.output, "    pub {}: {},", field.name, ty)?;
            }
            writeln!(self.output, "}}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn generate_result_struct(&mut self, base: &str) -> Result<()> {
        writeln!(self.output, "/// Rendered subject and body.")?;
        writeln!(self.output, "#[derive(Debug, Clone)]")?;
        writeln!(self.output, "#[allow(non_snake_case)]")?;
        writeln!(self.output, "pub struct {base}EmailResult {{")?;
        writeln!(self.output, "    pub Subject: String,")?;
        writeln!(self.output, "    pub HTML: String,")?;
        writeln!(self.output, "}}")?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Embed the normalized templates as constants. The subject constant is
    /// omitted entirely when no subject was declared.
    fn generate_constants(&mut self, template: &ParsedTemplate, screaming: &str) -> Result<()> {
        if template.has_subject() {
            writeln!(
                self.output,
                "const {screaming}_EMAIL_SUBJECT_TEMPLATE: &str = {};",
                raw_string_literal(&normalize_template(&template.subject))
            )?;
            writeln!(self.output)?;
        }
        writeln!(
            self.output,
            "const {screaming}_EMAIL_HTML_TEMPLATE: &str = {};",
            raw_string_literal(&normalize_template(&template.html))
        )?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Generate the render function. The body template is registered under
    /// a `.html` name so tera's HTML auto-escaping applies; the subject
    /// renders as plain text. Without a subject, nothing subject-related is
    /// emitted and the result carries an empty subject string.
    fn generate_render_fn(
        &mut self,
        template: &ParsedTemplate,
        base: &str,
        snake: &str,
        screaming: &str,
    ) -> Result<()> {
        writeln!(
            self.output,
            "/// Render the {snake} email with the supplied data."
        )?;
        writeln!(self.output, "#[allow(non_snake_case)]")?;
        writeln!(
            self.output,
            "pub fn {snake}_email(data: &{base}EmailData) -> Result<{base}EmailResult, tera::Error> {{"
        )?;
        writeln!(
            self.output,
            "    let context = tera::Context::from_serialize(data)?;"
        )?;
        writeln!(self.output, "    let mut tera = tera::Tera::default();")?;
        writeln!(
            self.output,
            "    tera.add_raw_template(\"{snake}.email.html\", {screaming}_EMAIL_HTML_TEMPLATE)?;"
        )?;
        if template.has_subject() {
            writeln!(
                self.output,
                "    tera.add_raw_template(\"{snake}.email.subject\", {screaming}_EMAIL_SUBJECT_TEMPLATE)?;"
            )?;
            writeln!(
                self.output,
                "    let Subject = tera.render(\"{snake}.email.subject\", &context)?;"
            )?;
        } else {
            writeln!(self.output, "    let Subject = String::new();")?;
        }
        writeln!(
            self.output,
            "    let HTML = tera.render(\"{snake}.email.html\", &context)?;"
        )?;
        writeln!(
            self.output,
            "    Ok({base}EmailResult {{ Subject, HTML }})"
        )?;
        writeln!(self.output, "}}")?;
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate one output unit per template plus the `mod.rs` aggregator,
/// written into `out_dir` (created if absent). Files go through a
/// write-to-temp-then-rename so a failure never leaves a truncated unit.
/// Returns the written paths.
pub fn generate_code(
    templates: &[ParsedTemplate],
    out_dir: &Path,
    version: &str,
) -> Result<Vec<PathBuf>> {
    // The recursive walk can collect files with the same stem from
    // different directories; their output names would collide. Refuse the
    // batch before writing anything.
    let mut sources: HashMap<String, &Path> = HashMap::new();
    for template in templates {
        let file_name = output_file_name(template);
        if let Some(first) = sources.insert(file_name.clone(), template.file_path.as_path()) {
            return Err(CompileError::DuplicateOutput {
                file: file_name,
                first: first.to_path_buf(),
                second: template.file_path.clone(),
            });
        }
    }

    fs::create_dir_all(out_dir).map_err(|source| CompileError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    let mut modules: Vec<(String, String)> = Vec::new();

    for template in templates {
        let code = CodeGenerator::new().generate(template, version)?;
        let file_name = output_file_name(template);
        let path = out_dir.join(&file_name);
        write_atomic(&path, &code)?;

        let base = exported_name(template.file_stem());
        modules.push((file_name, format!("{}_email", snake_case(&base))));
        written.push(path);
    }

    modules.sort();
    let mut mod_rs = String::new();
    writeln!(
        mod_rs,
        "// Code generated by mailforge {version}. DO NOT EDIT."
    )?;
    writeln!(mod_rs)?;
    for (file, module) in &modules {
        writeln!(mod_rs, "#[path = \"{file}\"]")?;
        writeln!(mod_rs, "pub mod {module};")?;
    }
    let mod_path = out_dir.join("mod.rs");
    write_atomic(&mod_path, &mod_rs)?;
    written.push(mod_path);

    Ok(written)
}

/// Output unit name for a template: `simple.html` -> `simple.email.rs`.
pub fn output_file_name(template: &ParsedTemplate) -> String {
    format!("{}.email.rs", template.file_stem())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(|source| CompileError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| CompileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Rewrite `{{name}}` and `{{Parent.Field}}` placeholders into tera syntax
/// bound to the generated field names (each segment upper-cased on its
/// first character), preserving trim markers.
fn normalize_template(text: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let open = if &caps[1] == "-" { "{{-" } else { "{{" };
            let close = if &caps[3] == "-" { "-}}" } else { "}}" };
            let path = caps[2]
                .split('.')
                .map(upper_first)
                .collect::<Vec<_>>()
                .join(".");
            format!("{open} {path} {close}")
        })
        .into_owned()
}

/// Map an annotation type name to the Rust type emitted in generated
/// structs. A leading `[]` marks a slice. Unknown names are emitted
/// verbatim and fail at the consumer's own compile step.
fn rust_type(ty: &str) -> String {
    if let Some(elem) = ty.strip_prefix("[]") {
        return format!("Vec<{}>", rust_type(elem));
    }
    match ty {
        "string" => "String".to_string(),
        "int" => "i64".to_string(),
        "float" => "f64".to_string(),
        "bool" => "bool".to_string(),
        other => other.to_string(),
    }
}

/// Quote template text as a Rust raw string literal, escalating the hash
/// count until the delimiter cannot occur inside the text.
fn raw_string_literal(text: &str) -> String {
    let mut hashes = 1;
    while text.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let guard = "#".repeat(hashes);
    format!("r{guard}\"{text}\"{guard}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_placeholder() {
        assert_eq!(normalize_template("Hi {{firstName}}!"), "Hi {{ FirstName }}!");
        assert_eq!(normalize_template("{{  username  }}"), "{{ Username }}");
    }

    #[test]
    fn test_normalize_dotted_placeholder() {
        assert_eq!(normalize_template("#{{Order.ID}}"), "#{{ Order.ID }}");
        assert_eq!(normalize_template("{{user.name}}"), "{{ User.Name }}");
    }

    #[test]
    fn test_normalize_preserves_trim_markers() {
        assert_eq!(normalize_template("{{- name -}}"), "{{- Name -}}");
        assert_eq!(normalize_template("{{- name }}"), "{{- Name }}");
    }

    #[test]
    fn test_normalize_leaves_non_placeholders_alone() {
        // Calls, deep paths, and detached trim markers are outside the
        // placeholder grammar.
        assert_eq!(normalize_template("{{ now() }}"), "{{ now() }}");
        assert_eq!(normalize_template("{{a.b.c}}"), "{{a.b.c}}");
        assert_eq!(normalize_template("{{ - name }}"), "{{ - name }}");
    }

    #[test]
    fn test_rust_type_mapping() {
        assert_eq!(rust_type("string"), "String");
        assert_eq!(rust_type("int"), "i64");
        assert_eq!(rust_type("bool"), "bool");
        assert_eq!(rust_type("[]string"), "Vec<String>");
        assert_eq!(rust_type("[]Item"), "Vec<Item>");
        assert_eq!(rust_type("Duration"), "Duration");
    }

    #[test]
    fn test_raw_string_literal_escalates_hashes() {
        assert_eq!(raw_string_literal("plain"), "r#\"plain\"#");
        assert_eq!(raw_string_literal("a \"quote\""), "r#\"a \"quote\"\"#");
        assert_eq!(raw_string_literal("tricky \"# end"), "r##\"tricky \"# end\"##");
    }
}
