/// Compile driver tying the annotation parser to the code generator.

use std::path::{Path, PathBuf};

use mailforge_parser::{ParsedTemplate, parse_dir};

use crate::codegen;
use crate::error::Result;

/// Options controlling a compiler run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Version tag embedded in generated file headers.
    pub version: String,
    pub verbose: bool,
}

impl CompileOptions {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: PathBuf::from("./src/emails"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            verbose: false,
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Summary of a completed compiler run.
#[derive(Debug)]
pub struct CompileOutput {
    /// Templates parsed from the input directory.
    pub templates: Vec<ParsedTemplate>,
    /// Paths written to the output directory, including `mod.rs`.
    pub files: Vec<PathBuf>,
}

/// The email template compiler.
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parse every template under the input directory without generating
    /// anything (used by the CLI's IR dump).
    pub fn parse(&self) -> Result<Vec<ParsedTemplate>> {
        Ok(parse_dir(&self.options.input_dir)?)
    }

    /// Generate one output unit per template plus the aggregator into the
    /// output directory. A failure on one template aborts the batch.
    pub fn generate(&self, templates: &[ParsedTemplate]) -> Result<Vec<PathBuf>> {
        let files = codegen::generate_code(templates, &self.options.output_dir, &self.options.version)?;
        if self.options.verbose {
            for file in &files {
                println!("Wrote: {}", file.display());
            }
        }
        Ok(files)
    }

    /// Run the full pipeline: parse the input directory, then generate.
    pub fn compile(&self) -> Result<CompileOutput> {
        let templates = self.parse()?;
        let files = self.generate(&templates)?;
        Ok(CompileOutput { templates, files })
    }
}

/// Convenience entry point used by tests and library consumers.
pub fn compile(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<CompileOutput> {
    let options =
        CompileOptions::new(input_dir.as_ref().to_path_buf()).output_dir(output_dir.as_ref().to_path_buf());
    Compiler::new(options).compile()
}
