/// Compiler error types.
///
/// Malformed directive syntax is never an error anywhere in the pipeline;
/// only I/O failures are fatal, and each carries the offending path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] mailforge_parser::ParseError),

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "templates {} and {} both generate {file}; rename one so output names are unique",
        first.display(),
        second.display()
    )]
    DuplicateOutput {
        file: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}
