/// mailforge compiler
///
/// Transforms annotated HTML email templates into typed Rust modules: per
/// template, a data struct describing the variables the template needs, a
/// result struct holding the rendered output, normalized template
/// constants, and a rendering function.

pub mod codegen;
pub mod driver;
pub mod error;

pub use codegen::{CodeGenerator, generate_code};
pub use driver::{CompileOptions, CompileOutput, Compiler, compile};
pub use error::{CompileError, Result};
