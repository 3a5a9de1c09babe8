//! Shell code generation
//!
//! Turns a parsed [`Program`](crate::ast::types::Program) into POSIX shell
//! text. Identifier renaming and call hoisting happen here; the input tree is
//! trusted to be well formed.

pub mod conditions;
pub mod generator;
pub mod identifiers;
pub mod options;
pub mod values;

pub use generator::CodeGenerator;
pub use identifiers::NameTable;
pub use options::{GeneratorOptions, RESULT_VAR, TEMP_PREFIX};
