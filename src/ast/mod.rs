//! Abstract Syntax Tree (AST) for Punch programs
//!
//! Architecture:
//!   Source → Lexer → Parser → AST → Code Generator → Shell script

pub mod display;
pub mod types;
