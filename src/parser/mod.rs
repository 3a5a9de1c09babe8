//! Parser module for Punch sources
//!
//! This module contains the lexer, the recursive descent parser and the
//! diagnostics both of them raise.

pub mod diagnostics;
pub mod lexer;
pub mod expression_parser;
pub mod condition_parser;
pub mod parser;

// Re-exports
pub use diagnostics::{Diagnostic, LexError, LexErrorKind, ParseError};
pub use lexer::{tokenize, Lexer, Literal, Token, TokenKind};
pub use parser::{parse, parse_expression, Parser};
