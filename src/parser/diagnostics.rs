//! Diagnostics
//!
//! Fatal, position-tagged errors raised by the lexer and the parser. The
//! first error aborts compilation; there is no recovery.

use std::fmt;
use thiserror::Error;

use crate::parser::lexer::TokenKind;

/// What went wrong while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    UnterminatedRawBlock,
    UnterminatedSplice,
    IntegerOverflow(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c.escape_debug()),
            Self::UnterminatedString => f.write_str("unterminated string literal"),
            Self::UnterminatedComment => f.write_str("unterminated block comment"),
            Self::UnterminatedRawBlock => f.write_str("unterminated raw block"),
            Self::UnterminatedSplice => f.write_str("unterminated splice, expected ']'"),
            Self::IntegerOverflow(digits) => write!(f, "integer literal {} is too large", digits),
        }
    }
}

/// Error raised when the lexer meets input that does not form a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error at {line}:{column}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

/// Error raised when the parser sees a token outside the set it accepts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    /// Kind of the offending token
    pub found: TokenKind,
    /// Every kind that would have been accepted here
    pub expected: Vec<TokenKind>,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(found: TokenKind, expected: &[TokenKind], line: usize, column: usize) -> Self {
        Self {
            found,
            expected: expected.to_vec(),
            line,
            column,
        }
    }

    /// Human-readable description without the position prefix.
    pub fn message(&self) -> String {
        match self.expected.as_slice() {
            [] => format!("unexpected token {}", quote_kind(self.found)),
            [only] => format!("expected {} but found {}", quote_kind(*only), quote_kind(self.found)),
            many => {
                let names: Vec<String> = many.iter().map(|k| quote_kind(*k)).collect();
                format!("expected one of {} but found {}", names.join(", "), quote_kind(self.found))
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}:{}: {}", self.line, self.column, self.message())
    }
}

/// Literal categories are shown bare (`IDENT`), concrete symbols quoted (`'('`).
fn quote_kind(kind: TokenKind) -> String {
    match kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::String | TokenKind::RawText | TokenKind::End => {
            kind.symbol().to_string()
        }
        _ => format!("'{}'", kind.symbol()),
    }
}

/// Any diagnostic that halts the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Lexical(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] ParseError),
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Self::Lexical(e) => e.line,
            Self::Syntax(e) => e.line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::Lexical(e) => e.column,
            Self::Syntax(e) => e.column,
        }
    }

    /// Format the diagnostic followed by the offending source line and a caret
    /// under the reported column.
    pub fn render(&self, source: &str) -> String {
        let mut out = self.to_string();
        if let Some(text) = source.lines().nth(self.line().saturating_sub(1)) {
            let gutter = format!("{} | ", self.line());
            let pad: String = text
                .chars()
                .take(self.column().saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            out.push('\n');
            out.push_str(&gutter);
            out.push_str(text);
            out.push('\n');
            out.push_str(&" ".repeat(gutter.len()));
            out.push_str(&pad);
            out.push('^');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_message() {
        let err = LexError::new(LexErrorKind::UnexpectedCharacter('@'), 3, 7);
        assert_eq!(err.to_string(), "lexical error at 3:7: unexpected character '@'");
    }

    #[test]
    fn test_parse_error_single_expected() {
        let err = ParseError::new(TokenKind::LBrace, &[TokenKind::Ident], 1, 9);
        assert_eq!(err.to_string(), "syntax error at 1:9: expected IDENT but found '{'");
    }

    #[test]
    fn test_parse_error_expected_set() {
        let err = ParseError::new(
            TokenKind::Number,
            &[TokenKind::Func, TokenKind::Var, TokenKind::Ident],
            2,
            1,
        );
        assert_eq!(err.message(), "expected one of 'func', 'var', IDENT but found NUMBER");
    }

    #[test]
    fn test_parse_error_found_end_of_input() {
        let err = ParseError::new(TokenKind::End, &[TokenKind::RBrace], 3, 1);
        assert_eq!(err.message(), "expected '}' but found END");
    }

    #[test]
    fn test_parse_error_without_expectation() {
        let err = ParseError::new(TokenKind::Bang, &[], 1, 1);
        assert_eq!(err.message(), "unexpected token '!'");
    }

    #[test]
    fn test_diagnostic_position_and_render() {
        let source = "var x = 1;\nvar y = @;";
        let diag = Diagnostic::from(LexError::new(LexErrorKind::UnexpectedCharacter('@'), 2, 9));
        assert_eq!((diag.line(), diag.column()), (2, 9));
        let rendered = diag.render(source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "2 | var y = @;");
        assert_eq!(lines[2], "            ^");
    }
}
