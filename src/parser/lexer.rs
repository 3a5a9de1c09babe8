//! Lexer for Punch Source
//!
//! The lexer turns source text into a flat stream of tokens that the parser
//! consumes. It handles:
//! - Operators and delimiters (longest match for two-character operators)
//! - Keywords and identifiers
//! - Line and block comments
//! - String and integer literals
//! - Raw blocks (`raw { ... }` and `$( ... )`), whose bodies are captured as
//!   text except for `$[ ... ]` splices, which are tokenized as ordinary code

use std::collections::HashMap;
use std::fmt;

use crate::parser::diagnostics::{LexError, LexErrorKind};

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,

    // Keywords
    Func,
    If,
    Else,
    For,
    While,
    Var,
    Return,
    Raw,
    True,
    False,

    // Splice / raw environment sigil
    Dollar, // $

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Assignment and comparison
    Equal,        // =
    EqualEqual,   // ==
    NotEqual,     // !=
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Literals
    Ident,
    Number,
    String,

    /// Verbatim text captured inside a raw block
    RawText,

    /// End of input
    End,
}

impl TokenKind {
    /// The single display symbol for this kind, used in diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Func => "func",
            Self::If => "if",
            Self::Else => "else",
            Self::For => "for",
            Self::While => "while",
            Self::Var => "var",
            Self::Return => "return",
            Self::Raw => "raw",
            Self::True => "true",
            Self::False => "false",
            Self::Dollar => "$",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Equal => "=",
            Self::EqualEqual => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::Ident => "IDENT",
            Self::Number => "NUMBER",
            Self::String => "STRING",
            Self::RawText => "RAWTEXT",
            Self::End => "END",
        }
    }

    fn takes_number(&self) -> bool {
        matches!(self, Self::Number)
    }

    fn takes_text(&self) -> bool {
        matches!(self, Self::Ident | Self::String | Self::RawText)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal payload attached to a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(i64),
    Text(String),
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Option<Literal>,
    /// 1-based position of the token's first character
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Create a token without a literal payload.
    ///
    /// Panics if `kind` requires a literal.
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        assert!(
            !kind.takes_number() && !kind.takes_text(),
            "token kind {} requires a literal",
            kind
        );
        Self { kind, literal: None, line, column }
    }

    /// Create a `NUMBER` token.
    pub fn number(value: i64, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Number,
            literal: Some(Literal::Number(value)),
            line,
            column,
        }
    }

    /// Create an `IDENT`, `STRING` or `RAWTEXT` token.
    ///
    /// Panics if `kind` does not carry text.
    pub fn text(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        assert!(kind.takes_text(), "token kind {} does not carry text", kind);
        Self {
            kind,
            literal: Some(Literal::Text(value.into())),
            line,
            column,
        }
    }

    pub fn number_value(&self) -> Option<i64> {
        match self.literal {
            Some(Literal::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Source-equivalent spelling of the token.
    pub fn lexeme(&self) -> String {
        match (&self.kind, &self.literal) {
            (TokenKind::String, Some(Literal::Text(s))) => format!("\"{}\"", s),
            (_, Some(Literal::Text(s))) => s.clone(),
            (_, Some(Literal::Number(n))) => n.to_string(),
            (kind, None) => kind.symbol().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(Literal::Number(n)) => write!(f, "{}:{} {} {}", self.line, self.column, self.kind, n),
            Some(Literal::Text(s)) => write!(f, "{}:{} {} {:?}", self.line, self.column, self.kind, s),
            None => write!(f, "{}:{} {}", self.line, self.column, self.kind),
        }
    }
}

lazy_static::lazy_static! {
    /// Reserved words of the source language
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("func", TokenKind::Func);
        m.insert("if", TokenKind::If);
        m.insert("else", TokenKind::Else);
        m.insert("for", TokenKind::For);
        m.insert("while", TokenKind::While);
        m.insert("var", TokenKind::Var);
        m.insert("return", TokenKind::Return);
        m.insert("raw", TokenKind::Raw);
        m.insert("true", TokenKind::True);
        m.insert("false", TokenKind::False);
        m
    };

    /// Single-character tokens
    static ref SINGLE_CHAR_TOKENS: HashMap<char, TokenKind> = {
        let mut m = HashMap::new();
        m.insert('(', TokenKind::LParen);
        m.insert(')', TokenKind::RParen);
        m.insert('{', TokenKind::LBrace);
        m.insert('}', TokenKind::RBrace);
        m.insert('[', TokenKind::LBracket);
        m.insert(']', TokenKind::RBracket);
        m.insert(';', TokenKind::Semicolon);
        m.insert(',', TokenKind::Comma);
        m.insert('+', TokenKind::Plus);
        m.insert('-', TokenKind::Minus);
        m.insert('*', TokenKind::Star);
        m.insert('/', TokenKind::Slash);
        m.insert('%', TokenKind::Percent);
        m.insert('=', TokenKind::Equal);
        m.insert('<', TokenKind::Less);
        m.insert('>', TokenKind::Greater);
        m.insert('!', TokenKind::Bang);
        m
    };
}

/// Two-character operators, checked before single characters
const TWO_CHAR_OPS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lexer state: a cursor over the input plus the tokens emitted so far.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input. The result always ends with one `END` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            self.scan_token()?;
        }

        self.tokens.push(Token::new(TokenKind::End, self.line, self.column));
        Ok(self.tokens)
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, kind: LexErrorKind, line: usize, column: usize) -> LexError {
        LexError::new(kind, line, column)
    }

    /// Scan one lexical item starting at the current character.
    ///
    /// Returns the kind of the first token pushed, or `None` when the item
    /// was a comment. Raw environments push many tokens.
    fn scan_token(&mut self) -> Result<Option<TokenKind>, LexError> {
        let line = self.line;
        let column = self.column;

        let c0 = match self.current() {
            Some(c) => c,
            None => return Ok(None),
        };
        let c1 = self.peek(1);

        // Comments
        if c0 == '/' && c1 == Some('/') {
            while let Some(c) = self.current() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
            return Ok(None);
        }
        if c0 == '/' && c1 == Some('*') {
            self.advance();
            self.advance();
            loop {
                match self.current() {
                    None => return Err(self.error(LexErrorKind::UnterminatedComment, line, column)),
                    Some('*') if self.peek(1) == Some('/') => {
                        self.advance();
                        self.advance();
                        return Ok(None);
                    }
                    Some(_) => {
                        self.advance();
                    }
                }
            }
        }

        // Two-character operators
        for (op, kind) in TWO_CHAR_OPS {
            let mut chars = op.chars();
            if Some(c0) == chars.next() && c1 == chars.next() {
                self.advance();
                self.advance();
                self.tokens.push(Token::new(*kind, line, column));
                return Ok(Some(*kind));
            }
        }

        if let Some(kind) = SINGLE_CHAR_TOKENS.get(&c0).copied() {
            self.advance();
            self.tokens.push(Token::new(kind, line, column));
            return Ok(Some(kind));
        }

        if c0 == '$' {
            self.advance();
            self.tokens.push(Token::new(TokenKind::Dollar, line, column));
            self.scan_raw_environment('(', ')')?;
            return Ok(Some(TokenKind::Dollar));
        }

        if c0 == '"' {
            return self.scan_string(line, column).map(Some);
        }

        if c0.is_ascii_digit() {
            return self.scan_number(line, column).map(Some);
        }

        if is_ident_start(c0) {
            return self.scan_identifier(line, column).map(Some);
        }

        Err(self.error(LexErrorKind::UnexpectedCharacter(c0), line, column))
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error(LexErrorKind::UnterminatedString, line, column)),
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }
        self.tokens.push(Token::text(TokenKind::String, value, line, column));
        Ok(TokenKind::String)
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let mut digits = String::new();
        while let Some(c) = self.current() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.advance();
        }
        let value = digits
            .parse::<i64>()
            .map_err(|_| self.error(LexErrorKind::IntegerOverflow(digits.clone()), line, column))?;
        self.tokens.push(Token::number(value, line, column));
        Ok(TokenKind::Number)
    }

    fn scan_identifier(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if !is_ident_char(c) {
                break;
            }
            word.push(c);
            self.advance();
        }

        match KEYWORDS.get(word.as_str()).copied() {
            Some(TokenKind::Raw) => {
                self.tokens.push(Token::new(TokenKind::Raw, line, column));
                self.scan_raw_environment('{', '}')?;
                Ok(TokenKind::Raw)
            }
            Some(kind) => {
                self.tokens.push(Token::new(kind, line, column));
                Ok(kind)
            }
            None => {
                self.tokens.push(Token::text(TokenKind::Ident, word, line, column));
                Ok(TokenKind::Ident)
            }
        }
    }

    /// Scan the body of a raw environment delimited by `open`/`close`.
    ///
    /// Text is captured verbatim, with nested `open`/`close` pairs balanced by
    /// a level counter. A `$[` inside the body flushes the text captured so
    /// far and re-enters ordinary tokenization until the matching `]`.
    fn scan_raw_environment(&mut self, open: char, close: char) -> Result<(), LexError> {
        let (open_kind, close_kind) = match open {
            '{' => (TokenKind::LBrace, TokenKind::RBrace),
            _ => (TokenKind::LParen, TokenKind::RParen),
        };

        self.skip_whitespace();
        let block_line = self.line;
        let block_column = self.column;
        match self.current() {
            Some(c) if c == open => {
                self.advance();
                self.tokens.push(Token::new(open_kind, block_line, block_column));
            }
            Some(c) => {
                return Err(self.error(LexErrorKind::UnexpectedCharacter(c), block_line, block_column))
            }
            None => {
                return Err(self.error(LexErrorKind::UnterminatedRawBlock, block_line, block_column))
            }
        }

        self.skip_whitespace();
        let mut text = String::new();
        let mut text_line = self.line;
        let mut text_column = self.column;
        let mut level = 1usize;

        loop {
            let c = match self.current() {
                Some(c) => c,
                None => {
                    return Err(self.error(LexErrorKind::UnterminatedRawBlock, block_line, block_column))
                }
            };

            if c == open {
                level += 1;
            } else if c == close {
                level -= 1;
                if level == 0 {
                    self.flush_raw_text(&mut text, text_line, text_column);
                    let line = self.line;
                    let column = self.column;
                    self.advance();
                    self.tokens.push(Token::new(close_kind, line, column));
                    return Ok(());
                }
            } else if c == '$' && self.peek(1) == Some('[') {
                self.flush_raw_text(&mut text, text_line, text_column);
                self.scan_splice()?;
                text_line = self.line;
                text_column = self.column;
                continue;
            }

            text.push(c);
            self.advance();
        }
    }

    fn flush_raw_text(&mut self, text: &mut String, line: usize, column: usize) {
        if !text.is_empty() {
            self.tokens
                .push(Token::text(TokenKind::RawText, std::mem::take(text), line, column));
        }
    }

    /// Tokenize a `$[ ... ]` splice as ordinary source, stopping after the
    /// `]` that balances the opening bracket.
    fn scan_splice(&mut self) -> Result<(), LexError> {
        let line = self.line;
        let column = self.column;
        self.advance();
        self.tokens.push(Token::new(TokenKind::Dollar, line, column));
        let bracket_column = self.column;
        self.advance();
        self.tokens.push(Token::new(TokenKind::LBracket, line, bracket_column));

        let mut depth = 1usize;
        while depth > 0 {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                return Err(self.error(LexErrorKind::UnterminatedSplice, line, column));
            }
            match self.scan_token()? {
                Some(TokenKind::LBracket) => depth += 1,
                Some(TokenKind::RBracket) => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}
