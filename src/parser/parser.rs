//! Recursive Descent Parser for Punch
//!
//! Consumes the token stream produced by the lexer and builds a [`Program`].
//! One method per nonterminal; the expression and condition grammars live in
//! `expression_parser.rs` and `condition_parser.rs`.
//!
//! Grammar (statements):
//!   program      ::= (function_decl | assignment)* END
//!   function_decl::= 'func' IDENT '(' (IDENT ',')* IDENT? ')' '{' statement* '}'
//!   assignment   ::= 'var'? IDENT '=' expression ';'
//!   statement    ::= assignment | return | conditional | block | raw_block
//!                  | expression ';'
//!   return       ::= 'return' expression ';'
//!   conditional  ::= 'if' '(' condition ')' statement ('else' statement)?
//!   block        ::= '{' statement* '}'
//!   raw_block    ::= 'raw' '{' raw_environment '}' ';'?

use crate::ast::types::{
    Assignment, BranchingConditional, Conditional, ElseBranch, Expression, FunctionDecl, Program,
    Return, SimpleConditional, Statement, StatementBlock, Variable,
};
use crate::parser::diagnostics::{Diagnostic, ParseError};
use crate::parser::lexer::{Lexer, Literal, Token, TokenKind};

/// Tokens that can begin a statement
const STATEMENT_START: &[TokenKind] = &[
    TokenKind::Var,
    TokenKind::Ident,
    TokenKind::Return,
    TokenKind::If,
    TokenKind::LBrace,
    TokenKind::Raw,
    TokenKind::Number,
    TokenKind::String,
    TokenKind::LParen,
    TokenKind::Dollar,
];

/// Tokens that can begin a top-level item
const TOP_LEVEL_START: &[TokenKind] = &[TokenKind::Func, TokenKind::Var, TokenKind::Ident];

/// Tokens that may follow a complete expression at the end of a statement
const EXPRESSION_END: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Percent,
    TokenKind::Semicolon,
];

/// Main parser struct
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser over a token stream. A missing `END` marker is added.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::End) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::End, line, column));
        }
        Self { tokens, pos: 0 }
    }

    // -------------------------------------------------------------------------
    // Token cursor
    // -------------------------------------------------------------------------

    pub(crate) fn current(&self) -> &Token {
        self.peek(0)
    }

    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[kind]))
        }
    }

    /// Consume the `;` closing a statement that ends in an expression.
    fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        if self.matches(TokenKind::Semicolon) {
            Ok(())
        } else {
            Err(self.unexpected(EXPRESSION_END))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        match token.literal {
            Some(Literal::Text(name)) => Ok(name),
            _ => Err(ParseError::new(token.kind, &[TokenKind::Ident], token.line, token.column)),
        }
    }

    /// Build an error for the current token given the set of accepted kinds.
    pub(crate) fn unexpected(&self, expected: &[TokenKind]) -> ParseError {
        let token = self.current();
        ParseError::new(token.kind, expected, token.line, token.column)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    // -------------------------------------------------------------------------
    // Program structure
    // -------------------------------------------------------------------------

    /// Parse the whole token stream into a program.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        while !self.check(TokenKind::End) {
            match self.current().kind {
                TokenKind::Func => program.functions.push(self.parse_function()?),
                TokenKind::Var | TokenKind::Ident => program.globals.push(self.parse_assignment()?),
                _ => return Err(self.unexpected(TOP_LEVEL_START)),
            }
        }

        Ok(program)
    }

    /// Parse a single expression that must span the whole token stream.
    pub fn parse_standalone_expression(&mut self) -> Result<Expression, ParseError> {
        let expression = self.parse_expression()?;
        self.expect(TokenKind::End)?;
        Ok(expression)
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::Func)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut parameters = Vec::new();
        loop {
            if self.matches(TokenKind::RParen) {
                break;
            }
            parameters.push(Variable { name: self.expect_ident()? });
            if !self.matches(TokenKind::Comma) {
                if !self.check(TokenKind::RParen) {
                    return Err(self.unexpected(&[TokenKind::Comma, TokenKind::RParen]));
                }
                self.advance();
                break;
            }
        }

        let body = self.parse_braced_statements()?;
        Ok(FunctionDecl { name, parameters, body })
    }

    /// '{' statement* '}'
    fn parse_braced_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::End) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(statements)
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let declaration = self.matches(TokenKind::Var);
        let name = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_expression()?;
        self.expect_statement_end()?;
        Ok(Assignment {
            declaration,
            target: Variable { name },
            value,
        })
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.current().kind {
            TokenKind::Var => Ok(Statement::Assignment(self.parse_assignment()?)),
            TokenKind::Ident if self.peek(1).kind == TokenKind::Equal => {
                Ok(Statement::Assignment(self.parse_assignment()?))
            }
            TokenKind::Return => {
                self.advance();
                let value = self.parse_expression()?;
                self.expect_statement_end()?;
                Ok(Statement::Return(Return { value }))
            }
            TokenKind::If => Ok(Statement::from(self.parse_conditional()?)),
            TokenKind::LBrace => Ok(Statement::Block(StatementBlock {
                statements: self.parse_braced_statements()?,
            })),
            TokenKind::Raw => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                let environment = self.parse_raw_environment()?;
                self.expect(TokenKind::RBrace)?;
                self.matches(TokenKind::Semicolon);
                Ok(Statement::Expression(Expression::Raw(environment)))
            }
            kind if Self::starts_expression(kind) => {
                let expression = self.parse_expression()?;
                self.expect_statement_end()?;
                Ok(Statement::Expression(expression))
            }
            _ => Err(self.unexpected(STATEMENT_START)),
        }
    }

    fn parse_conditional(&mut self) -> Result<Conditional, ParseError> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);

        if !self.matches(TokenKind::Else) {
            return Ok(Conditional::Simple(SimpleConditional { condition, body }));
        }

        let else_body = if self.check(TokenKind::If) {
            ElseBranch::Conditional(Box::new(self.parse_conditional()?))
        } else {
            ElseBranch::Statement(Box::new(self.parse_statement()?))
        };

        Ok(Conditional::Branching(BranchingConditional {
            condition,
            if_body: body,
            else_body,
        }))
    }
}

/// Lex and parse a complete program.
pub fn parse(source: &str) -> Result<Program, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Parser::new(tokens).parse_program()?)
}

/// Lex and parse a single expression, e.g. `1 + 2 * 3`.
pub fn parse_expression(source: &str) -> Result<Expression, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Parser::new(tokens).parse_standalone_expression()?)
}
