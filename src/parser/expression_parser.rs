//! Expression Parser
//!
//! Arithmetic expressions, function calls and `$( ... )` raw environments.
//!
//!   expression ::= term (('+' | '-') term)*
//!   term       ::= factor (('*' | '/' | '%') factor)*
//!   factor     ::= NUMBER | STRING | IDENT call_args? | '(' expression ')'
//!                | '$' '(' raw_environment ')'
//!   call_args  ::= '(' (expression ',')* expression? ')'
//!   raw_environment ::= (RAWTEXT | '$' '[' expression ']')*
//!
//! All operators are left-associative. There are no unary operators.

use crate::ast::types::{
    ArithmeticOperator, Expression, FunctionCall, RawBashFragment, RawEnvironment, RawFragment,
    RawSpliceExpression, AST,
};
use crate::parser::diagnostics::ParseError;
use crate::parser::lexer::{Literal, TokenKind};
use crate::parser::parser::Parser;

/// Tokens that can begin an expression
pub(crate) const FACTOR_START: &[TokenKind] = &[
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Ident,
    TokenKind::LParen,
    TokenKind::Dollar,
];

impl Parser {
    pub(crate) fn starts_expression(kind: TokenKind) -> bool {
        FACTOR_START.contains(&kind)
    }

    /// Lowest precedence level: `+` and `-`.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::Plus => ArithmeticOperator::Add,
                TokenKind::Minus => ArithmeticOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = AST::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_factor()?;

        loop {
            let operator = match self.current().kind {
                TokenKind::Star => ArithmeticOperator::Multiply,
                TokenKind::Slash => ArithmeticOperator::Divide,
                TokenKind::Percent => ArithmeticOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = AST::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        match (token.kind, token.literal) {
            (TokenKind::Number, Some(Literal::Number(value))) => {
                self.advance();
                Ok(AST::number(value))
            }
            (TokenKind::String, Some(Literal::Text(value))) => {
                self.advance();
                Ok(AST::string(value))
            }
            (TokenKind::Ident, Some(Literal::Text(name))) => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    let arguments = self.parse_call_arguments()?;
                    Ok(Expression::Call(FunctionCall { name, arguments }))
                } else {
                    Ok(AST::variable(name))
                }
            }
            (TokenKind::LParen, _) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            (TokenKind::Dollar, _) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let environment = self.parse_raw_environment()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expression::Raw(environment))
            }
            _ => Err(self.unexpected(FACTOR_START)),
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();

        loop {
            if self.matches(TokenKind::RParen) {
                break;
            }
            arguments.push(self.parse_expression()?);
            if !self.matches(TokenKind::Comma) {
                if !self.check(TokenKind::RParen) {
                    return Err(self.unexpected(&[TokenKind::Comma, TokenKind::RParen]));
                }
                self.advance();
                break;
            }
        }

        Ok(arguments)
    }

    /// Walk the flattened raw-block tokens up to the closing delimiter, which
    /// the caller consumes.
    pub(crate) fn parse_raw_environment(&mut self) -> Result<RawEnvironment, ParseError> {
        let mut fragments = Vec::new();

        loop {
            let token = self.current().clone();
            match (token.kind, token.literal) {
                (TokenKind::RawText, Some(Literal::Text(text))) => {
                    self.advance();
                    fragments.push(RawFragment::Bash(RawBashFragment { text }));
                }
                (TokenKind::Dollar, _) => {
                    self.advance();
                    self.expect(TokenKind::LBracket)?;
                    let expression = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    fragments.push(RawFragment::Splice(RawSpliceExpression { expression }));
                }
                _ => break,
            }
        }

        Ok(RawEnvironment { fragments })
    }
}
