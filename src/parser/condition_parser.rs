//! Condition Parser
//!
//! Conditions appear only in `if (...)` heads and are kept apart from
//! arithmetic expressions.
//!
//!   condition   ::= conjunction ('||' conjunction)*
//!   conjunction ::= atom ('&&' atom)*
//!   atom        ::= 'true' | 'false' | '(' condition ')'
//!                 | expression relop expression
//!   relop       ::= '<' | '>' | '<=' | '>=' | '==' | '!='
//!
//! A leading `(` is ambiguous: `(a < b)` groups a condition while `(a + 1) < b`
//! opens an arithmetic operand. The grouped reading is tried first.

use crate::ast::types::{Condition, RelationalOperator, AST};
use crate::parser::diagnostics::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::Parser;

pub(crate) const RELATIONAL_OPERATORS: &[TokenKind] = &[
    TokenKind::Less,
    TokenKind::Greater,
    TokenKind::LessEqual,
    TokenKind::GreaterEqual,
    TokenKind::EqualEqual,
    TokenKind::NotEqual,
];

/// Tokens that can begin a condition
pub(crate) const CONDITION_START: &[TokenKind] = &[
    TokenKind::True,
    TokenKind::False,
    TokenKind::LParen,
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Ident,
    TokenKind::Dollar,
];

fn relational_operator(kind: TokenKind) -> Option<RelationalOperator> {
    match kind {
        TokenKind::Less => Some(RelationalOperator::Less),
        TokenKind::Greater => Some(RelationalOperator::Greater),
        TokenKind::LessEqual => Some(RelationalOperator::LessEqual),
        TokenKind::GreaterEqual => Some(RelationalOperator::GreaterEqual),
        TokenKind::EqualEqual => Some(RelationalOperator::Equal),
        TokenKind::NotEqual => Some(RelationalOperator::NotEqual),
        _ => None,
    }
}

impl Parser {
    /// Lowest precedence level: `||`.
    pub(crate) fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_conjunction()?;
        while self.matches(TokenKind::OrOr) {
            let right = self.parse_conjunction()?;
            left = AST::disjunction(left, right);
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_condition_atom()?;
        while self.matches(TokenKind::AndAnd) {
            let right = self.parse_condition_atom()?;
            left = AST::conjunction(left, right);
        }
        Ok(left)
    }

    fn parse_condition_atom(&mut self) -> Result<Condition, ParseError> {
        match self.current().kind {
            TokenKind::True => {
                self.advance();
                Ok(Condition::True)
            }
            TokenKind::False => {
                self.advance();
                Ok(Condition::False)
            }
            TokenKind::LParen => {
                let start = self.position();
                let grouped = self.parse_grouped_condition();
                let grouped_err = match grouped {
                    Ok(condition) => return Ok(condition),
                    Err(err) => err,
                };

                self.rewind(start);
                match self.parse_comparison() {
                    Ok(condition) => Ok(condition),
                    // Report whichever reading got further into the input
                    Err(err) if (err.line, err.column) > (grouped_err.line, grouped_err.column) => {
                        Err(err)
                    }
                    Err(_) => Err(grouped_err),
                }
            }
            kind if Self::starts_expression(kind) => self.parse_comparison(),
            _ => Err(self.unexpected(CONDITION_START)),
        }
    }

    fn parse_grouped_condition(&mut self) -> Result<Condition, ParseError> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_comparison(&mut self) -> Result<Condition, ParseError> {
        let left = self.parse_expression()?;
        let operator = match relational_operator(self.current().kind) {
            Some(op) => op,
            None => return Err(self.unexpected(RELATIONAL_OPERATORS)),
        };
        self.advance();
        let right = self.parse_expression()?;
        Ok(AST::comparison(operator, left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::{ArithmeticOperator, Statement};
    use crate::parser::diagnostics::Diagnostic;
    use crate::parser::parser::parse;

    fn condition_of(source: &str) -> Condition {
        let program = parse(&format!("func main() {{ if ({}) return 1; }}", source)).unwrap();
        match &program.functions[0].body[0] {
            Statement::SimpleConditional(c) => c.condition.clone(),
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    fn condition_error(source: &str) -> crate::parser::diagnostics::ParseError {
        match parse(&format!("func main() {{ if ({}) return 1; }}", source)).unwrap_err() {
            Diagnostic::Syntax(e) => e,
            other => panic!("expected syntax error, got {}", other),
        }
    }

    #[test]
    fn test_literal_conditions() {
        assert_eq!(condition_of("true"), Condition::True);
        assert_eq!(condition_of("false"), Condition::False);
    }

    #[test]
    fn test_all_relational_operators() {
        let cases = [
            ("<", RelationalOperator::Less),
            (">", RelationalOperator::Greater),
            ("<=", RelationalOperator::LessEqual),
            (">=", RelationalOperator::GreaterEqual),
            ("==", RelationalOperator::Equal),
            ("!=", RelationalOperator::NotEqual),
        ];
        for (symbol, operator) in cases {
            assert_eq!(
                condition_of(&format!("a {} 1", symbol)),
                AST::comparison(operator, AST::variable("a"), AST::number(1))
            );
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let cond = condition_of("a < 1 || b < 2 && true");
        assert_eq!(
            cond,
            AST::disjunction(
                AST::comparison(RelationalOperator::Less, AST::variable("a"), AST::number(1)),
                AST::conjunction(
                    AST::comparison(RelationalOperator::Less, AST::variable("b"), AST::number(2)),
                    Condition::True
                )
            )
        );
    }

    #[test]
    fn test_grouped_condition() {
        let cond = condition_of("(false || true) && x == 0");
        assert_eq!(
            cond,
            AST::conjunction(
                AST::disjunction(Condition::False, Condition::True),
                AST::comparison(RelationalOperator::Equal, AST::variable("x"), AST::number(0))
            )
        );
    }

    #[test]
    fn test_parenthesised_operand_backtracks() {
        let cond = condition_of("(a + 1) * 2 >= b");
        assert_eq!(
            cond,
            AST::comparison(
                RelationalOperator::GreaterEqual,
                AST::binary(
                    ArithmeticOperator::Multiply,
                    AST::binary(ArithmeticOperator::Add, AST::variable("a"), AST::number(1)),
                    AST::number(2)
                ),
                AST::variable("b")
            )
        );
    }

    #[test]
    fn test_comparison_of_calls_and_strings() {
        let cond = condition_of("name(x) != \"root\"");
        assert_eq!(
            cond,
            AST::comparison(
                RelationalOperator::NotEqual,
                AST::call("name", vec![AST::variable("x")]),
                AST::string("root")
            )
        );
    }

    #[test]
    fn test_missing_relational_operator() {
        let err = condition_error("a + 1");
        assert_eq!(err.expected, RELATIONAL_OPERATORS.to_vec());
        assert_eq!(err.found, TokenKind::RParen);
    }

    #[test]
    fn test_invalid_condition_start() {
        let err = condition_error("== 1");
        assert_eq!(err.expected, CONDITION_START.to_vec());
        assert_eq!(err.found, TokenKind::EqualEqual);
    }

    #[test]
    fn test_bang_is_not_a_condition() {
        let err = condition_error("!true");
        assert_eq!(err.found, TokenKind::Bang);
    }

    #[test]
    fn test_furthest_error_is_reported() {
        // the grouped reading stops at the inner `)`, the arithmetic one at `;`
        let err = condition_error("(a + 1) ; ");
        assert_eq!(err.found, TokenKind::Semicolon);
        assert_eq!(err.expected, RELATIONAL_OPERATORS.to_vec());
    }
}
