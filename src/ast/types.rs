//! Abstract Syntax Tree (AST) Types for Punch
//!
//! Every node owns its children outright (`Box`/`Vec`); there are no parent
//! pointers and no sharing. Nodes are built once by the parser and only read
//! afterwards.

use serde::Serialize;

// =============================================================================
// PROGRAM & FUNCTIONS
// =============================================================================

/// Root node: global bindings followed by function declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub globals: Vec<Assignment>,
    pub functions: Vec<FunctionDecl>,
}

/// func name(a, b) { ... }
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<Variable>,
    pub body: Vec<Statement>,
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Assignment(Assignment),
    Return(Return),
    Block(StatementBlock),
    SimpleConditional(SimpleConditional),
    BranchingConditional(BranchingConditional),
    Expression(Expression),
}

/// `var x = e;` (declaration) or `x = e;` (rebinding)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub declaration: bool,
    pub target: Variable,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    pub value: Expression,
}

/// { stmt* }
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatementBlock {
    pub statements: Vec<Statement>,
}

/// if (cond) body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleConditional {
    pub condition: Condition,
    pub body: Box<Statement>,
}

/// if (cond) body else other
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchingConditional {
    pub condition: Condition,
    pub if_body: Box<Statement>,
    pub else_body: ElseBranch,
}

/// The two well-formed shapes of an else branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElseBranch {
    Statement(Box<Statement>),
    /// `else if ...`
    Conditional(Box<Conditional>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Conditional {
    Simple(SimpleConditional),
    Branching(BranchingConditional),
}

impl Conditional {
    pub fn condition(&self) -> &Condition {
        match self {
            Self::Simple(c) => &c.condition,
            Self::Branching(c) => &c.condition,
        }
    }
}

impl From<Conditional> for Statement {
    fn from(conditional: Conditional) -> Self {
        match conditional {
            Conditional::Simple(c) => Statement::SimpleConditional(c),
            Conditional::Branching(c) => Statement::BranchingConditional(c),
        }
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Variable(Variable),
    Number(NumberLiteral),
    String(StringLiteral),
    Binary(BinaryExpression),
    Call(FunctionCall),
    Raw(RawEnvironment),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variable {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberLiteral {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    pub value: String,
}

/// Arithmetic only; comparisons live in [`Condition`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub operator: ArithmeticOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Expression>,
}

/// Body of `raw { ... }` or `$( ... )`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawEnvironment {
    pub fragments: Vec<RawFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RawFragment {
    Bash(RawBashFragment),
    Splice(RawSpliceExpression),
}

/// Target-language text copied verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawBashFragment {
    pub text: String,
}

/// `$[ expr ]` inside a raw environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSpliceExpression {
    pub expression: Expression,
}

// =============================================================================
// CONDITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    True,
    False,
    Comparison(BinaryComparison),
    Conjunction {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Disjunction {
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryComparison {
    pub operator: RelationalOperator,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationalOperator {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl RelationalOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

// =============================================================================
// FACTORY FUNCTIONS
// =============================================================================

/// Shorthand constructors, mostly used by the parser and by tests
pub struct AST;

impl AST {
    pub fn variable(name: impl Into<String>) -> Expression {
        Expression::Variable(Variable { name: name.into() })
    }

    pub fn number(value: i64) -> Expression {
        Expression::Number(NumberLiteral { value })
    }

    pub fn string(value: impl Into<String>) -> Expression {
        Expression::String(StringLiteral { value: value.into() })
    }

    pub fn binary(operator: ArithmeticOperator, left: Expression, right: Expression) -> Expression {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expression>) -> Expression {
        Expression::Call(FunctionCall {
            name: name.into(),
            arguments,
        })
    }

    pub fn assignment(declaration: bool, target: impl Into<String>, value: Expression) -> Assignment {
        Assignment {
            declaration,
            target: Variable { name: target.into() },
            value,
        }
    }

    pub fn conjunction(left: Condition, right: Condition) -> Condition {
        Condition::Conjunction {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn disjunction(left: Condition, right: Condition) -> Condition {
        Condition::Disjunction {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn comparison(operator: RelationalOperator, left: Expression, right: Expression) -> Condition {
        Condition::Comparison(BinaryComparison { operator, left, right })
    }
}
