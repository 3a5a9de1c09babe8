//! Human-readable dump of the AST.
//!
//! Statements print in source layout; expressions and conditions print in a
//! parenthesised prefix form so that grouping is explicit:
//! `1 + 2 * 3` prints as `(+ 1 (* 2 3))`.

use std::fmt::{self, Display, Formatter};

use super::types::*;

const INDENT: &str = "    ";

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for global in &self.globals {
            writeln!(f, "{}", global)?;
        }
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 || !self.globals.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "{}", function)?;
        }
        Ok(())
    }
}

impl Display for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        writeln!(f, "func {}({}) {{", self.name, params.join(", "))?;
        for stmt in &self.body {
            write_statement(f, stmt, 1)?;
        }
        write!(f, "}}")
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.declaration {
            write!(f, "var ")?;
        }
        write!(f, "{} = {};", self.target.name, self.value)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

fn pad(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_statement(f: &mut Formatter<'_>, stmt: &Statement, depth: usize) -> fmt::Result {
    match stmt {
        Statement::Assignment(a) => {
            pad(f, depth)?;
            writeln!(f, "{}", a)
        }
        Statement::Return(r) => {
            pad(f, depth)?;
            writeln!(f, "return {};", r.value)
        }
        Statement::Expression(Expression::Raw(raw)) => {
            pad(f, depth)?;
            writeln!(f, "raw {{ {} }}", RawBody(raw))
        }
        Statement::Expression(e) => {
            pad(f, depth)?;
            writeln!(f, "{};", e)
        }
        Statement::Block(block) => {
            pad(f, depth)?;
            writeln!(f, "{{")?;
            for inner in &block.statements {
                write_statement(f, inner, depth + 1)?;
            }
            pad(f, depth)?;
            writeln!(f, "}}")
        }
        Statement::SimpleConditional(c) => {
            pad(f, depth)?;
            write_simple(f, c, depth)
        }
        Statement::BranchingConditional(c) => {
            pad(f, depth)?;
            write_branching(f, c, depth)
        }
    }
}

fn write_simple(f: &mut Formatter<'_>, c: &SimpleConditional, depth: usize) -> fmt::Result {
    writeln!(f, "if {}", c.condition)?;
    write_statement(f, &c.body, depth + 1)
}

fn write_branching(f: &mut Formatter<'_>, c: &BranchingConditional, depth: usize) -> fmt::Result {
    writeln!(f, "if {}", c.condition)?;
    write_statement(f, &c.if_body, depth + 1)?;
    pad(f, depth)?;
    match &c.else_body {
        ElseBranch::Statement(stmt) => {
            writeln!(f, "else")?;
            write_statement(f, stmt, depth + 1)
        }
        ElseBranch::Conditional(nested) => {
            write!(f, "else ")?;
            match nested.as_ref() {
                Conditional::Simple(s) => write_simple(f, s, depth),
                Conditional::Branching(b) => write_branching(f, b, depth),
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v.name),
            Expression::Number(n) => write!(f, "{}", n.value),
            Expression::String(s) => write!(f, "\"{}\"", s.value),
            Expression::Binary(b) => write!(f, "({} {} {})", b.operator.symbol(), b.left, b.right),
            Expression::Call(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Raw(raw) => write!(f, "$({})", RawBody(raw)),
        }
    }
}

struct RawBody<'a>(&'a RawEnvironment);

impl Display for RawBody<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for fragment in &self.0.fragments {
            match fragment {
                RawFragment::Bash(text) => write!(f, "{}", text.text)?,
                RawFragment::Splice(splice) => write!(f, "$[{}]", splice.expression)?,
            }
        }
        Ok(())
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => write!(f, "true"),
            Condition::False => write!(f, "false"),
            Condition::Comparison(c) => write!(f, "({} {} {})", c.operator.symbol(), c.left, c.right),
            Condition::Conjunction { left, right } => write!(f, "(&& {} {})", left, right),
            Condition::Disjunction { left, right } => write!(f, "(|| {} {})", left, right),
        }
    }
}
