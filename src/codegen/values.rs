//! Value rendering and call hoisting
//!
//! An expression reaches the output in one of three shapes:
//! - a *word*: one quoted shell word, e.g. `"$x"`, `'text'`, `$((a + 1))`
//! - an *arithmetic* operand inside `$(( ))`, e.g. `$x`, `(a * 2)`
//! - a *splice*: text substituted into raw shell code, e.g. `${x}`
//!
//! Outside raw text a call in value position is hoisted: the call runs as a
//! statement of its own, its result is copied from `__ret` into a fresh
//! temporary and the temporary stands in for the call. Arguments are hoisted
//! depth first, left to right, so calls run in source order. An operand left
//! of a hoisted call that reads a variable is copied to a temporary first, so
//! it sees the value from before the call. Raw text cannot
//! host statements, so calls there become command substitutions instead.

use crate::ast::types::{ArithmeticOperator, Expression, FunctionCall, RawEnvironment, RawFragment};
use crate::codegen::generator::Context;
use crate::codegen::options::RESULT_VAR;

impl Context<'_> {
    /// Shell command invoking `call`, with its arguments already evaluated.
    pub(super) fn call_command(&mut self, call: &FunctionCall) -> String {
        let mut command = self.names.translate(&call.name);
        for (i, argument) in call.arguments.iter().enumerate() {
            command.push(' ');
            let later_hoists = call.arguments[i + 1..].iter().any(contains_call);
            let word = self.ordered_word(argument, later_hoists);
            command.push_str(&word);
        }
        command
    }

    /// Like [`word`](Self::word), but when a later operand hoists a call the
    /// value is captured now so it is read before that call runs.
    pub(super) fn ordered_word(&mut self, expr: &Expression, later_hoists: bool) -> String {
        if later_hoists && self.inline == 0 && !is_stable(expr) {
            format!("\"${}\"", self.snapshot(expr))
        } else {
            self.word(expr)
        }
    }

    /// Copy the current value of `expr` into a fresh temporary.
    fn snapshot(&mut self, expr: &Expression) -> String {
        let value = self.word(expr);
        self.assign_temp(&value)
    }

    fn assign_temp(&mut self, value: &str) -> String {
        let temp = self.fresh_temp();
        let local = self.local_prefix();
        self.line(&format!("{}{}={}", local, temp, value));
        temp
    }

    /// Unquoted expansion yielding the result of `call`.
    fn call_result(&mut self, call: &FunctionCall) -> String {
        if self.inline > 0 {
            let command = self.call_command(call);
            return format!("$({} >/dev/null; printf '%s' \"${}\")", command, RESULT_VAR);
        }

        let command = self.call_command(call);
        self.line(&command);
        let temp = self.assign_temp(&format!("\"${}\"", RESULT_VAR));
        format!("${}", temp)
    }

    /// The expression as a single shell word.
    pub(super) fn word(&mut self, expr: &Expression) -> String {
        match expr {
            Expression::Variable(v) => format!("\"${}\"", self.names.translate(&v.name)),
            Expression::Number(n) => n.value.to_string(),
            Expression::String(s) => single_quote(&s.value),
            Expression::Binary(_) => format!("$(({}))", self.arithmetic(expr)),
            Expression::Call(call) => format!("\"{}\"", self.call_result(call)),
            Expression::Raw(env) => format!("\"$({})\"", self.raw_text(env)),
        }
    }

    /// The expression as it appears inside `$(( ))`.
    fn arithmetic(&mut self, expr: &Expression) -> String {
        match expr {
            Expression::Binary(b) => {
                let level = precedence(b.operator);
                let left = if contains_call(&b.right) && self.inline == 0 && !is_stable(&b.left) {
                    format!("${}", self.snapshot(&b.left))
                } else {
                    self.arithmetic_operand(&b.left, level)
                };
                // right operands group at equal precedence: a - (b - c)
                let right = self.arithmetic_operand(&b.right, level + 1);
                format!("{} {} {}", left, b.operator.symbol(), right)
            }
            Expression::Variable(v) => format!("${}", self.names.translate(&v.name)),
            Expression::Number(n) => n.value.to_string(),
            // never let literal text reach arithmetic expansion unquoted
            Expression::String(s) if self.inline == 0 => {
                format!("${}", self.assign_temp(&single_quote(&s.value)))
            }
            Expression::String(s) => format!("$(printf '%s' {})", single_quote(&s.value)),
            Expression::Call(call) => self.call_result(call),
            Expression::Raw(env) => format!("$({})", self.raw_text(env)),
        }
    }

    /// Parenthesise a nested binary that binds looser than `min_level`.
    fn arithmetic_operand(&mut self, expr: &Expression, min_level: u8) -> String {
        match expr {
            Expression::Binary(b) if precedence(b.operator) < min_level => {
                format!("({})", self.arithmetic(expr))
            }
            other => self.arithmetic(other),
        }
    }

    /// Raw shell text with every splice substituted in place.
    pub(super) fn raw_text(&mut self, env: &RawEnvironment) -> String {
        self.inline += 1;
        let mut text = String::new();
        for fragment in &env.fragments {
            match fragment {
                RawFragment::Bash(bash) => text.push_str(&bash.text),
                RawFragment::Splice(splice) => {
                    let value = self.splice(&splice.expression);
                    text.push_str(&value);
                }
            }
        }
        self.inline -= 1;
        text.truncate(text.trim_end().len());
        text
    }

    fn splice(&mut self, expr: &Expression) -> String {
        match expr {
            Expression::Variable(v) => format!("${{{}}}", self.names.translate(&v.name)),
            Expression::Number(n) => n.value.to_string(),
            Expression::String(s) => s.value.clone(),
            Expression::Binary(_) => format!("$(({}))", self.arithmetic(expr)),
            Expression::Call(call) => self.call_result(call),
            Expression::Raw(env) => format!("$({})", self.raw_text(env)),
        }
    }
}

fn precedence(operator: ArithmeticOperator) -> u8 {
    match operator {
        ArithmeticOperator::Add | ArithmeticOperator::Subtract => 1,
        ArithmeticOperator::Multiply | ArithmeticOperator::Divide | ArithmeticOperator::Modulo => 2,
    }
}

/// Whether the rendered value of `expr` cannot change once rendered: literals
/// and calls, whose results already sit in temporaries.
pub(super) fn is_stable(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) | Expression::String(_) | Expression::Call(_) => true,
        Expression::Variable(_) | Expression::Raw(_) => false,
        Expression::Binary(b) => is_stable(&b.left) && is_stable(&b.right),
    }
}

/// Whether rendering `expr` outside raw text emits statements ahead of it.
pub(super) fn hoists(expr: &Expression) -> bool {
    match expr {
        Expression::Call(_) => true,
        Expression::Binary(b) => {
            // string operands of arithmetic go through a quoted temporary
            let operand = |e: &Expression| matches!(e, Expression::String(_)) || hoists(e);
            operand(&b.left) || operand(&b.right)
        }
        _ => false,
    }
}

/// Whether evaluating `expr` runs a function call.
pub(super) fn contains_call(expr: &Expression) -> bool {
    match expr {
        Expression::Call(_) => true,
        Expression::Binary(b) => contains_call(&b.left) || contains_call(&b.right),
        Expression::Variable(_) | Expression::Number(_) | Expression::String(_) => false,
        Expression::Raw(_) => false,
    }
}

/// Wrap `text` in single quotes; embedded quotes become `'\''`.
pub fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::AST;
    use crate::codegen::generator::CodeGenerator;
    use crate::parser::{parse, parse_expression};

    fn body_of(source: &str) -> Vec<String> {
        let program = parse(&format!("func main() {{ {} }}", source)).unwrap();
        let script = CodeGenerator::default().generate(&program);
        script
            .lines()
            .skip_while(|l| *l != "main() {")
            .skip(1)
            .take_while(|l| *l != "}")
            .map(|l| l.trim().to_string())
            .collect()
    }

    #[test]
    fn test_single_quote() {
        assert_eq!(single_quote("plain"), "'plain'");
        assert_eq!(single_quote("it's"), "'it'\\''s'");
        assert_eq!(single_quote("$HOME"), "'$HOME'");
    }

    #[test]
    fn test_contains_call() {
        assert!(contains_call(&parse_expression("1 + f()").unwrap()));
        assert!(!contains_call(&parse_expression("1 + x * 2").unwrap()));
        assert!(!contains_call(&parse_expression("$(echo $[ f() ])").unwrap()));
        assert!(!contains_call(&AST::binary(
            ArithmeticOperator::Add,
            AST::number(1),
            AST::string("2")
        )));
    }

    #[test]
    fn test_hoists() {
        assert!(hoists(&parse_expression("f()").unwrap()));
        assert!(hoists(&parse_expression("x * \"3\"").unwrap()));
        assert!(!hoists(&parse_expression("\"3\"").unwrap()));
        assert!(!hoists(&parse_expression("x * 3").unwrap()));
    }

    #[test]
    fn test_variable_argument_read_before_later_call() {
        assert_eq!(
            body_of("var r = f(x, g());"),
            vec![
                "local __t1=\"$x\"",
                "g",
                "local __t2=\"$__ret\"",
                "f \"$__t1\" \"$__t2\"",
                "local r=\"$__ret\"",
            ]
        );
        // arguments after the last call are read in place
        assert_eq!(
            body_of("f(g(), x);"),
            vec!["g", "local __t1=\"$__ret\"", "f \"$__t1\" \"$x\""]
        );
    }

    #[test]
    fn test_arithmetic_operand_read_before_later_call() {
        assert_eq!(
            body_of("var r = x + g();"),
            vec![
                "local __t1=\"$x\"",
                "g",
                "local __t2=\"$__ret\"",
                "local r=$(($__t1 + $__t2))",
            ]
        );
        assert_eq!(
            body_of("var r = 2 * x - g(x);"),
            vec![
                "local __t1=$((2 * $x))",
                "g \"$x\"",
                "local __t2=\"$__ret\"",
                "local r=$(($__t1 - $__t2))",
            ]
        );
    }

    #[test]
    fn test_string_in_arithmetic_stays_quoted() {
        assert_eq!(
            body_of("var r = 1 + \"$(echo INJECTED >&2; echo 5)\";"),
            vec![
                "local __t1='$(echo INJECTED >&2; echo 5)'",
                "local r=$((1 + $__t1))",
            ]
        );
        assert_eq!(
            body_of("raw { echo $[ n + \"2\" ] }"),
            vec!["echo $(($n + $(printf '%s' '2')))"]
        );
    }

    #[test]
    fn test_arithmetic_grouping() {
        assert_eq!(
            body_of("var r = (a + 1) * (b - c) / 2;"),
            vec!["local r=$((($a + 1) * ($b - $c) / 2))"]
        );
        assert_eq!(body_of("var r = a - (b - c);"), vec!["local r=$(($a - ($b - $c)))"]);
        assert_eq!(body_of("var r = a * b + c % 2;"), vec!["local r=$(($a * $b + $c % 2))"]);
    }

    #[test]
    fn test_string_and_variable_words() {
        assert_eq!(
            body_of("var s = \"it's\"; var t = s;"),
            vec!["local s='it'\\''s'", "local t=\"$s\""]
        );
    }

    #[test]
    fn test_nested_call_arguments_hoist_depth_first() {
        assert_eq!(
            body_of("f(g(h(1)), 2 * k());"),
            vec![
                "h 1",
                "local __t1=\"$__ret\"",
                "g \"$__t1\"",
                "local __t2=\"$__ret\"",
                "k",
                "local __t3=\"$__ret\"",
                "f \"$__t2\" $((2 * $__t3))",
            ]
        );
    }

    #[test]
    fn test_command_substitution_value() {
        assert_eq!(
            body_of("var n = $(wc -l < $[ path ]);"),
            vec!["local n=\"$(wc -l < ${path})\""]
        );
    }

    #[test]
    fn test_call_inside_splice_is_not_hoisted() {
        assert_eq!(
            body_of("raw { echo $[ f(x, 1) ] }"),
            vec!["echo $(f \"$x\" 1 >/dev/null; printf '%s' \"$__ret\")"]
        );
    }

    #[test]
    fn test_splice_forms() {
        assert_eq!(
            body_of("raw { printf '%s %s %s\\n' $[ \"a\" ] $[ n + 1 ] $[ 7 ] }"),
            vec!["printf '%s %s %s\\n' a $(($n + 1)) 7"]
        );
    }

    #[test]
    fn test_raw_inside_splice() {
        assert_eq!(
            body_of("raw { echo $[ $(date +%s) ] }"),
            vec!["echo $(date +%s)"]
        );
    }
}
