//! Condition rendering
//!
//! Comparisons become `test` invocations. Integer operators are used unless
//! one side is a string literal, in which case the string forms apply:
//!
//! | source | numeric          | string                |
//! |--------|------------------|-----------------------|
//! | `==`   | `[ a -eq b ]`    | `[ a = b ]`           |
//! | `!=`   | `[ a -ne b ]`    | `[ a != b ]`          |
//! | `<`    | `[ a -lt b ]`    | `[ a \< b ]`          |
//! | `>`    | `[ a -gt b ]`    | `[ a \> b ]`          |
//! | `<=`   | `[ a -le b ]`    | `! [ a \> b ]`        |
//! | `>=`   | `[ a -ge b ]`    | `! [ a \< b ]`        |
//!
//! `&&` and `||` have equal precedence in the shell, so a composite operand is
//! wrapped in a `{ ...; }` group unless it is the left operand of the same
//! operator.

use crate::ast::types::{BinaryComparison, Condition, Expression, RelationalOperator};
use crate::codegen::generator::Context;
use crate::codegen::values::{contains_call, hoists};

impl Context<'_> {
    /// Shell command list for `cond`; calls in operands are hoisted first.
    pub(super) fn condition(&mut self, cond: &Condition) -> String {
        self.ordered_condition(cond, false)
    }

    /// Whether rendering `cond` emits statements ahead of the test.
    pub(super) fn condition_hoists(&self, cond: &Condition) -> bool {
        any_operand(cond, hoists)
    }

    /// `later_hoists` is set when a call to the right of `cond` is hoisted
    /// ahead of the test, so variables read here must be captured first.
    fn ordered_condition(&mut self, cond: &Condition, later_hoists: bool) -> String {
        match cond {
            Condition::True => "true".to_string(),
            Condition::False => "false".to_string(),
            Condition::Comparison(c) => self.comparison(c, later_hoists),
            Condition::Conjunction { left, right } => {
                self.composite(cond, (&**left, "&&", &**right), later_hoists)
            }
            Condition::Disjunction { left, right } => {
                self.composite(cond, (&**left, "||", &**right), later_hoists)
            }
        }
    }

    fn composite(
        &mut self,
        parent: &Condition,
        (left, operator, right): (&Condition, &str, &Condition),
        later_hoists: bool,
    ) -> String {
        let right_calls = any_operand(right, contains_call);
        let left_text = self.ordered_condition(left, later_hoists || right_calls);
        let right_text = self.ordered_condition(right, later_hoists);
        let left_text = if is_composite(left) && !same_kind(parent, left) {
            group(&left_text)
        } else {
            left_text
        };
        let right_text = if is_composite(right) {
            group(&right_text)
        } else {
            right_text
        };
        format!("{} {} {}", left_text, operator, right_text)
    }

    fn comparison(&mut self, c: &BinaryComparison, later_hoists: bool) -> String {
        let left = self.ordered_word(&c.left, later_hoists || contains_call(&c.right));
        let right = self.ordered_word(&c.right, later_hoists);

        if is_string_literal(&c.left) || is_string_literal(&c.right) {
            match c.operator {
                RelationalOperator::Equal => format!("[ {} = {} ]", left, right),
                RelationalOperator::NotEqual => format!("[ {} != {} ]", left, right),
                RelationalOperator::Less => format!("[ {} \\< {} ]", left, right),
                RelationalOperator::Greater => format!("[ {} \\> {} ]", left, right),
                RelationalOperator::LessEqual => format!("! [ {} \\> {} ]", left, right),
                RelationalOperator::GreaterEqual => format!("! [ {} \\< {} ]", left, right),
            }
        } else {
            format!("[ {} {} {} ]", left, numeric_operator(c.operator), right)
        }
    }
}

fn numeric_operator(operator: RelationalOperator) -> &'static str {
    match operator {
        RelationalOperator::Less => "-lt",
        RelationalOperator::Greater => "-gt",
        RelationalOperator::LessEqual => "-le",
        RelationalOperator::GreaterEqual => "-ge",
        RelationalOperator::Equal => "-eq",
        RelationalOperator::NotEqual => "-ne",
    }
}

fn is_string_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::String(_))
}

fn is_composite(cond: &Condition) -> bool {
    matches!(cond, Condition::Conjunction { .. } | Condition::Disjunction { .. })
}

fn same_kind(a: &Condition, b: &Condition) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn group(text: &str) -> String {
    format!("{{ {}; }}", text)
}

/// Whether any comparison operand in `cond` satisfies `test`.
fn any_operand(cond: &Condition, test: fn(&Expression) -> bool) -> bool {
    match cond {
        Condition::True | Condition::False => false,
        Condition::Comparison(c) => test(&c.left) || test(&c.right),
        Condition::Conjunction { left, right } | Condition::Disjunction { left, right } => {
            any_operand(left, test) || any_operand(right, test)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::generator::CodeGenerator;
    use crate::parser::parse;

    /// The `if` line generated for `cond`, plus any hoisted lines before it
    fn test_of(cond: &str) -> Vec<String> {
        let program = parse(&format!("func main() {{ if ({}) f(); }}", cond)).unwrap();
        let script = CodeGenerator::default().generate(&program);
        script
            .lines()
            .skip_while(|l| *l != "main() {")
            .skip(1)
            .take_while(|l| !l.trim_start().starts_with("if "))
            .chain(script.lines().filter(|l| l.trim_start().starts_with("if ")))
            .map(|l| l.trim().to_string())
            .collect()
    }

    #[test]
    fn test_numeric_comparisons() {
        let cases = [
            ("a < 1", "if [ \"$a\" -lt 1 ]; then"),
            ("a > 1", "if [ \"$a\" -gt 1 ]; then"),
            ("a <= 1", "if [ \"$a\" -le 1 ]; then"),
            ("a >= 1", "if [ \"$a\" -ge 1 ]; then"),
            ("a == b", "if [ \"$a\" -eq \"$b\" ]; then"),
            ("a != b + 1", "if [ \"$a\" -ne $(($b + 1)) ]; then"),
        ];
        for (cond, expected) in cases {
            assert_eq!(test_of(cond), vec![expected.to_string()], "condition {}", cond);
        }
    }

    #[test]
    fn test_string_comparisons() {
        let cases = [
            ("s == \"yes\"", "if [ \"$s\" = 'yes' ]; then"),
            ("\"no\" != s", "if [ 'no' != \"$s\" ]; then"),
            ("s < \"m\"", "if [ \"$s\" \\< 'm' ]; then"),
            ("s > \"m\"", "if [ \"$s\" \\> 'm' ]; then"),
            ("s <= \"m\"", "if ! [ \"$s\" \\> 'm' ]; then"),
            ("s >= \"m\"", "if ! [ \"$s\" \\< 'm' ]; then"),
        ];
        for (cond, expected) in cases {
            assert_eq!(test_of(cond), vec![expected.to_string()], "condition {}", cond);
        }
    }

    #[test]
    fn test_boolean_composition() {
        assert_eq!(
            test_of("a < 1 && b < 2 && true"),
            vec!["if [ \"$a\" -lt 1 ] && [ \"$b\" -lt 2 ] && true; then"]
        );
        assert_eq!(
            test_of("false || a < 1 && b < 2"),
            vec!["if false || { [ \"$a\" -lt 1 ] && [ \"$b\" -lt 2 ]; }; then"]
        );
        assert_eq!(
            test_of("(false || true) && a == 1"),
            vec!["if { false || true; } && [ \"$a\" -eq 1 ]; then"]
        );
    }

    #[test]
    fn test_condition_calls_are_hoisted() {
        assert_eq!(
            test_of("g(x) > 0 || h() > 0"),
            vec![
                "g \"$x\"",
                "local __t1=\"$__ret\"",
                "h",
                "local __t2=\"$__ret\"",
                "if [ \"$__t1\" -gt 0 ] || [ \"$__t2\" -gt 0 ]; then",
            ]
        );
    }

    #[test]
    fn test_variables_read_before_later_calls() {
        assert_eq!(
            test_of("x < 1 || g() > 0"),
            vec![
                "local __t1=\"$x\"",
                "g",
                "local __t2=\"$__ret\"",
                "if [ \"$__t1\" -lt 1 ] || [ \"$__t2\" -gt 0 ]; then",
            ]
        );
        assert_eq!(
            test_of("x == g()"),
            vec![
                "local __t1=\"$x\"",
                "g",
                "local __t2=\"$__ret\"",
                "if [ \"$__t1\" -eq \"$__t2\" ]; then",
            ]
        );
        // nothing to capture when no call follows
        assert_eq!(
            test_of("g() > 0 && x < 1"),
            vec![
                "g",
                "local __t1=\"$__ret\"",
                "if [ \"$__t1\" -gt 0 ] && [ \"$x\" -lt 1 ]; then",
            ]
        );
    }

    #[test]
    fn test_string_in_arithmetic_hoists() {
        assert_eq!(
            test_of("x + \"2\" > 0"),
            vec![
                "local __t1='2'",
                "if [ $(($x + $__t1)) -gt 0 ]; then",
            ]
        );
    }
}
