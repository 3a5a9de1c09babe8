//! Code Generator
//!
//! Walks a parsed [`Program`] and emits a POSIX shell script:
//!
//! ```text
//! #!/bin/sh
//!
//! # global variables
//! ...
//!
//! # functions
//! name() {
//!     ...
//! }
//!
//! # entry point
//! main "$@"
//! ```
//!
//! Shell functions cannot yield a value to an enclosing expression, so every
//! function hands its result back through [`RESULT_VAR`] and calls that sit in
//! value position are hoisted into statements of their own (see `values.rs`).

use crate::ast::types::{
    Assignment, BranchingConditional, Conditional, ElseBranch, Expression, FunctionDecl, Program,
    SimpleConditional, Statement,
};
use crate::codegen::identifiers::NameTable;
use crate::codegen::options::{GeneratorOptions, RESULT_VAR, TEMP_PREFIX};

/// Translates programs into shell scripts
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    options: GeneratorOptions,
}

impl CodeGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the complete script for `program`.
    pub fn generate(&self, program: &Program) -> String {
        self.generate_with_names(program).0
    }

    /// Generate the script and hand back the name table built along the way.
    pub fn generate_with_names(&self, program: &Program) -> (String, NameTable) {
        let mut ctx = Context::new(&self.options);
        ctx.program(program);
        (ctx.out, ctx.names)
    }
}

/// Mutable state of a single generation run
pub(super) struct Context<'a> {
    pub(super) options: &'a GeneratorOptions,
    pub(super) names: NameTable,
    pub(super) out: String,
    pub(super) depth: usize,
    temps: usize,
    /// Inside a function body, where `local` is available
    pub(super) in_function: bool,
    /// Inside raw text, where calls cannot be hoisted
    pub(super) inline: usize,
}

impl<'a> Context<'a> {
    fn new(options: &'a GeneratorOptions) -> Self {
        Self {
            options,
            names: NameTable::new(),
            out: String::new(),
            depth: 0,
            temps: 0,
            in_function: false,
            inline: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Output helpers
    // -------------------------------------------------------------------------

    /// Emit one line at the current indentation.
    pub(super) fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.options.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(super) fn fresh_temp(&mut self) -> String {
        self.temps += 1;
        format!("{}{}", TEMP_PREFIX, self.temps)
    }

    /// `local ` inside functions, nothing at global scope.
    pub(super) fn local_prefix(&self) -> &'static str {
        if self.in_function {
            "local "
        } else {
            ""
        }
    }

    /// Run `emit` one level deeper; emits `:` if it produced nothing.
    fn nested(&mut self, emit: impl FnOnce(&mut Self)) {
        self.depth += 1;
        let before = self.out.len();
        emit(self);
        if self.out.len() == before {
            self.line(":");
        }
        self.depth -= 1;
    }

    // -------------------------------------------------------------------------
    // Program structure
    // -------------------------------------------------------------------------

    fn program(&mut self, program: &Program) {
        let shebang = self.options.shebang.clone();
        self.line(&shebang);
        self.blank();

        self.line("# global variables");
        for global in &program.globals {
            self.assignment(global);
        }
        self.blank();

        self.line("# functions");
        for (i, function) in program.functions.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.function(function);
        }
        self.blank();

        self.line("# entry point");
        let entry = self.names.translate(&self.options.entry_point);
        self.line(&format!("{} \"$@\"", entry));
    }

    fn function(&mut self, function: &FunctionDecl) {
        let name = self.names.translate(&function.name);
        self.line(&format!("{}() {{", name));

        self.in_function = true;
        self.nested(|ctx| {
            for (i, parameter) in function.parameters.iter().enumerate() {
                let param = ctx.names.translate(&parameter.name);
                ctx.line(&format!("local {}=\"${}\"", param, positional(i + 1)));
            }
            for stmt in &function.body {
                ctx.statement(stmt);
            }
        });
        self.in_function = false;

        self.line("}");
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Assignment(assignment) => self.assignment(assignment),
            Statement::Return(ret) => {
                if let Expression::Call(call) = &ret.value {
                    let command = self.call_command(call);
                    self.line(&command);
                } else {
                    let value = self.word(&ret.value);
                    self.line(&format!("{}={}", RESULT_VAR, value));
                }
                self.line("return");
            }
            Statement::Block(block) => {
                self.line("{");
                self.nested(|ctx| {
                    for inner in &block.statements {
                        ctx.statement(inner);
                    }
                });
                self.line("}");
            }
            Statement::SimpleConditional(c) => self.simple_conditional(c),
            Statement::BranchingConditional(c) => self.branching_conditional(c),
            Statement::Expression(expr) => self.expression_statement(expr),
        }
    }

    fn assignment(&mut self, assignment: &Assignment) {
        let target = self.names.translate(&assignment.target.name);
        let keyword = if assignment.declaration {
            self.local_prefix()
        } else {
            ""
        };

        let value = if let Expression::Call(call) = &assignment.value {
            let command = self.call_command(call);
            self.line(&command);
            format!("\"${}\"", RESULT_VAR)
        } else {
            self.word(&assignment.value)
        };
        self.line(&format!("{}{}={}", keyword, target, value));
    }

    fn expression_statement(&mut self, expr: &Expression) {
        match expr {
            Expression::Call(call) => {
                let command = self.call_command(call);
                self.line(&command);
            }
            // raw text keeps its source layout; only its first line is
            // placed at the current indentation, so here-documents survive
            Expression::Raw(env) => {
                let text = self.raw_text(env);
                if !text.is_empty() {
                    self.line(&text);
                }
            }
            other => {
                let value = self.word(other);
                self.line(&format!(": {}", value));
            }
        }
    }

    /// Conditional bodies are inlined into the `then`/`else` part rather than
    /// wrapped in a brace group.
    fn body(&mut self, stmt: &Statement) {
        self.nested(|ctx| match stmt {
            Statement::Block(block) => {
                for inner in &block.statements {
                    ctx.statement(inner);
                }
            }
            other => ctx.statement(other),
        });
    }

    fn simple_conditional(&mut self, c: &SimpleConditional) {
        let test = self.condition(&c.condition);
        self.line(&format!("if {}; then", test));
        self.body(&c.body);
        self.line("fi");
    }

    fn branching_conditional(&mut self, c: &BranchingConditional) {
        let test = self.condition(&c.condition);
        self.line(&format!("if {}; then", test));
        self.body(&c.if_body);
        self.else_branch(&c.else_body);
        self.line("fi");
    }

    /// `else if` chains collapse into `elif` unless the nested condition
    /// needs calls hoisted ahead of it.
    fn else_branch(&mut self, branch: &ElseBranch) {
        match branch {
            ElseBranch::Statement(stmt) => {
                self.line("else");
                self.body(stmt);
            }
            ElseBranch::Conditional(nested) if !self.condition_hoists(nested.condition()) => {
                let test = self.condition(nested.condition());
                self.line(&format!("elif {}; then", test));
                match nested.as_ref() {
                    Conditional::Simple(s) => self.body(&s.body),
                    Conditional::Branching(b) => {
                        self.body(&b.if_body);
                        self.else_branch(&b.else_body);
                    }
                }
            }
            ElseBranch::Conditional(nested) => {
                self.line("else");
                self.nested(|ctx| match nested.as_ref() {
                    Conditional::Simple(s) => ctx.simple_conditional(s),
                    Conditional::Branching(b) => ctx.branching_conditional(b),
                });
            }
        }
    }
}

/// `$1` .. `$9`, then `${10}` onwards.
fn positional(index: usize) -> String {
    if index < 10 {
        index.to_string()
    } else {
        format!("{{{}}}", index)
    }
}
