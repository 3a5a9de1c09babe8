//! punch - A compiler from the Punch scripting language to POSIX shell
//!
//! Pipeline:
//!   Source → Lexer → Parser → AST → Code Generator → Shell script
//!
//! ```
//! let script = punch::compile("func main() { return 1 + 2; }").unwrap();
//! assert!(script.contains("__ret=$((1 + 2))"));
//! ```

pub mod ast;
pub mod codegen;
pub mod parser;

pub use ast::types::*;
pub use codegen::{CodeGenerator, GeneratorOptions, NameTable};
pub use parser::{parse, Diagnostic, LexError, ParseError, Parser};

/// Compile Punch source into a shell script with default options.
pub fn compile(source: &str) -> Result<String, Diagnostic> {
    compile_with(source, &GeneratorOptions::default())
}

/// Compile Punch source into a shell script.
pub fn compile_with(source: &str, options: &GeneratorOptions) -> Result<String, Diagnostic> {
    let program = parse(source)?;
    Ok(CodeGenerator::new(options.clone()).generate(&program))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTORIAL: &str = r#"
        var limit = 5;

        func fact(n) {
            if (n <= 1) return 1;
            return n * fact(n - 1);
        }

        func main() {
            var result = fact(limit);
            raw { echo "fact($[ limit ]) = $[ result ]" }
        }
    "#;

    #[test]
    fn test_compile_end_to_end() {
        let script = compile(FACTORIAL).unwrap();
        let expected = "#!/bin/sh\n\
\n\
# global variables\n\
limit=5\n\
\n\
# functions\n\
fact() {\n\
\x20   local n=\"$1\"\n\
\x20   if [ \"$n\" -le 1 ]; then\n\
\x20       __ret=1\n\
\x20       return\n\
\x20   fi\n\
\x20   local __t1=\"$n\"\n\
\x20   fact $(($n - 1))\n\
\x20   local __t2=\"$__ret\"\n\
\x20   __ret=$(($__t1 * $__t2))\n\
\x20   return\n\
}\n\
\n\
main() {\n\
\x20   fact \"$limit\"\n\
\x20   local result=\"$__ret\"\n\
\x20   echo \"fact(${limit}) = ${result}\"\n\
}\n\
\n\
# entry point\n\
main \"$@\"\n";
        assert_eq!(script, expected);
    }

    #[test]
    fn test_operands_evaluate_in_source_order() {
        let script = compile(
            r#"
            var x = 1;
            func g() { x = 2; return 0; }
            func h() { x = 10; return 5; }
            func f(a, b) { return a; }
            func main() {
                var r = f(x, g());
                x = 1;
                var s = x + h();
                x = 1;
                if (x < 2 && h() > 0) raw { echo "r=$[ r ] s=$[ s ] ok" }
            }
            "#,
        )
        .unwrap();
        // skip where no POSIX shell is installed
        let Ok(output) = std::process::Command::new("sh").arg("-c").arg(&script).output() else {
            return;
        };
        assert_eq!(String::from_utf8_lossy(&output.stdout), "r=1 s=6 ok\n");
    }

    #[test]
    fn test_compile_reports_first_diagnostic() {
        let err = compile("func f( { }").unwrap_err();
        assert_eq!((err.line(), err.column()), (1, 9));
        assert_eq!(err.to_string(), "syntax error at 1:9: expected IDENT but found '{'");
    }

    #[test]
    fn test_compile_with_options() {
        let options = GeneratorOptions {
            shebang: "#!/usr/bin/env bash".to_string(),
            ..GeneratorOptions::default()
        };
        let script = compile_with("func main() { }", &options).unwrap();
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
    }

    #[test]
    fn test_lexical_errors_surface() {
        let err = compile("func main() { raw { echo $[ 1 }").unwrap_err();
        assert!(matches!(err, Diagnostic::Lexical(_)));
    }
}
