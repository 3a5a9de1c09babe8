use clap::{Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use punch::codegen::{CodeGenerator, GeneratorOptions};
use punch::parser::{Diagnostic, Lexer, Parser as PunchParser};

#[derive(Parser)]
#[command(name = "punch")]
#[command(about = "Compile Punch scripts to POSIX shell")]
#[command(version)]
struct Cli {
    /// Punch source file
    #[arg()]
    input: PathBuf,

    /// Where to write the shell script (defaults to INPUT with a .sh extension)
    #[arg()]
    output: Option<PathBuf>,

    /// Artifact to produce
    #[arg(long, value_enum, default_value_t = Emit::Shell)]
    emit: Emit,

    /// Interpreter line at the top of the generated script
    #[arg(long)]
    shebang: Option<String>,

    /// Spaces per indentation level
    #[arg(long, value_name = "WIDTH")]
    indent: Option<usize>,

    /// Do not echo the generated script to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Report each stage on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Generated shell script
    Shell,
    /// Token stream, one token per line
    Tokens,
    /// Parsed program in source layout
    Ast,
    /// Parsed program as JSON
    AstJson,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },

    #[error("output path {} is the input file", .0.display())]
    OverwritesInput(PathBuf),

    #[error("{0}")]
    Compile(String),

    #[error("cannot serialize AST: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("punch: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    if cli.verbose {
        eprintln!("punch: read {} bytes from {}", source.len(), cli.input.display());
    }

    let compile_error = |diagnostic: Diagnostic| CliError::Compile(diagnostic.render(&source));

    let tokens = Lexer::new(&source)
        .tokenize()
        .map_err(|e| compile_error(e.into()))?;
    if cli.verbose {
        eprintln!("punch: lexed {} tokens", tokens.len());
    }
    if cli.emit == Emit::Tokens {
        for token in &tokens {
            println!("{}", token);
        }
        return Ok(());
    }

    let program = PunchParser::new(tokens)
        .parse_program()
        .map_err(|e| compile_error(e.into()))?;
    if cli.verbose {
        eprintln!(
            "punch: parsed {} globals, {} functions",
            program.globals.len(),
            program.functions.len()
        );
    }
    match cli.emit {
        Emit::Ast => {
            print!("{}", program);
            return Ok(());
        }
        Emit::AstJson => {
            println!("{}", serde_json::to_string_pretty(&program)?);
            return Ok(());
        }
        Emit::Shell | Emit::Tokens => {}
    }

    let generator = CodeGenerator::new(generator_options(cli));
    let (script, names) = generator.generate_with_names(&program);
    if cli.verbose {
        for (source_name, shell_name) in names.renamed() {
            eprintln!("punch: renamed {} to {}", source_name, shell_name);
        }
    }

    let output = output_path(&cli.input, cli.output.as_deref());
    if output == cli.input {
        return Err(CliError::OverwritesInput(output));
    }
    fs::write(&output, &script).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    if cli.verbose {
        eprintln!("punch: wrote {}", output.display());
    }

    if !cli.quiet {
        print!("{}", script);
    }
    Ok(())
}

fn generator_options(cli: &Cli) -> GeneratorOptions {
    let mut options = GeneratorOptions::default();
    if let Some(shebang) = &cli.shebang {
        options.shebang = shebang.clone();
    }
    if let Some(width) = cli.indent {
        options = options.with_indent_width(width);
    }
    options
}

fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("sh"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(output_path(Path::new("demo/hello.punch"), None), PathBuf::from("demo/hello.sh"));
        assert_eq!(output_path(Path::new("hello"), None), PathBuf::from("hello.sh"));
        assert_eq!(
            output_path(Path::new("hello.punch"), Some(Path::new("out/run.sh"))),
            PathBuf::from("out/run.sh")
        );
    }

    #[test]
    fn test_cli_options_map_onto_generator() {
        let cli = Cli::parse_from(["punch", "a.punch", "--shebang", "#!/bin/bash", "--indent", "2"]);
        let options = generator_options(&cli);
        assert_eq!(options.shebang, "#!/bin/bash");
        assert_eq!(options.indent, "  ");
        assert_eq!(cli.emit, Emit::Shell);
    }

    #[test]
    fn test_emit_values() {
        let cli = Cli::parse_from(["punch", "a.punch", "--emit", "ast-json", "-q"]);
        assert_eq!(cli.emit, Emit::AstJson);
        assert!(cli.quiet);
        assert!(cli.output.is_none());
    }
}
