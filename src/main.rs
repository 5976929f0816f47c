//! splc command-line driver
//!
//! ```bash
//! # Compile to stdout
//! splc program.spl
//!
//! # Compile to a file, logging each pass
//! splc program.spl -o program.bas -vv
//!
//! # Inspect the annotated syntax tree or the symbol table
//! splc program.spl --emit tree
//! splc program.spl --emit symbols
//! ```

use clap::{Parser, ValueEnum};
use splc::semantic::ScopeTree;
use splc::{compile, CompileError};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "splc",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compile SPL programs to line-numbered BASIC"
)]
struct Cli {
    /// SPL source file
    input: PathBuf,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to print on success
    #[arg(long, value_enum, default_value = "basic")]
    emit: Emit,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Generated BASIC program
    Basic,
    /// Resolved, type-annotated syntax tree
    Tree,
    /// Symbol table with unique names
    Symbols,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = std::fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;

    let file = cli.input.display().to_string();
    info!(file = %file, "compiling");
    let compilation = compile(&source, &file)?;

    let text = match cli.emit {
        Emit::Basic => compilation.basic.clone(),
        Emit::Tree => compilation.program.syntax_tree().to_string(),
        Emit::Symbols => SymbolTable(&compilation.scopes).to_string(),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, text).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => print!("{}", text),
    }
    Ok(())
}

fn report(err: &CliError) {
    if let CliError::Compile(compile_err) = err {
        for diagnostic in compile_err.diagnostics() {
            eprintln!("{}", diagnostic);
        }
    }
    eprintln!("error: {}", err);
}

/// Scopes in creation order, each followed by its symbols in declaration order
struct SymbolTable<'a>(&'a ScopeTree);

impl fmt::Display for SymbolTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes = self.0;
        for scope in scopes.scopes() {
            let indent = "  ".repeat(scope.level);
            writeln!(f, "{}scope {}", indent, scope.name)?;

            let mut ids: Vec<_> = scope.symbols.values().copied().collect();
            ids.sort_by_key(|id| id.0);
            for id in ids {
                let entry = scopes.symbol(id);
                writeln!(
                    f,
                    "{}  {:<6} {:<14} {:?} {}",
                    indent, entry.unique_name, entry.original_name, entry.kind, entry.ty
                )?;
            }
        }
        Ok(())
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(formatter)
        .init();
}
