//! Compilation driver
//!
//! Runs the passes in order on fresh per-call state:
//!
//! ```text
//! tokens → parse → resolve → typecheck → generate
//! ```
//!
//! A parse error stops immediately. Scope errors stop before type checking,
//! and type errors stop before code generation; both come back as the full
//! list of diagnostics found by the failing pass.

use crate::codegen::generate;
use crate::diagnostics::Diagnostic;
use crate::parser::ast::Program;
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::parser::parse::{parse, ParseError};
use crate::semantic::{resolve, typecheck, ScopeTree};
use tracing::{debug, info_span};

#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("scope analysis failed with {} error(s)", .0.len())]
    Scope(Vec<Diagnostic>),
    #[error("type checking failed with {} error(s)", .0.len())]
    Type(Vec<Diagnostic>),
}

impl CompileError {
    /// Semantic diagnostics carried by the error; empty for lex and parse errors.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Scope(diagnostics) | CompileError::Type(diagnostics) => diagnostics,
            CompileError::Lex(_) | CompileError::Parse(_) => &[],
        }
    }
}

/// Products of a successful compilation
#[derive(Debug)]
pub struct Compilation {
    /// Resolved and type-annotated tree
    pub program: Program,
    pub scopes: ScopeTree,
    /// Generated BASIC text
    pub basic: String,
}

/// Compile SPL source text. `file` is only used in diagnostics.
pub fn compile(source: &str, file: &str) -> Result<Compilation, CompileError> {
    let tokens = Lexer::new(source, file).tokenize()?;
    compile_tokens(tokens)
}

/// Compile an already tokenized program.
pub fn compile_tokens(tokens: Vec<Token>) -> Result<Compilation, CompileError> {
    let _span = info_span!("compile", tokens = tokens.len()).entered();

    let mut program = parse(tokens)?;

    let (scopes, diagnostics) = resolve(&mut program);
    if !diagnostics.is_empty() {
        return Err(CompileError::Scope(diagnostics));
    }

    let (ok, diagnostics) = typecheck(&mut program, &scopes);
    if !ok {
        return Err(CompileError::Type(diagnostics));
    }

    let basic = generate(&program);
    debug!(bytes = basic.len(), "compilation succeeded");

    Ok(Compilation {
        program,
        scopes,
        basic,
    })
}
