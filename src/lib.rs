//! # Introduction
//!
//! splc compiles SPL, a small imperative teaching language, into a
//! line-numbered BASIC dialect. SPL has numeric and text variables, functions
//! with exactly three numeric parameters and three locals, prefix operators
//! and `if/then/else`.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser → CST → Scope Resolver → Type Checker → BASIC
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds a concrete syntax tree.
//! 2. [`semantic::resolver`]: builds the scope tree and renames every
//!    variable and function to a program-wide unique name.
//! 3. [`semantic::typeck`]: annotates every expression with its type and
//!    checks statements against the typing rules.
//! 4. [`codegen`]: lowers the tree into line-numbered BASIC, turning
//!    branches into `IF ... THEN GOTO ... ELSE GOTO` blocks.
//! 5. [`pipeline`]: runs the passes in order and stops at the first
//!    failing stage.
//!
//! Parse errors abort at the first bad token. Scope and type errors are
//! collected as [`diagnostics::Diagnostic`]s so every problem is reported in
//! one run.
//!
//! ```
//! let compilation = splc::compile("main num V_x begin V_x < input ; print V_x end", "demo.spl")
//!     .expect("valid program");
//! assert_eq!(compilation.basic, "10 LET v1 = 0\n20 INPUT v1\n30 PRINT v1\n40 END\n");
//! ```

pub mod codegen;
pub mod diagnostics;
pub mod parser;
pub mod pipeline;
pub mod semantic;

pub use pipeline::{compile, compile_tokens, CompileError, Compilation};
