//! SPL front end
//!
//! This module turns SPL source text into a concrete syntax tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → tree), split across [`declarations`],
//!   [`statements`] and [`expressions`]
//! - [`ast`]: Typed tree definitions, one type per grammar symbol
//! - [`syntax`]: Generic `Terminal | Nonterminal` view of the same tree
//! - [`source`]: Line excerpts for diagnostics
//!
//! # Parser Implementation
//!
//! Hand-written LL(1) recursive descent parser. Every rule fails on the first
//! unexpected token; no partial tree is ever returned.

pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod source;
pub mod statements;
pub mod syntax;
