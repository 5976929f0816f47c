//! Semantic analysis
//!
//! - [`scope`]: Arena of nested scopes and the symbol table
//! - [`resolver`]: Name resolution and unique renaming
//! - [`typeck`]: Type inference and checking over the resolved tree
//!
//! Both passes mutate the tree in place and report problems as
//! [`Diagnostic`](crate::diagnostics::Diagnostic) lists instead of failing
//! on the first error.

pub mod resolver;
pub mod scope;
pub mod typeck;

pub use resolver::resolve;
pub use scope::{Scope, ScopeId, ScopeTree, SymbolEntry, SymbolId, SymbolKind};
pub use typeck::typecheck;
