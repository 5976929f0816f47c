//! Code generation
//!
//! - [`basic`]: Line-numbered BASIC target
//!
//! Generators only read the tree. They rely on names already being unique and
//! never consult the scope tree.

pub mod basic;

pub use basic::{generate, BasicGenerator, LINE_STEP};
