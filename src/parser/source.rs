//! Source excerpts for diagnostics
//!
//! The core only ever sees tokens, never the original file. [`SourceText`]
//! rebuilds each source line by placing every lexeme at its recorded column,
//! which reproduces the line closely enough for a caret under the offending
//! column to line up.

use crate::parser::lexer::Token;
use rustc_hash::FxHashMap;

/// Per-line text reconstructed from a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    lines: FxHashMap<usize, String>,
}

impl SourceText {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut lines: FxHashMap<usize, String> = FxHashMap::default();

        for token in tokens {
            let text = lines.entry(token.line).or_default();
            let start = token.column.saturating_sub(1);
            let width = text.chars().count();
            if width < start {
                text.extend(std::iter::repeat(' ').take(start - width));
            } else if width > start {
                // Overlapping positions from a foreign lexer; keep tokens apart.
                text.push(' ');
            }
            text.push_str(&token.lexeme);
        }

        Self { lines }
    }

    /// The text of a 1-based line, or an empty string if no token was on it.
    pub fn line(&self, line: usize) -> &str {
        self.lines.get(&line).map(String::as_str).unwrap_or("")
    }
}

/// The offending line followed by a caret under the 1-based `column`.
pub fn render_excerpt(line: &str, column: usize) -> String {
    format!("{}\n{}^", line, " ".repeat(column.saturating_sub(1)))
}
