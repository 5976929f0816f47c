//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, token helpers, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent parser with a single token of lookahead
//! (`current`). Grammar rules are split across files using `impl Parser`
//! blocks:
//! - `declarations`: `PROG`, `GLOBVARS`, `FUNCTIONS`, `DECL`, `HEADER`,
//!   `BODY`, `LOCALVARS`
//! - `statements`: `ALGO`, `INSTRUC`, `COMMAND`, `ASSIGN`, `BRANCH`
//! - `expressions`: `TERM`, `CALL`, `OP`/`COND`, `ARG`, `ATOMIC`, `CONST`
//!
//! There is no error recovery. The first token that does not fit the
//! grammar aborts the parse, and no partial tree is returned.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::source::{render_excerpt, SourceText};
use std::fmt;
use tracing::debug;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable description of what the grammar allowed here
    pub expected: String,
    /// The offending token as written, or "end of input"
    pub found: String,
    pub file: String,
    pub location: SourceLocation,
    pub source_line: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error: expected {}, found {}\n{}",
            self.file,
            self.location.line,
            self.location.column,
            self.expected,
            self.found,
            render_excerpt(&self.source_line, self.location.column)
        )
    }
}

impl std::error::Error for ParseError {}

/// Recursive descent parser for SPL
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) current: Token,
    pub(crate) source: SourceText,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let source = SourceText::from_tokens(&tokens);
        let current = end_sentinel(&tokens);
        let mut parser = Self {
            tokens,
            position: 0,
            current,
            source,
        };
        parser.seek(0);
        parser
    }

    /// Parse the whole token stream into a tree rooted at `PROG`.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let program = self.parse_program()?;
        self.expect(TokenKind::Eof)?;
        debug!(
            globals = program.globals.len(),
            functions = program.functions.len(),
            "parsed program"
        );
        Ok(program)
    }

    // ===== Helper methods =====

    /// Move `current` to the first significant token at or after `index`,
    /// or to the end sentinel when the stream is exhausted.
    fn seek(&mut self, index: usize) {
        let mut index = index;
        while let Some(token) = self.tokens.get(index) {
            if token.kind != TokenKind::Trivia {
                self.position = index;
                self.current = token.clone();
                return;
            }
            index += 1;
        }
        self.position = self.tokens.len();
        self.current = end_sentinel(&self.tokens);
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self) -> Token {
        let consumed = self.current.clone();
        if !consumed.is(TokenKind::Eof) {
            self.seek(self.position + 1);
        }
        consumed
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(kind.to_string()))
        }
    }

    pub(crate) fn expect_name(&mut self, kind: TokenKind) -> Result<Name, ParseError> {
        self.expect(kind).map(Name::new)
    }

    /// Error describing the current token as unexpected.
    pub(crate) fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError {
            expected: expected.into(),
            found: self.current.to_string(),
            file: self.current.file.clone(),
            location: self.current.location(),
            source_line: self.source.line(self.current.line).to_string(),
        }
    }
}

/// Convenience wrapper: `Parser::new(tokens).parse()`.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

/// End-of-stream token placed just past the last real token.
fn end_sentinel(tokens: &[Token]) -> Token {
    match tokens.last() {
        Some(last) => Token::new(
            TokenKind::Eof,
            last.file.clone(),
            last.line,
            last.column + last.lexeme.chars().count(),
            "",
        ),
        None => Token::new(TokenKind::Eof, "<input>", 1, 1, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        let tokens = Lexer::new(source, "test.spl").tokenize().unwrap();
        parse(tokens)
    }

    #[test]
    fn test_parse_minimal_program() {
        let program = parse_source("main begin halt ; end").unwrap();
        assert!(program.globals.is_empty());
        assert_eq!(program.algo.instructions.len(), 1);
        assert!(matches!(program.algo.instructions[0].command, Command::Halt(_)));
        assert!(program.functions.is_empty());
    }

    #[test]
    fn test_trivia_tokens_are_skipped() {
        let t = |kind, col, lexeme| Token::new(kind, "t.spl", 1, col, lexeme);
        let tokens = vec![
            t(TokenKind::Main, 1, "main"),
            t(TokenKind::Trivia, 5, " "),
            t(TokenKind::Begin, 6, "begin"),
            t(TokenKind::Trivia, 11, " "),
            t(TokenKind::Skip, 12, "skip"),
            t(TokenKind::End, 17, "end"),
            t(TokenKind::Trivia, 20, " "),
        ];
        let program = parse(tokens).unwrap();
        assert!(matches!(program.algo.instructions[0].command, Command::Skip(_)));
    }

    #[test]
    fn test_end_sentinel_after_last_token() {
        let err = parse_source("main begin halt ;").unwrap_err();
        assert_eq!(err.found, "end of input");
        assert_eq!(err.expected, "a command or 'end'");
        assert_eq!(err.location, SourceLocation::new(1, 18));
    }

    #[test]
    fn test_empty_token_stream() {
        let err = parse(Vec::new()).unwrap_err();
        assert_eq!(err.expected, "'main'");
        assert_eq!(err.file, "<input>");
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_source("main begin halt end end").unwrap_err();
        assert_eq!(err.expected, "end of input");
        assert_eq!(err.location, SourceLocation::new(1, 21));
    }

    #[test]
    fn test_error_display_has_caret() {
        let err = parse_source("main begin print ; end").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("test.spl:1:18: error: expected a variable or constant, found ';'"));
        assert!(rendered.ends_with("main begin print ; end\n                 ^"));
    }
}
