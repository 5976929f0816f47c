//! Lexer (tokenizer) for SPL source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Whitespace is dropped here, so the stream handed to the parser only holds
//! significant tokens. The parser still tolerates [`TokenKind::Trivia`] from
//! foreign token producers.

use super::ast::SourceLocation;
use super::source::render_excerpt;
use std::fmt;

/// Every kind of token the SPL grammar distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Assign, // =
    Less,   // <

    // Keywords
    Main,
    Begin,
    End,
    Num,
    Text,
    Void,
    If,
    Then,
    Else,
    Skip,
    Halt,
    Print,
    Input,
    Return,

    // Unary operators
    Not,
    Sqrt,

    // Binary operators
    Or,
    And,
    Eq,
    Gt,
    Add,
    Sub,
    Mul,
    Div,

    // Names and literals
    VName,
    FName,
    NumLit,
    TextLit,

    /// Insignificant token; skipped by the parser.
    Trivia,
    /// End-of-stream sentinel, synthesized by the parser.
    Eof,
}

impl TokenKind {
    /// Keyword lookup for a bare word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "main" => TokenKind::Main,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "num" => TokenKind::Num,
            "text" => TokenKind::Text,
            "void" => TokenKind::Void,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "skip" => TokenKind::Skip,
            "halt" => TokenKind::Halt,
            "print" => TokenKind::Print,
            "input" => TokenKind::Input,
            "return" => TokenKind::Return,
            "not" => TokenKind::Not,
            "sqrt" => TokenKind::Sqrt,
            "or" => TokenKind::Or,
            "and" => TokenKind::And,
            "eq" => TokenKind::Eq,
            "gt" | "grt" => TokenKind::Gt,
            "add" => TokenKind::Add,
            "sub" => TokenKind::Sub,
            "mul" => TokenKind::Mul,
            "div" => TokenKind::Div,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_unary_op(self) -> bool {
        matches!(self, TokenKind::Not | TokenKind::Sqrt)
    }

    pub fn is_binary_op(self) -> bool {
        matches!(
            self,
            TokenKind::Or
                | TokenKind::And
                | TokenKind::Eq
                | TokenKind::Gt
                | TokenKind::Add
                | TokenKind::Sub
                | TokenKind::Mul
                | TokenKind::Div
        )
    }

    pub fn is_var_type(self) -> bool {
        matches!(self, TokenKind::Num | TokenKind::Text)
    }

    pub fn is_return_type(self) -> bool {
        matches!(self, TokenKind::Num | TokenKind::Text | TokenKind::Void)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Assign => "'='",
            TokenKind::Less => "'<'",
            TokenKind::Main => "'main'",
            TokenKind::Begin => "'begin'",
            TokenKind::End => "'end'",
            TokenKind::Num => "'num'",
            TokenKind::Text => "'text'",
            TokenKind::Void => "'void'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Skip => "'skip'",
            TokenKind::Halt => "'halt'",
            TokenKind::Print => "'print'",
            TokenKind::Input => "'input'",
            TokenKind::Return => "'return'",
            TokenKind::Not => "'not'",
            TokenKind::Sqrt => "'sqrt'",
            TokenKind::Or => "'or'",
            TokenKind::And => "'and'",
            TokenKind::Eq => "'eq'",
            TokenKind::Gt => "'gt'",
            TokenKind::Add => "'add'",
            TokenKind::Sub => "'sub'",
            TokenKind::Mul => "'mul'",
            TokenKind::Div => "'div'",
            TokenKind::VName => "variable name (e.g. V_sum)",
            TokenKind::FName => "function name (e.g. F_sum)",
            TokenKind::NumLit => "number literal",
            TokenKind::TextLit => "text literal",
            TokenKind::Trivia => "whitespace",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A lexeme together with its kind and position.
///
/// Tokens are immutable once produced; the tree stores clones of the tokens it
/// consumed so later passes can point back at the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub lexeme: String,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        file: impl Into<String>,
        line: usize,
        column: usize,
        lexeme: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            file: file.into(),
            line,
            column,
            lexeme: lexeme.into(),
        }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub file: String,
    pub location: SourceLocation,
    pub source_line: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error: {}\n{}",
            self.file,
            self.location.line,
            self.location.column,
            self.message,
            render_excerpt(&self.source_line, self.location.column)
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for SPL source code
pub struct Lexer {
    input: Vec<char>,
    file: String,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string. `file` only labels
    /// tokens and diagnostics.
    pub fn new(input: &str, file: impl Into<String>) -> Self {
        Self {
            input: input.chars().collect(),
            file: file.into(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. No end-of-file token is appended.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Err(self.error("unexpected end of input", loc)),
        };

        match ch {
            '"' => self.text_literal(loc),
            '0'..='9' | '-' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => self.word(ch, loc),
            '(' => Ok(self.token(TokenKind::LParen, loc, "(")),
            ')' => Ok(self.token(TokenKind::RParen, loc, ")")),
            '{' => Ok(self.token(TokenKind::LBrace, loc, "{")),
            '}' => Ok(self.token(TokenKind::RBrace, loc, "}")),
            ',' => Ok(self.token(TokenKind::Comma, loc, ",")),
            ';' => Ok(self.token(TokenKind::Semicolon, loc, ";")),
            '=' => Ok(self.token(TokenKind::Assign, loc, "=")),
            '<' => Ok(self.token(TokenKind::Less, loc, "<")),
            _ => Err(self.error(format!("disallowed character '{}'", ch), loc)),
        }
    }

    /// Text literal: a double-quoted run on a single line. The lexeme keeps
    /// its quotes so it can be emitted verbatim.
    fn text_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::from('"');

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            lexeme.push(ch);
            if ch == '"' {
                return Ok(self.token(TokenKind::TextLit, loc, lexeme));
            }
        }

        Err(self.error("unterminated text literal", loc))
    }

    /// Number literal: `0`, `-?[1-9][0-9]*`, or a decimal whose fraction
    /// does not end in `0`.
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        lexeme.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_valid_number(&lexeme) {
            Ok(self.token(TokenKind::NumLit, loc, lexeme))
        } else {
            Err(self.error(format!("invalid number literal '{}'", lexeme), loc))
        }
    }

    /// Keyword, `V_` variable name or `F_` function name.
    fn word(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut word = String::new();
        word.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(kind) = TokenKind::keyword(&word) {
            return Ok(self.token(kind, loc, word));
        }

        if is_user_name(&word, "V_") {
            return Ok(self.token(TokenKind::VName, loc, word));
        }
        if is_user_name(&word, "F_") {
            return Ok(self.token(TokenKind::FName, loc, word));
        }

        Err(self.error(format!("unrecognized word '{}'", word), loc))
    }

    fn token(&self, kind: TokenKind, loc: SourceLocation, lexeme: impl Into<String>) -> Token {
        Token::new(kind, self.file.clone(), loc.line, loc.column, lexeme)
    }

    fn error(&self, message: impl Into<String>, location: SourceLocation) -> LexError {
        LexError {
            message: message.into(),
            file: self.file.clone(),
            location,
            source_line: self.line_text(location.line),
        }
    }

    fn line_text(&self, line: usize) -> String {
        self.input
            .iter()
            .collect::<String>()
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .to_string()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// `prefix` followed by a lowercase letter and lowercase letters or digits.
fn is_user_name(word: &str, prefix: &str) -> bool {
    let Some(rest) = word.strip_prefix(prefix) else {
        return false;
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

fn is_valid_number(lexeme: &str) -> bool {
    let unsigned = lexeme.strip_prefix('-').unwrap_or(lexeme);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let int_ok = int_part == "0"
        || (!int_part.is_empty()
            && !int_part.starts_with('0')
            && int_part.chars().all(|c| c.is_ascii_digit()));
    if !int_ok {
        return false;
    }

    match frac_part {
        None => !(lexeme.starts_with('-') && int_part == "0"),
        Some(frac) => {
            !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()) && !frac.ends_with('0')
        }
    }
}
