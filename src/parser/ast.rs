// Concrete syntax tree definitions for SPL
//
// One struct or enum per grammar symbol. Grammar alternatives are enum
// variants so later passes can match exhaustively. Pure punctuation is not
// stored; keywords, names, literals and operators keep their tokens.

use crate::parser::lexer::{Token, TokenKind};
use crate::parser::source::SourceText;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Resolved type tag, written by the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Type {
    #[default]
    Unknown,
    Num,
    Text,
    Void,
    Bool,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Unknown => "unknown",
            Type::Num => "num",
            Type::Text => "text",
            Type::Void => "void",
            Type::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Declared type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Num,
    Text,
}

impl VarType {
    pub fn ty(self) -> Type {
        match self {
            VarType::Num => Type::Num,
            VarType::Text => Type::Text,
        }
    }
}

/// Declared return type of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Num,
    Text,
    Void,
}

impl ReturnType {
    pub fn ty(self) -> Type {
        match self {
            ReturnType::Num => Type::Num,
            ReturnType::Text => Type::Text,
            ReturnType::Void => Type::Void,
        }
    }
}

/// A `VNAME` or `FNAME` occurrence.
///
/// `text` starts out as the source lexeme; the scope resolver rewrites it to
/// the program-wide unique name (`v3`, `f1`, ...). The token always keeps the
/// original spelling for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub token: Token,
    pub text: String,
    pub ty: Type,
}

impl Name {
    pub fn new(token: Token) -> Self {
        let text = token.lexeme.clone();
        Self {
            token,
            text,
            ty: Type::Unknown,
        }
    }

    /// Spelling in the source, e.g. `V_sum`.
    pub fn original(&self) -> &str {
        &self.token.lexeme
    }

    /// Source spelling without its `V_`/`F_` prefix.
    pub fn bare(&self) -> &str {
        let original = self.original();
        original
            .strip_prefix("V_")
            .or_else(|| original.strip_prefix("F_"))
            .unwrap_or(original)
    }

    pub fn location(&self) -> SourceLocation {
        self.token.location()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Num,
    Text,
}

/// `NUMLIT` or `TEXTLIT`. Text lexemes keep their quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub token: Token,
    pub kind: LiteralKind,
    pub ty: Type,
}

impl Literal {
    pub fn new(token: Token) -> Self {
        let kind = if token.is(TokenKind::TextLit) {
            LiteralKind::Text
        } else {
            LiteralKind::Num
        };
        Self {
            token,
            kind,
            ty: Type::Unknown,
        }
    }

    pub fn lexeme(&self) -> &str {
        &self.token.lexeme
    }
}

/// `ATOMIC := VNAME | CONST`
#[derive(Debug, Clone, PartialEq)]
pub enum Atomic {
    Var(Name),
    Const(Literal),
}

impl Atomic {
    pub fn location(&self) -> SourceLocation {
        match self {
            Atomic::Var(name) => name.location(),
            Atomic::Const(lit) => lit.token.location(),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Atomic::Var(name) => name.ty,
            Atomic::Const(lit) => lit.ty,
        }
    }
}

/// Unary and binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Not,
    Sqrt,
    Or,
    And,
    Eq,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Operator> {
        let op = match kind {
            TokenKind::Not => Operator::Not,
            TokenKind::Sqrt => Operator::Sqrt,
            TokenKind::Or => Operator::Or,
            TokenKind::And => Operator::And,
            TokenKind::Eq => Operator::Eq,
            TokenKind::Gt => Operator::Gt,
            TokenKind::Add => Operator::Add,
            TokenKind::Sub => Operator::Sub,
            TokenKind::Mul => Operator::Mul,
            TokenKind::Div => Operator::Div,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::Sqrt)
    }

    /// SPL spelling of the operator
    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Not => "not",
            Operator::Sqrt => "sqrt",
            Operator::Or => "or",
            Operator::And => "and",
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
        }
    }
}

/// `ARG := ATOMIC | OP`
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Atomic(Atomic),
    Op(Op),
}

impl Arg {
    pub fn ty(&self) -> Type {
        match self {
            Arg::Atomic(atomic) => atomic.ty(),
            Arg::Op(op) => op.ty,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Arg::Atomic(atomic) => atomic.location(),
            Arg::Op(op) => op.location(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpArgs {
    Unary(Box<Arg>),
    Binary(Box<Arg>, Box<Arg>),
}

/// `OP` and `COND`: `UNOP '(' ARG ')' | BINOP '(' ARG ',' ARG ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub operator: Operator,
    pub token: Token,
    pub args: OpArgs,
    pub ty: Type,
}

impl Op {
    pub fn location(&self) -> SourceLocation {
        self.token.location()
    }
}

/// `CALL := FNAME '(' ATOMIC ',' ATOMIC ',' ATOMIC ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: Name,
    pub args: [Atomic; 3],
    pub ty: Type,
}

/// `TERM := CONST | VNAME | CALL | OP`
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Const(Literal),
    Var(Name),
    Call(Call),
    Op(Op),
}

impl Term {
    pub fn ty(&self) -> Type {
        match self {
            Term::Const(lit) => lit.ty,
            Term::Var(name) => name.ty,
            Term::Call(call) => call.ty,
            Term::Op(op) => op.ty,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Term::Const(lit) => lit.token.location(),
            Term::Var(name) => name.location(),
            Term::Call(call) => call.name.location(),
            Term::Op(op) => op.location(),
        }
    }
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    /// `V < input`
    Input(Token),
    /// `V = TERM`
    Term(Term),
}

/// `ASSIGN := VNAME ('<' 'input' | '=' TERM)`
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: Name,
    pub value: AssignValue,
}

/// `BRANCH := 'if' COND 'then' ALGO ('else' ALGO)?`
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub keyword: Token,
    pub cond: Op,
    pub then_block: Algo,
    pub else_block: Option<Algo>,
}

/// `COMMAND`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Skip(Token),
    Halt(Token),
    Print { keyword: Token, value: Atomic },
    Return { keyword: Token, value: Atomic },
    Assign(Assign),
    Call(Call),
    Branch(Branch),
}

impl Command {
    pub fn location(&self) -> SourceLocation {
        match self {
            Command::Skip(token) | Command::Halt(token) => token.location(),
            Command::Print { keyword, .. } | Command::Return { keyword, .. } => keyword.location(),
            Command::Assign(assign) => assign.target.location(),
            Command::Call(call) => call.name.location(),
            Command::Branch(branch) => branch.keyword.location(),
        }
    }
}

/// One `COMMAND` of an `INSTRUC` sequence.
///
/// `ty` is `Void` once the type checker accepted the statement and stays
/// `Unknown` when it reported an error inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub command: Command,
    pub ty: Type,
}

impl Instruction {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            ty: Type::Unknown,
        }
    }
}

/// `ALGO := 'begin' INSTRUC 'end'`; `INSTRUC` is flattened into a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Algo {
    pub begin: Token,
    pub instructions: Vec<Instruction>,
    pub end: Token,
}

/// One `(NUM|TEXT) VNAME` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_token: Token,
    pub var_type: VarType,
    pub name: Name,
}

/// `HEADER := (NUM|TEXT|VOID) FNAME '(' VNAME ',' VNAME ',' VNAME ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub return_token: Token,
    pub return_type: ReturnType,
    pub name: Name,
    pub params: [Name; 3],
}

/// `BODY := '{' LOCALVARS ALGO '}' FUNCTIONS? 'end'`
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub locals: [VarDecl; 3],
    pub algo: Algo,
    pub functions: Vec<FunctionDecl>,
    pub end: Token,
}

/// `DECL := HEADER BODY`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub header: Header,
    pub body: Body,
}

/// `PROG := 'main' GLOBVARS ALGO FUNCTIONS`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub main: Token,
    pub globals: Vec<VarDecl>,
    pub algo: Algo,
    pub functions: Vec<FunctionDecl>,
    /// Lines rebuilt from the parsed tokens, quoted by diagnostics.
    pub source: SourceText,
}

impl Program {
    /// File name recorded on the tokens
    pub fn file(&self) -> &str {
        &self.main.file
    }
}
