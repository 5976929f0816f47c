//! Semantic diagnostics
//!
//! Scope and type errors do not abort compilation. Each pass collects them as
//! [`Diagnostic`]s and keeps going, so one run reports every problem it can
//! find. A diagnostic owns its file name, position and source line and can be
//! rendered without the tree that produced it.

use crate::parser::ast::{SourceLocation, Type};
use crate::parser::source::{render_excerpt, SourceText};
use std::fmt;

/// Name resolution failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("variable '{name}' is already declared in this scope")]
    VariableRedeclared { name: String },

    #[error("variable name '{name}' is a reserved keyword")]
    ReservedVariableName { name: String },

    #[error("variable name '{name}' conflicts with function '{function}'")]
    VariableClashesWithFunction { name: String, function: String },

    #[error("function '{name}' is already declared in this scope")]
    FunctionRedeclared { name: String },

    #[error("function name '{name}' is a reserved keyword")]
    ReservedFunctionName { name: String },

    #[error("function name '{name}' conflicts with variable '{variable}'")]
    FunctionClashesWithVariable { name: String, variable: String },

    #[error("function name '{name}' is the same as its enclosing function")]
    FunctionNamedAfterParent { name: String },

    #[error("variable '{name}' is not declared")]
    UndeclaredVariable { name: String },

    #[error("function '{name}' is not declared")]
    UndeclaredFunction { name: String },

    #[error("recursive call to main is not allowed")]
    RecursiveMain,
}

/// Type checking failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("type mismatch in assignment to variable '{name}': expected {expected}, found {found}")]
    AssignmentMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("cannot read input into '{name}': expected num, found {found}")]
    InputNotNum { name: String, found: Type },

    #[error("condition must be bool, found {found}")]
    ConditionNotBool { found: Type },

    #[error("operator '{operator}' expects {expected} operands, found {found}")]
    OperandMismatch {
        operator: &'static str,
        expected: Type,
        found: Type,
    },

    #[error("argument {position} of call to '{name}' must be num, found {found}")]
    CallArgumentNotNum {
        name: String,
        position: usize,
        found: Type,
    },

    #[error("return type mismatch in '{function}': expected {expected}, found {found}")]
    ReturnMismatch {
        function: String,
        expected: Type,
        found: Type,
    },

    #[error("return outside of a function")]
    ReturnOutsideFunction,

    #[error("'{name}' has no declaration")]
    UnknownSymbol { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    Scope(ScopeError),
    Type(TypeError),
}

impl From<ScopeError> for DiagnosticKind {
    fn from(error: ScopeError) -> Self {
        DiagnosticKind::Scope(error)
    }
}

impl From<TypeError> for DiagnosticKind {
    fn from(error: TypeError) -> Self {
        DiagnosticKind::Type(error)
    }
}

/// A located, self-contained semantic error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub location: SourceLocation,
    pub source_line: String,
}

impl Diagnostic {
    pub fn new(
        kind: impl Into<DiagnosticKind>,
        file: &str,
        source: &SourceText,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind: kind.into(),
            file: file.to_string(),
            location,
            source_line: source.line(location.line).to_string(),
        }
    }

    /// The message without position or excerpt
    pub fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::Scope(error) => error.to_string(),
            DiagnosticKind::Type(error) => error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind {
            DiagnosticKind::Scope(_) => "scope",
            DiagnosticKind::Type(_) => "type",
        };
        write!(
            f,
            "{}:{}:{}: {} error: {}\n{}",
            self.file,
            self.location.line,
            self.location.column,
            stage,
            self.message(),
            render_excerpt(&self.source_line, self.location.column)
        )
    }
}
