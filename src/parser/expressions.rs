//! Expression parsing implementation
//!
//! This module handles everything that produces a value:
//!
//! - Terms on the right-hand side of an assignment
//! - Function calls with exactly three atomic arguments
//! - Prefix operators, which double as branch conditions
//! - Atomic values: variable names and literals
//!
//! # Grammar
//!
//! ```text
//! TERM   ::= CONST | VNAME | CALL | OP
//! CALL   ::= FNAME "(" ATOMIC "," ATOMIC "," ATOMIC ")"
//! OP     ::= UNOP "(" ARG ")" | BINOP "(" ARG "," ARG ")"
//! ARG    ::= ATOMIC | OP
//! ATOMIC ::= VNAME | CONST
//! CONST  ::= NUMLIT | TEXTLIT
//! ```
//!
//! Operators are always written in prefix form, so no precedence handling is
//! needed. `COND` has the same shape as `OP` and is parsed by [`Parser::parse_op`].
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse the right-hand side of `V = TERM`
    pub(crate) fn parse_term(&mut self) -> Result<Term, ParseError> {
        match self.current.kind {
            TokenKind::NumLit | TokenKind::TextLit => Ok(Term::Const(Literal::new(self.advance()))),
            TokenKind::VName => Ok(Term::Var(Name::new(self.advance()))),
            TokenKind::FName => Ok(Term::Call(self.parse_call()?)),
            kind if kind.is_unary_op() || kind.is_binary_op() => Ok(Term::Op(self.parse_op()?)),
            _ => Err(self.error("a constant, variable, call or operation")),
        }
    }

    /// Parse `FNAME ( ATOMIC , ATOMIC , ATOMIC )`
    pub(crate) fn parse_call(&mut self) -> Result<Call, ParseError> {
        let name = self.expect_name(TokenKind::FName)?;

        self.expect(TokenKind::LParen)?;
        let first = self.parse_atomic()?;
        self.expect(TokenKind::Comma)?;
        let second = self.parse_atomic()?;
        self.expect(TokenKind::Comma)?;
        let third = self.parse_atomic()?;
        self.expect(TokenKind::RParen)?;

        Ok(Call {
            name,
            args: [first, second, third],
            ty: Type::Unknown,
        })
    }

    /// Parse a prefix operation. Unary operators take one argument, binary
    /// operators take two separated by a comma.
    pub(crate) fn parse_op(&mut self) -> Result<Op, ParseError> {
        let operator = match Operator::from_token_kind(self.current.kind) {
            Some(op) => op,
            None => {
                return Err(self.error(
                    "an operator (not, sqrt, or, and, eq, gt, add, sub, mul, div)",
                ))
            }
        };
        let token = self.advance();

        self.expect(TokenKind::LParen)?;
        let args = if operator.is_unary() {
            OpArgs::Unary(Box::new(self.parse_arg()?))
        } else {
            let lhs = self.parse_arg()?;
            self.expect(TokenKind::Comma)?;
            let rhs = self.parse_arg()?;
            OpArgs::Binary(Box::new(lhs), Box::new(rhs))
        };
        self.expect(TokenKind::RParen)?;

        Ok(Op {
            operator,
            token,
            args,
            ty: Type::Unknown,
        })
    }

    /// Parse an operator argument: an atomic value or a nested operation
    pub(crate) fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        if Operator::from_token_kind(self.current.kind).is_some() {
            Ok(Arg::Op(self.parse_op()?))
        } else {
            Ok(Arg::Atomic(self.parse_atomic()?))
        }
    }

    pub(crate) fn parse_atomic(&mut self) -> Result<Atomic, ParseError> {
        match self.current.kind {
            TokenKind::VName => Ok(Atomic::Var(Name::new(self.advance()))),
            TokenKind::NumLit | TokenKind::TextLit => {
                Ok(Atomic::Const(Literal::new(self.advance())))
            }
            _ => Err(self.error("a variable or constant")),
        }
    }
}
