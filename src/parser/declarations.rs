//! Declaration parsing implementation
//!
//! This module handles the program skeleton and everything that declares a
//! name:
//!
//! - The program root: `main GLOBVARS ALGO FUNCTIONS`
//! - Global variables: `num V_a, text V_b`
//! - Function declarations with their header, body and nested functions
//! - Exactly three local variables per function
//!
//! # Grammar
//!
//! ```text
//! PROG      ::= "main" GLOBVARS ALGO FUNCTIONS
//! GLOBVARS  ::= (NUM|TEXT) VNAME ("," GLOBVARS)? | ε
//! FUNCTIONS ::= DECL FUNCTIONS | ε
//! DECL      ::= HEADER BODY
//! HEADER    ::= (NUM|TEXT|VOID) FNAME "(" VNAME "," VNAME "," VNAME ")"
//! BODY      ::= "{" LOCALVARS ALGO "}" FUNCTIONS? "end"
//! LOCALVARS ::= ((NUM|TEXT) VNAME ","){3}
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse the program root
    pub(crate) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let main = self.expect(TokenKind::Main)?;
        let globals = self.parse_globvars()?;
        let algo = self.parse_algo()?;
        let functions = self.parse_functions()?;

        Ok(Program {
            main,
            globals,
            algo,
            functions,
            source: self.source.clone(),
        })
    }

    /// Parse global variable declarations. The recursive `GLOBVARS` rule is
    /// flattened into a list in declaration order.
    pub(crate) fn parse_globvars(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        let mut globals = Vec::new();

        while self.current.kind.is_var_type() {
            globals.push(self.parse_var_decl()?);

            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(globals)
    }

    /// Parse `(NUM|TEXT) VNAME`
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let var_type = match self.current.kind {
            TokenKind::Num => VarType::Num,
            TokenKind::Text => VarType::Text,
            _ => return Err(self.error("'num' or 'text'")),
        };
        let type_token = self.advance();
        let name = self.expect_name(TokenKind::VName)?;

        Ok(VarDecl {
            type_token,
            var_type,
            name,
        })
    }

    /// Parse zero or more function declarations
    pub(crate) fn parse_functions(&mut self) -> Result<Vec<FunctionDecl>, ParseError> {
        let mut functions = Vec::new();

        while self.current.kind.is_return_type() {
            functions.push(self.parse_function_decl()?);
        }

        Ok(functions)
    }

    /// Parse `HEADER BODY`
    pub(crate) fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let header = self.parse_header()?;
        let body = self.parse_body()?;
        Ok(FunctionDecl { header, body })
    }

    pub(crate) fn parse_header(&mut self) -> Result<Header, ParseError> {
        let return_type = match self.current.kind {
            TokenKind::Num => ReturnType::Num,
            TokenKind::Text => ReturnType::Text,
            TokenKind::Void => ReturnType::Void,
            _ => return Err(self.error("'num', 'text' or 'void'")),
        };
        let return_token = self.advance();
        let name = self.expect_name(TokenKind::FName)?;

        self.expect(TokenKind::LParen)?;
        let first = self.expect_name(TokenKind::VName)?;
        self.expect(TokenKind::Comma)?;
        let second = self.expect_name(TokenKind::VName)?;
        self.expect(TokenKind::Comma)?;
        let third = self.expect_name(TokenKind::VName)?;
        self.expect(TokenKind::RParen)?;

        Ok(Header {
            return_token,
            return_type,
            name,
            params: [first, second, third],
        })
    }

    pub(crate) fn parse_body(&mut self) -> Result<Body, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let locals = self.parse_localvars()?;
        let algo = self.parse_algo()?;
        self.expect(TokenKind::RBrace)?;
        let functions = self.parse_functions()?;
        let end = self.expect(TokenKind::End)?;

        Ok(Body {
            locals,
            algo,
            functions,
            end,
        })
    }

    /// Parse exactly three `(NUM|TEXT) VNAME ,` declarations. A fourth one
    /// is rejected by `ALGO` expecting `begin`.
    pub(crate) fn parse_localvars(&mut self) -> Result<[VarDecl; 3], ParseError> {
        let first = self.parse_local_decl()?;
        let second = self.parse_local_decl()?;
        let third = self.parse_local_decl()?;
        Ok([first, second, third])
    }

    fn parse_local_decl(&mut self) -> Result<VarDecl, ParseError> {
        if !self.current.kind.is_var_type() {
            return Err(self.error("'num' or 'text' (a function declares exactly three locals)"));
        }
        let decl = self.parse_var_decl()?;
        self.expect(TokenKind::Comma)?;
        Ok(decl)
    }
}
