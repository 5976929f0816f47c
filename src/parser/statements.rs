//! Statement parsing implementation
//!
//! This module handles `begin ... end` blocks and every command form:
//!
//! - `skip`, `halt`
//! - `print ATOMIC`, `return ATOMIC`
//! - Assignments: `V_x < input`, `V_x = TERM`
//! - Call statements: `F_f(a, b, c)`
//! - Branches: `if COND then ALGO else ALGO`
//!
//! # Grammar
//!
//! ```text
//! ALGO    ::= "begin" INSTRUC "end"
//! INSTRUC ::= COMMAND ";" INSTRUC | ε
//! COMMAND ::= "skip" | "halt" | "print" ATOMIC | "return" ATOMIC
//!           | ASSIGN | CALL | BRANCH
//! ASSIGN  ::= VNAME ("<" "input" | "=" TERM)
//! BRANCH  ::= "if" COND "then" ALGO ("else" ALGO)?
//! ```
//!
//! The `;` after the last command of a block may be left out.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse `begin INSTRUC end`
    pub(crate) fn parse_algo(&mut self) -> Result<Algo, ParseError> {
        let begin = self.expect(TokenKind::Begin)?;

        let mut instructions = Vec::new();
        let mut terminated = true;
        while starts_command(self.current.kind) {
            instructions.push(Instruction::new(self.parse_command()?));

            if self.check(TokenKind::Semicolon) {
                self.advance();
                terminated = true;
            } else {
                terminated = false;
                break;
            }
        }

        if !self.check(TokenKind::End) {
            let expected = if terminated {
                "a command or 'end'"
            } else {
                "';' or 'end'"
            };
            return Err(self.error(expected));
        }
        let end = self.advance();

        Ok(Algo {
            begin,
            instructions,
            end,
        })
    }

    /// Parse a single command
    pub(crate) fn parse_command(&mut self) -> Result<Command, ParseError> {
        match self.current.kind {
            TokenKind::Skip => Ok(Command::Skip(self.advance())),
            TokenKind::Halt => Ok(Command::Halt(self.advance())),
            TokenKind::Print => {
                let keyword = self.advance();
                let value = self.parse_atomic()?;
                Ok(Command::Print { keyword, value })
            }
            TokenKind::Return => {
                let keyword = self.advance();
                let value = self.parse_atomic()?;
                Ok(Command::Return { keyword, value })
            }
            TokenKind::VName => Ok(Command::Assign(self.parse_assign()?)),
            TokenKind::FName => Ok(Command::Call(self.parse_call()?)),
            TokenKind::If => Ok(Command::Branch(self.parse_branch()?)),
            _ => Err(self.error("a command (skip, halt, print, return, assignment, call or if)")),
        }
    }

    /// Parse `VNAME < input` or `VNAME = TERM`
    fn parse_assign(&mut self) -> Result<Assign, ParseError> {
        let target = self.expect_name(TokenKind::VName)?;

        let value = match self.current.kind {
            TokenKind::Less => {
                self.advance();
                AssignValue::Input(self.expect(TokenKind::Input)?)
            }
            TokenKind::Assign => {
                self.advance();
                AssignValue::Term(self.parse_term()?)
            }
            _ => return Err(self.error("'<' or '='")),
        };

        Ok(Assign { target, value })
    }

    /// Parse `if COND then ALGO [else ALGO]`
    fn parse_branch(&mut self) -> Result<Branch, ParseError> {
        let keyword = self.expect(TokenKind::If)?;
        let cond = self.parse_op()?;
        self.expect(TokenKind::Then)?;
        let then_block = self.parse_algo()?;

        let else_block = if self.check(TokenKind::Else) {
            self.advance();
            Some(self.parse_algo()?)
        } else {
            None
        };

        Ok(Branch {
            keyword,
            cond,
            then_block,
            else_block,
        })
    }
}

/// FIRST set of `COMMAND`
fn starts_command(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Skip
            | TokenKind::Halt
            | TokenKind::Print
            | TokenKind::Return
            | TokenKind::VName
            | TokenKind::FName
            | TokenKind::If
    )
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::{parse, ParseError};

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(Lexer::new(source, "test.spl").tokenize().unwrap())
    }

    fn commands(body: &str) -> Vec<Command> {
        parse_source(&format!("main num V_x, text V_t begin {body} end"))
            .unwrap()
            .algo
            .instructions
            .into_iter()
            .map(|instruction| instruction.command)
            .collect()
    }

    #[test]
    fn test_simple_commands() {
        let cmds = commands("skip ; halt ; print V_x ; print \"Hi\" ;");
        assert!(matches!(cmds[0], Command::Skip(_)));
        assert!(matches!(cmds[1], Command::Halt(_)));
        assert!(matches!(cmds[2], Command::Print { value: Atomic::Var(_), .. }));
        assert!(matches!(cmds[3], Command::Print { value: Atomic::Const(_), .. }));
    }

    #[test]
    fn test_final_semicolon_optional() {
        assert_eq!(commands("skip ; halt").len(), 2);
        assert_eq!(commands("").len(), 0);
    }

    #[test]
    fn test_assignments() {
        let cmds = commands("V_x < input ; V_x = 5 ; V_x = V_x ; V_x = mul(V_x, 2) ; V_x = F_f(1, 2, 3) ;");
        assert!(matches!(
            cmds[0],
            Command::Assign(Assign { value: AssignValue::Input(_), .. })
        ));
        assert!(matches!(
            cmds[1],
            Command::Assign(Assign { value: AssignValue::Term(Term::Const(_)), .. })
        ));
        assert!(matches!(
            cmds[2],
            Command::Assign(Assign { value: AssignValue::Term(Term::Var(_)), .. })
        ));
        assert!(matches!(
            cmds[3],
            Command::Assign(Assign { value: AssignValue::Term(Term::Op(_)), .. })
        ));
        assert!(matches!(
            cmds[4],
            Command::Assign(Assign { value: AssignValue::Term(Term::Call(_)), .. })
        ));
    }

    #[test]
    fn test_branch_with_and_without_else() {
        let cmds = commands(
            "if gt(V_x, 0) then begin print V_x ; end else begin halt ; end ; \
             if not(eq(V_x, 1)) then begin skip ; end ;",
        );
        match &cmds[0] {
            Command::Branch(branch) => {
                assert_eq!(branch.cond.operator, Operator::Gt);
                assert_eq!(branch.then_block.instructions.len(), 1);
                assert!(branch.else_block.is_some());
            }
            other => panic!("expected branch, got {other:?}"),
        }
        match &cmds[1] {
            Command::Branch(branch) => {
                assert_eq!(branch.cond.operator, Operator::Not);
                assert!(branch.else_block.is_none());
            }
            other => panic!("expected branch, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_semicolon_between_commands() {
        let err = parse_source("main begin skip halt end").unwrap_err();
        assert_eq!(err.expected, "';' or 'end'");
        assert_eq!(err.found, "'halt'");
        assert_eq!((err.location.line, err.location.column), (1, 17));
    }

    #[test]
    fn test_assign_requires_input_keyword() {
        let err = parse_source("main num V_x begin V_x < 5 ; end").unwrap_err();
        assert_eq!(err.expected, "'input'");
        assert_eq!(err.location.column, 26);
    }
}
