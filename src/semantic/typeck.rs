//! Type checking
//!
//! A single bottom-up walk over a resolved tree. Every expression node gets
//! its `ty` field filled in; statements are checked against the rules below.
//! A mismatch is recorded and the walk continues, so one run reports every
//! type error in the program.
//!
//! | Construct           | Rule                                         |
//! |---------------------|----------------------------------------------|
//! | `not` / `sqrt`      | bool → bool / num → num                      |
//! | `add sub mul div`   | num, num → num                               |
//! | `or and`            | bool, bool → bool                            |
//! | `eq gt`             | num, num → bool                              |
//! | `V = E`             | type(V) = type(E)                            |
//! | `V < input`         | type(V) = num                                |
//! | `print A`           | type(A) ∈ {num, text}                        |
//! | `if C ...`          | type(C) = bool                               |
//! | `F(a, b, c)`        | all arguments num; result is F's return type |
//! | `return A`          | type(A) = enclosing function's return type   |
//!
//! Names are looked up by the unique name the resolver wrote into the tree.
//! An operand whose type is already unknown is not reported again.

use crate::diagnostics::{Diagnostic, TypeError};
use crate::parser::ast::*;
use crate::parser::source::SourceText;
use crate::semantic::scope::{ScopeTree, SymbolKind};
use tracing::debug;

/// Type check `program` against the symbols in `scopes`. Returns whether the
/// program is well typed, plus every diagnostic found.
pub fn typecheck(program: &mut Program, scopes: &ScopeTree) -> (bool, Vec<Diagnostic>) {
    let checker = TypeChecker::new(scopes, program.file(), &program.source);
    checker.run(program)
}

/// Operator families. A comparison consumes numbers and its result is only
/// ever used as a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpClass {
    Arithmetic,
    Logical,
    Comparison,
}

impl OpClass {
    fn of(operator: Operator) -> OpClass {
        match operator {
            Operator::Sqrt | Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => {
                OpClass::Arithmetic
            }
            Operator::Not | Operator::Or | Operator::And => OpClass::Logical,
            Operator::Eq | Operator::Gt => OpClass::Comparison,
        }
    }

    fn operand(self) -> Type {
        match self {
            OpClass::Arithmetic | OpClass::Comparison => Type::Num,
            OpClass::Logical => Type::Bool,
        }
    }

    fn result(self) -> Type {
        match self {
            OpClass::Arithmetic => Type::Num,
            OpClass::Logical | OpClass::Comparison => Type::Bool,
        }
    }
}

struct EnclosingFunction {
    name: String,
    return_type: Type,
}

pub struct TypeChecker<'a> {
    scopes: &'a ScopeTree,
    file: String,
    source: SourceText,
    diagnostics: Vec<Diagnostic>,
    function: Option<EnclosingFunction>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(scopes: &'a ScopeTree, file: &str, source: &SourceText) -> Self {
        Self {
            scopes,
            file: file.to_string(),
            source: source.clone(),
            diagnostics: Vec::new(),
            function: None,
        }
    }

    pub fn run(mut self, program: &mut Program) -> (bool, Vec<Diagnostic>) {
        for decl in &mut program.globals {
            decl.name.ty = decl.var_type.ty();
        }
        self.check_algo(&mut program.algo);
        self.check_functions(&mut program.functions);

        let ok = self.diagnostics.is_empty();
        debug!(ok, errors = self.diagnostics.len(), "type check finished");
        (ok, self.diagnostics)
    }

    fn check_functions(&mut self, decls: &mut [FunctionDecl]) {
        for decl in decls {
            let header = &mut decl.header;
            header.name.ty = header.return_type.ty();
            for param in &mut header.params {
                param.ty = Type::Num;
            }
            for local in &mut decl.body.locals {
                local.name.ty = local.var_type.ty();
            }

            let outer = self.function.replace(EnclosingFunction {
                name: header.name.original().to_string(),
                return_type: header.return_type.ty(),
            });
            self.check_algo(&mut decl.body.algo);
            self.check_functions(&mut decl.body.functions);
            self.function = outer;
        }
    }

    /// Check every statement; one that produced no diagnostic is `Void`.
    fn check_algo(&mut self, algo: &mut Algo) {
        for instruction in &mut algo.instructions {
            let before = self.diagnostics.len();
            self.check_command(&mut instruction.command);
            instruction.ty = if self.diagnostics.len() == before {
                Type::Void
            } else {
                Type::Unknown
            };
        }
    }

    fn check_command(&mut self, command: &mut Command) {
        match command {
            Command::Skip(_) | Command::Halt(_) => {}
            // Atomics are always num or text.
            Command::Print { value, .. } => {
                self.check_atomic(value);
            }
            Command::Return { keyword, value } => {
                let found = self.check_atomic(value);
                match &self.function {
                    None => self.report(TypeError::ReturnOutsideFunction, keyword.location()),
                    Some(function) => {
                        if found != Type::Unknown && found != function.return_type {
                            let error = TypeError::ReturnMismatch {
                                function: function.name.clone(),
                                expected: function.return_type,
                                found,
                            };
                            self.report(error, value.location());
                        }
                    }
                }
            }
            Command::Assign(assign) => self.check_assign(assign),
            Command::Call(call) => {
                self.check_call(call);
            }
            Command::Branch(branch) => {
                let found = self.check_op(&mut branch.cond);
                if found != Type::Bool {
                    self.report(TypeError::ConditionNotBool { found }, branch.cond.location());
                }
                self.check_algo(&mut branch.then_block);
                if let Some(else_block) = &mut branch.else_block {
                    self.check_algo(else_block);
                }
            }
        }
    }

    fn check_assign(&mut self, assign: &mut Assign) {
        let expected = self.check_variable(&mut assign.target);
        let name = assign.target.original().to_string();
        let location = assign.target.location();

        match &mut assign.value {
            AssignValue::Input(_) => {
                if expected != Type::Unknown && expected != Type::Num {
                    self.report(TypeError::InputNotNum { name, found: expected }, location);
                }
            }
            AssignValue::Term(term) => {
                let found = self.check_term(term);
                if expected != Type::Unknown && found != Type::Unknown && expected != found {
                    let error = TypeError::AssignmentMismatch {
                        name,
                        expected,
                        found,
                    };
                    self.report(error, location);
                }
            }
        }
    }

    fn check_term(&mut self, term: &mut Term) -> Type {
        match term {
            Term::Const(lit) => check_literal(lit),
            Term::Var(name) => self.check_variable(name),
            Term::Call(call) => self.check_call(call),
            Term::Op(op) => self.check_op(op),
        }
    }

    fn check_call(&mut self, call: &mut Call) -> Type {
        let callee = call.name.original().to_string();
        let ty = match self.scopes.symbol_by_unique(&call.name.text) {
            Some(entry) if entry.kind == SymbolKind::Function => entry.ty,
            _ => {
                self.report(TypeError::UnknownSymbol { name: callee.clone() }, call.name.location());
                Type::Unknown
            }
        };

        for (index, arg) in call.args.iter_mut().enumerate() {
            let found = self.check_atomic(arg);
            if found != Type::Unknown && found != Type::Num {
                let error = TypeError::CallArgumentNotNum {
                    name: callee.clone(),
                    position: index + 1,
                    found,
                };
                self.report(error, arg.location());
            }
        }

        call.name.ty = ty;
        call.ty = ty;
        ty
    }

    fn check_op(&mut self, op: &mut Op) -> Type {
        let class = OpClass::of(op.operator);
        let expected = class.operand();
        let operator = op.operator.keyword();

        let args: Vec<&mut Arg> = match &mut op.args {
            OpArgs::Unary(arg) => vec![arg.as_mut()],
            OpArgs::Binary(lhs, rhs) => vec![lhs.as_mut(), rhs.as_mut()],
        };
        for arg in args {
            let found = self.check_arg(arg);
            if found != Type::Unknown && found != expected {
                let error = TypeError::OperandMismatch {
                    operator,
                    expected,
                    found,
                };
                self.report(error, arg.location());
            }
        }

        op.ty = class.result();
        op.ty
    }

    fn check_arg(&mut self, arg: &mut Arg) -> Type {
        match arg {
            Arg::Atomic(atomic) => self.check_atomic(atomic),
            Arg::Op(op) => self.check_op(op),
        }
    }

    fn check_atomic(&mut self, atomic: &mut Atomic) -> Type {
        match atomic {
            Atomic::Var(name) => self.check_variable(name),
            Atomic::Const(lit) => check_literal(lit),
        }
    }

    fn check_variable(&mut self, name: &mut Name) -> Type {
        let ty = match self.scopes.symbol_by_unique(&name.text) {
            Some(entry) if entry.kind == SymbolKind::Variable => entry.ty,
            _ => {
                let error = TypeError::UnknownSymbol {
                    name: name.original().to_string(),
                };
                self.report(error, name.location());
                Type::Unknown
            }
        };
        name.ty = ty;
        ty
    }

    fn report(&mut self, error: TypeError, location: SourceLocation) {
        debug!(%error, line = location.line, column = location.column, "type error");
        self.diagnostics
            .push(Diagnostic::new(error, &self.file, &self.source, location));
    }
}

fn check_literal(lit: &mut Literal) -> Type {
    lit.ty = match lit.kind {
        LiteralKind::Num => Type::Num,
        LiteralKind::Text => Type::Text,
    };
    lit.ty
}
