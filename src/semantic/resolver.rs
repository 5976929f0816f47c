//! Scope resolution
//!
//! Builds the [`ScopeTree`] for a parsed program and rewrites every variable
//! and function name in the tree to a program-wide unique name (`v1`, `v2`,
//! ... for variables, `f1`, `f2`, ... for functions). The BASIC target has a
//! single flat namespace, so two `V_x` in different functions must not alias.
//!
//! Resolution runs in two passes:
//!
//! 1. **Hoisting** creates one scope per function declaration, nested like the
//!    source, and registers every function name in its enclosing scope. Calls
//!    may therefore refer to functions declared further down.
//! 2. **Resolution** walks the tree in source order, checks declarations,
//!    assigns variable names and resolves every use to the nearest binding.
//!
//! Errors never stop the walk. A rejected variable declaration is simply not
//! registered; a rejected function keeps its hoisted entry so that calls to it
//! do not produce follow-up errors.

use crate::diagnostics::{Diagnostic, ScopeError};
use crate::parser::ast::*;
use crate::parser::source::SourceText;
use crate::semantic::scope::{ScopeId, ScopeTree, SymbolEntry, SymbolKind};
use tracing::{debug, trace};

/// Words a bare name (prefix stripped) must not spell.
const RESERVED: &[&str] = &[
    "main", "begin", "end", "num", "text", "void", "if", "then", "else", "skip", "halt", "print",
    "input", "return", "not", "sqrt", "or", "and", "eq", "gt", "grt", "add", "sub", "mul", "div",
];

fn is_reserved(bare: &str) -> bool {
    RESERVED.contains(&bare)
}

/// Resolve all names in `program`, rewriting them in place.
pub fn resolve(program: &mut Program) -> (ScopeTree, Vec<Diagnostic>) {
    let resolver = ScopeResolver::new(program.file(), &program.source);
    resolver.run(program)
}

/// Per-compilation resolver state. The unique-name counters live here, so
/// independent compilations never share numbering.
pub struct ScopeResolver {
    tree: ScopeTree,
    diagnostics: Vec<Diagnostic>,
    file: String,
    source: SourceText,
    variables: usize,
    functions: usize,
}

impl ScopeResolver {
    pub fn new(file: &str, source: &SourceText) -> Self {
        Self {
            tree: ScopeTree::new(),
            diagnostics: Vec::new(),
            file: file.to_string(),
            source: source.clone(),
            variables: 0,
            functions: 0,
        }
    }

    pub fn run(mut self, program: &mut Program) -> (ScopeTree, Vec<Diagnostic>) {
        let global = self.tree.global();
        self.hoist(global, &program.functions);

        for decl in &mut program.globals {
            self.declare_variable(global, &mut decl.name, decl.var_type.ty());
        }
        self.resolve_algo(global, &mut program.algo);
        self.resolve_functions(global, &mut program.functions);

        debug!(
            scopes = self.tree.scopes().len(),
            symbols = self.tree.symbols().len(),
            errors = self.diagnostics.len(),
            "scope resolution finished"
        );
        (self.tree, self.diagnostics)
    }

    // ===== Hoisting =====

    /// Create a scope for each declaration and register its name in `scope`.
    /// The first declaration of a name wins; duplicates are reported later.
    fn hoist(&mut self, scope: ScopeId, decls: &[FunctionDecl]) {
        for decl in decls {
            let name = &decl.header.name;
            let own = self.tree.add_scope(scope, name.original());

            if self.tree.lookup_local(scope, name.original()).is_none() {
                self.functions += 1;
                let unique = format!("f{}", self.functions);
                trace!(name = name.original(), unique = %unique, "hoisted function");
                let entry = SymbolEntry {
                    original_name: name.original().to_string(),
                    unique_name: unique,
                    kind: SymbolKind::Function,
                    ty: decl.header.return_type.ty(),
                    level: self.tree.scope(scope).level,
                    declaration: name.location(),
                };
                self.tree.declare(scope, entry);
            }

            self.hoist(own, &decl.body.functions);
        }
    }

    // ===== Declarations =====

    fn declare_variable(&mut self, scope: ScopeId, name: &mut Name, ty: Type) {
        let original = name.original().to_string();
        let bare = name.bare().to_string();

        let error = if self.tree.lookup_local(scope, &original).is_some() {
            Some(ScopeError::VariableRedeclared { name: original.clone() })
        } else if is_reserved(&bare) {
            Some(ScopeError::ReservedVariableName { name: original.clone() })
        } else {
            self.tree
                .lookup_function(scope, &format!("F_{bare}"))
                .map(|function| ScopeError::VariableClashesWithFunction {
                    name: original.clone(),
                    function: self.tree.symbol(function).original_name.clone(),
                })
        };
        if let Some(error) = error {
            self.report(error, name.location());
            return;
        }

        self.variables += 1;
        let unique = format!("v{}", self.variables);
        trace!(name = %original, unique = %unique, "declared variable");
        self.tree.declare(
            scope,
            SymbolEntry {
                original_name: original,
                unique_name: unique.clone(),
                kind: SymbolKind::Variable,
                ty,
                level: self.tree.scope(scope).level,
                declaration: name.location(),
            },
        );
        name.text = unique;
    }

    /// Hoisting added one child scope per declaration, in order, so the
    /// children of `scope` line up with `decls`.
    fn resolve_functions(&mut self, scope: ScopeId, decls: &mut [FunctionDecl]) {
        let children = self.tree.scope(scope).children.clone();
        for (decl, own) in decls.iter_mut().zip(children) {
            self.resolve_function(scope, own, decl);
        }
    }

    fn resolve_function(&mut self, scope: ScopeId, own: ScopeId, decl: &mut FunctionDecl) {
        let name = &mut decl.header.name;
        let original = name.original().to_string();
        let bare = name.bare().to_string();
        let location = name.location();

        let entry = self
            .tree
            .lookup_local(scope, &original)
            .filter(|id| self.tree.symbol(*id).declaration == location);

        let error = if entry.is_none() {
            Some(ScopeError::FunctionRedeclared { name: original.clone() })
        } else if is_reserved(&bare) {
            Some(ScopeError::ReservedFunctionName { name: original.clone() })
        } else if let Some(variable) = self.tree.lookup_variable(scope, &format!("V_{bare}")) {
            Some(ScopeError::FunctionClashesWithVariable {
                name: original.clone(),
                variable: self.tree.symbol(variable).original_name.clone(),
            })
        } else if self.tree.scope(scope).name == original {
            Some(ScopeError::FunctionNamedAfterParent { name: original.clone() })
        } else {
            None
        };
        if let Some(error) = error {
            self.report(error, location);
        }
        if let Some(id) = entry {
            name.text = self.tree.symbol(id).unique_name.clone();
        }

        for param in &mut decl.header.params {
            self.declare_variable(own, param, Type::Num);
        }
        for local in &mut decl.body.locals {
            self.declare_variable(own, &mut local.name, local.var_type.ty());
        }
        self.resolve_algo(own, &mut decl.body.algo);
        self.resolve_functions(own, &mut decl.body.functions);
    }

    // ===== Uses =====

    fn resolve_algo(&mut self, scope: ScopeId, algo: &mut Algo) {
        for instruction in &mut algo.instructions {
            self.resolve_command(scope, &mut instruction.command);
        }
    }

    fn resolve_command(&mut self, scope: ScopeId, command: &mut Command) {
        match command {
            Command::Skip(_) | Command::Halt(_) => {}
            Command::Print { value, .. } | Command::Return { value, .. } => {
                self.resolve_atomic(scope, value)
            }
            Command::Assign(assign) => {
                self.resolve_variable(scope, &mut assign.target);
                if let AssignValue::Term(term) = &mut assign.value {
                    self.resolve_term(scope, term);
                }
            }
            Command::Call(call) => self.resolve_call(scope, call),
            Command::Branch(branch) => {
                self.resolve_op(scope, &mut branch.cond);
                self.resolve_algo(scope, &mut branch.then_block);
                if let Some(else_block) = &mut branch.else_block {
                    self.resolve_algo(scope, else_block);
                }
            }
        }
    }

    fn resolve_term(&mut self, scope: ScopeId, term: &mut Term) {
        match term {
            Term::Const(_) => {}
            Term::Var(name) => self.resolve_variable(scope, name),
            Term::Call(call) => self.resolve_call(scope, call),
            Term::Op(op) => self.resolve_op(scope, op),
        }
    }

    fn resolve_op(&mut self, scope: ScopeId, op: &mut Op) {
        match &mut op.args {
            OpArgs::Unary(arg) => self.resolve_arg(scope, arg),
            OpArgs::Binary(lhs, rhs) => {
                self.resolve_arg(scope, lhs);
                self.resolve_arg(scope, rhs);
            }
        }
    }

    fn resolve_arg(&mut self, scope: ScopeId, arg: &mut Arg) {
        match arg {
            Arg::Atomic(atomic) => self.resolve_atomic(scope, atomic),
            Arg::Op(op) => self.resolve_op(scope, op),
        }
    }

    fn resolve_atomic(&mut self, scope: ScopeId, atomic: &mut Atomic) {
        if let Atomic::Var(name) = atomic {
            self.resolve_variable(scope, name);
        }
    }

    fn resolve_variable(&mut self, scope: ScopeId, name: &mut Name) {
        match self.tree.lookup_variable(scope, name.original()) {
            Some(id) => name.text = self.tree.symbol(id).unique_name.clone(),
            None => self.report(
                ScopeError::UndeclaredVariable {
                    name: name.original().to_string(),
                },
                name.location(),
            ),
        }
    }

    /// Callees are looked up from the current scope outward, which covers
    /// recursion, siblings and functions nested in the caller.
    fn resolve_call(&mut self, scope: ScopeId, call: &mut Call) {
        let name = &mut call.name;
        if name.bare() == "main" {
            self.report(ScopeError::RecursiveMain, name.location());
        } else {
            match self.tree.lookup_function(scope, name.original()) {
                Some(id) => name.text = self.tree.symbol(id).unique_name.clone(),
                None => {
                    let error = ScopeError::UndeclaredFunction {
                        name: name.original().to_string(),
                    };
                    self.report(error, name.location());
                }
            }
        }

        for arg in &mut call.args {
            self.resolve_atomic(scope, arg);
        }
    }

    fn report(&mut self, error: ScopeError, location: SourceLocation) {
        debug!(%error, line = location.line, column = location.column, "scope error");
        self.diagnostics
            .push(Diagnostic::new(error, &self.file, &self.source, location));
    }
}
