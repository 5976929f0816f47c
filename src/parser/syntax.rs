//! Generic syntax tree view
//!
//! The typed tree in [`ast`](crate::parser::ast) is what the passes work on.
//! [`SyntaxNode`] is a uniform `Terminal | Nonterminal` rendering of the same
//! tree, labelled with grammar symbol names, for inspection and `--emit tree`.
//!
//! Recursive rules (`GLOBVARS`, `INSTRUC`, `FUNCTIONS`) keep their recursive
//! shape here, so an empty nonterminal marks the ε alternative. Punctuation
//! and the `then`/`else` keywords are not materialized. Name terminals carry
//! the name as currently stored in the tree, i.e. the unique name once scope
//! resolution has run.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Terminal(Token),
    Nonterminal {
        label: &'static str,
        ty: Type,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    fn node(label: &'static str, children: Vec<SyntaxNode>) -> Self {
        Self::typed(label, Type::Unknown, children)
    }

    fn typed(label: &'static str, ty: Type, children: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Nonterminal {
            label,
            ty,
            children,
        }
    }

    fn token(token: &Token) -> Self {
        SyntaxNode::Terminal(token.clone())
    }

    fn name(name: &Name) -> Self {
        let mut token = name.token.clone();
        token.lexeme = name.text.clone();
        SyntaxNode::Terminal(token)
    }

    /// Grammar symbol of a nonterminal, `None` for terminals
    pub fn label(&self) -> Option<&'static str> {
        match self {
            SyntaxNode::Terminal(_) => None,
            SyntaxNode::Nonterminal { label, .. } => Some(*label),
        }
    }

    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Terminal(_) => &[],
            SyntaxNode::Nonterminal { children, .. } => children,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            SyntaxNode::Terminal(_) => Type::Unknown,
            SyntaxNode::Nonterminal { ty, .. } => *ty,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            SyntaxNode::Terminal(token) => writeln!(f, "{}{:?} {}", indent, token.kind, token.lexeme),
            SyntaxNode::Nonterminal {
                label,
                ty,
                children,
            } => {
                if *ty == Type::Unknown {
                    writeln!(f, "{}{}", indent, label)?;
                } else {
                    writeln!(f, "{}{} : {}", indent, label, ty)?;
                }
                for child in children {
                    child.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl Program {
    /// Build the generic view rooted at `PROG`.
    pub fn syntax_tree(&self) -> SyntaxNode {
        SyntaxNode::node(
            "PROG",
            vec![
                SyntaxNode::token(&self.main),
                globvars(&self.globals),
                algo(&self.algo),
                functions(&self.functions),
            ],
        )
    }
}

fn globvars(globals: &[VarDecl]) -> SyntaxNode {
    let mut children = Vec::new();
    if let Some((first, rest)) = globals.split_first() {
        children.push(SyntaxNode::token(&first.type_token));
        children.push(SyntaxNode::name(&first.name));
        if !rest.is_empty() {
            children.push(globvars(rest));
        }
    }
    SyntaxNode::node("GLOBVARS", children)
}

fn algo(algo: &Algo) -> SyntaxNode {
    SyntaxNode::node(
        "ALGO",
        vec![
            SyntaxNode::token(&algo.begin),
            instruc(&algo.instructions),
            SyntaxNode::token(&algo.end),
        ],
    )
}

fn instruc(instructions: &[Instruction]) -> SyntaxNode {
    match instructions.split_first() {
        Some((first, rest)) => SyntaxNode::node("INSTRUC", vec![command(first), instruc(rest)]),
        None => SyntaxNode::node("INSTRUC", Vec::new()),
    }
}

fn command(instruction: &Instruction) -> SyntaxNode {
    let children = match &instruction.command {
        Command::Skip(token) | Command::Halt(token) => vec![SyntaxNode::token(token)],
        Command::Print { keyword, value } | Command::Return { keyword, value } => {
            vec![SyntaxNode::token(keyword), atomic(value)]
        }
        Command::Assign(assign) => {
            let value = match &assign.value {
                AssignValue::Input(token) => SyntaxNode::token(token),
                AssignValue::Term(term) => self::term(term),
            };
            vec![SyntaxNode::node(
                "ASSIGN",
                vec![SyntaxNode::name(&assign.target), value],
            )]
        }
        Command::Call(call) => vec![self::call(call)],
        Command::Branch(branch) => {
            let mut children = vec![
                SyntaxNode::token(&branch.keyword),
                op_node("COND", &branch.cond),
                algo(&branch.then_block),
            ];
            if let Some(else_block) = &branch.else_block {
                children.push(algo(else_block));
            }
            vec![SyntaxNode::node("BRANCH", children)]
        }
    };
    SyntaxNode::typed("COMMAND", instruction.ty, children)
}

fn term(term: &Term) -> SyntaxNode {
    let child = match term {
        Term::Const(lit) => constant(lit),
        Term::Var(name) => SyntaxNode::name(name),
        Term::Call(c) => call(c),
        Term::Op(op) => op_node("OP", op),
    };
    SyntaxNode::typed("TERM", term.ty(), vec![child])
}

fn call(call: &Call) -> SyntaxNode {
    let mut children = vec![SyntaxNode::name(&call.name)];
    children.extend(call.args.iter().map(atomic));
    SyntaxNode::typed("CALL", call.ty, children)
}

fn op_node(label: &'static str, op: &Op) -> SyntaxNode {
    let mut children = vec![SyntaxNode::token(&op.token)];
    match &op.args {
        OpArgs::Unary(arg_node) => children.push(arg(arg_node)),
        OpArgs::Binary(lhs, rhs) => {
            children.push(arg(lhs));
            children.push(arg(rhs));
        }
    }
    SyntaxNode::typed(label, op.ty, children)
}

fn arg(arg: &Arg) -> SyntaxNode {
    let child = match arg {
        Arg::Atomic(a) => atomic(a),
        Arg::Op(op) => op_node("OP", op),
    };
    SyntaxNode::typed("ARG", arg.ty(), vec![child])
}

fn atomic(atomic: &Atomic) -> SyntaxNode {
    let child = match atomic {
        Atomic::Var(name) => SyntaxNode::name(name),
        Atomic::Const(lit) => constant(lit),
    };
    SyntaxNode::typed("ATOMIC", atomic.ty(), vec![child])
}

fn constant(lit: &Literal) -> SyntaxNode {
    SyntaxNode::typed("CONST", lit.ty, vec![SyntaxNode::token(&lit.token)])
}

fn functions(decls: &[FunctionDecl]) -> SyntaxNode {
    match decls.split_first() {
        Some((first, rest)) => SyntaxNode::node("FUNCTIONS", vec![decl(first), functions(rest)]),
        None => SyntaxNode::node("FUNCTIONS", Vec::new()),
    }
}

fn decl(decl: &FunctionDecl) -> SyntaxNode {
    let header = &decl.header;
    let mut header_children = vec![
        SyntaxNode::token(&header.return_token),
        SyntaxNode::name(&header.name),
    ];
    header_children.extend(header.params.iter().map(SyntaxNode::name));

    let body = &decl.body;
    let mut locals = Vec::with_capacity(6);
    for local in &body.locals {
        locals.push(SyntaxNode::token(&local.type_token));
        locals.push(SyntaxNode::name(&local.name));
    }

    SyntaxNode::node(
        "DECL",
        vec![
            SyntaxNode::node("HEADER", header_children),
            SyntaxNode::node(
                "BODY",
                vec![
                    SyntaxNode::node("LOCALVARS", locals),
                    algo(&body.algo),
                    functions(&body.functions),
                    SyntaxNode::token(&body.end),
                ],
            ),
        ],
    )
}
