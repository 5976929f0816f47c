//! Line-numbered BASIC backend
//!
//! Lowers a resolved, type-checked tree into BASIC text. Every statement gets
//! the next line number from a counter that starts at 10 and only grows by
//! [`LINE_STEP`]. Names are emitted exactly as the scope resolver left them,
//! so the output uses the flat `v1`, `f1` namespace.
//!
//! # Layout
//!
//! ```text
//! LET v = 0 / LET v = ""        one per global, in declaration order
//! <main algorithm>
//! END
//! SUB f(p1, p2, p3)             one block per function, nested ones
//!   LOCAL p1, p2, p3            flattened after their parent
//!   <body>
//! END SUB
//! ```
//!
//! # Branches
//!
//! `if C then T else E` becomes
//!
//! ```text
//! n     IF C THEN GOTO L1 ELSE GOTO L2
//! L1    <T>
//!       GOTO Lend                (only when there is an else block)
//! L2    <E>
//! Lend  <next statement>
//! ```
//!
//! The then-block is rendered first. The line right after it (and after the
//! skip line) is `L2`; the line right after the else-block is `Lend`. The
//! condition line is assembled last from those two numbers, so no placeholder
//! is ever rewritten.

use crate::parser::ast::*;
use tracing::{debug, trace};

/// Distance between consecutive line numbers
pub const LINE_STEP: usize = 10;

const INDENT: &str = "  ";

/// Generate BASIC for a program that passed type checking.
pub fn generate(program: &Program) -> String {
    BasicGenerator::new().generate(program)
}

/// One emitted statement
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    number: usize,
    indent: String,
    text: String,
}

/// Per-compilation generator state: the line counter and current indentation.
#[derive(Debug, Default)]
pub struct BasicGenerator {
    line: usize,
    indent: String,
}

impl BasicGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, program: &Program) -> String {
        let mut lines = Vec::new();

        for decl in &program.globals {
            let init = match decl.var_type {
                VarType::Num => "0",
                VarType::Text => "\"\"",
            };
            lines.push(self.emit(format!("LET {} = {}", decl.name.text, init)));
        }
        lines.extend(self.algo(&program.algo));
        lines.push(self.emit("END"));
        self.functions(&program.functions, &mut lines);

        debug!(lines = lines.len(), last = self.line, "generated BASIC");

        let mut out = String::new();
        for line in &lines {
            out.push_str(&format!("{} {}{}\n", line.number, line.indent, line.text));
        }
        out
    }

    // ===== Line counter =====

    fn next_line(&mut self) -> usize {
        self.line += LINE_STEP;
        self.line
    }

    /// The number the next emitted statement will get
    fn upcoming(&self) -> usize {
        self.line + LINE_STEP
    }

    fn emit(&mut self, text: impl Into<String>) -> Line {
        let number = self.next_line();
        self.line_at(number, text)
    }

    fn line_at(&self, number: usize, text: impl Into<String>) -> Line {
        let line = Line {
            number,
            indent: self.indent.clone(),
            text: text.into(),
        };
        trace!(number, text = %line.text, "emit");
        line
    }

    // ===== Functions =====

    fn functions(&mut self, decls: &[FunctionDecl], lines: &mut Vec<Line>) {
        for decl in decls {
            let header = &decl.header;
            let params = header
                .params
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(self.emit(format!("SUB {}({})", header.name.text, params)));

            let inner = format!("{}{}", self.indent, INDENT);
            let outer = std::mem::replace(&mut self.indent, inner);
            lines.push(self.emit(format!("LOCAL {}", params)));
            lines.extend(self.algo(&decl.body.algo));
            self.indent = outer;

            lines.push(self.emit("END SUB"));
            self.functions(&decl.body.functions, lines);
        }
    }

    // ===== Statements =====

    fn algo(&mut self, algo: &Algo) -> Vec<Line> {
        let mut lines = Vec::new();
        for instruction in &algo.instructions {
            lines.extend(self.command(&instruction.command));
        }
        lines
    }

    fn command(&mut self, command: &Command) -> Vec<Line> {
        match command {
            Command::Skip(_) => {
                let target = self.upcoming() + LINE_STEP;
                vec![self.emit(format!("GOTO {}", target))]
            }
            Command::Halt(_) => vec![self.emit("END")],
            Command::Print { value, .. } => vec![self.emit(format!("PRINT {}", atomic(value)))],
            Command::Return { value, .. } => vec![self.emit(format!("RETURN {}", atomic(value)))],
            Command::Assign(assign) => {
                let text = match &assign.value {
                    AssignValue::Input(_) => format!("INPUT {}", assign.target.text),
                    AssignValue::Term(t) => format!("LET {} = {}", assign.target.text, term(t)),
                };
                vec![self.emit(text)]
            }
            Command::Call(c) => vec![self.emit(format!("CALL {}", call(c)))],
            Command::Branch(branch) => self.branch(branch),
        }
    }

    fn branch(&mut self, branch: &Branch) -> Vec<Line> {
        let cond_line = self.next_line();
        let then_start = self.upcoming();
        let mut body = self.algo(&branch.then_block);

        let (else_start, end) = match &branch.else_block {
            Some(else_block) => {
                let skip_line = self.next_line();
                let else_start = self.upcoming();
                let else_lines = self.algo(else_block);
                let end = self.upcoming();

                body.push(self.line_at(skip_line, format!("GOTO {}", end)));
                body.extend(else_lines);
                (else_start, end)
            }
            None => {
                let end = self.upcoming();
                (end, end)
            }
        };
        trace!(cond_line, then_start, else_start, end, "lowered branch");

        let cond = format!(
            "IF {} THEN GOTO {} ELSE GOTO {}",
            op(&branch.cond),
            then_start,
            else_start
        );
        let mut lines = vec![self.line_at(cond_line, cond)];
        lines.extend(body);
        lines
    }
}

// ===== Expressions =====

fn atomic(atomic: &Atomic) -> String {
    match atomic {
        Atomic::Var(name) => name.text.clone(),
        Atomic::Const(lit) => lit.lexeme().to_string(),
    }
}

fn term(term: &Term) -> String {
    match term {
        Term::Const(lit) => lit.lexeme().to_string(),
        Term::Var(name) => name.text.clone(),
        Term::Call(c) => call(c),
        Term::Op(o) => op(o),
    }
}

fn call(call: &Call) -> String {
    let args = call.args.iter().map(atomic).collect::<Vec<_>>().join(", ");
    format!("{}({})", call.name.text, args)
}

fn arg(arg: &Arg) -> String {
    match arg {
        Arg::Atomic(a) => atomic(a),
        Arg::Op(o) => op(o),
    }
}

fn op(op: &Op) -> String {
    match &op.args {
        OpArgs::Unary(operand) if op.operator == Operator::Sqrt => {
            format!("(SQRT ({}))", arg(operand))
        }
        OpArgs::Unary(operand) => format!("({} {})", keyword(op.operator), arg(operand)),
        OpArgs::Binary(lhs, rhs) => {
            format!("({} {} {})", arg(lhs), keyword(op.operator), arg(rhs))
        }
    }
}

/// BASIC spelling of an operator
fn keyword(operator: Operator) -> &'static str {
    match operator {
        Operator::Or => "OR",
        Operator::And => "AND",
        Operator::Eq => "=",
        Operator::Gt => ">",
        Operator::Add => "+",
        Operator::Sub => "-",
        Operator::Mul => "*",
        Operator::Div => "/",
        Operator::Not => "NOT",
        Operator::Sqrt => "SQRT",
    }
}
