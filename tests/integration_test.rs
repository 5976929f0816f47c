// Integration tests for the SPL compiler

use pretty_assertions::assert_eq;
use splc::diagnostics::{DiagnosticKind, ScopeError, TypeError};
use splc::parser::ast::Type;
use splc::parser::lexer::{Lexer, Token, TokenKind};
use splc::parser::parse::parse;
use splc::parser::syntax::SyntaxNode;
use splc::semantic::SymbolKind;
use splc::{compile, compile_tokens, CompileError};
use std::collections::HashSet;

const FULL_PROGRAM: &str = r#"
main
  num V_count, text V_name
begin
  V_count < input ;
  V_name = "spl" ;
  V_count = F_step(V_count, 1, 2) ;
  if and(gt(V_count, 0), not(eq(V_count, 10))) then
  begin
    print V_count ;
    F_show(V_count, 0, 0)
  end
  else
  begin
    skip ;
    halt
  end ;
  print V_name
end

num F_step(V_a, V_b, V_c)
{
  num V_r, num V_s, text V_t,
  begin
    V_r = add(V_a, mul(V_b, sqrt(V_c))) ;
    return V_r
  end
}
end

void F_show(V_a, V_b, V_c)
{
  num V_x, num V_y, num V_z,
  begin
    F_inner(V_a, V_b, V_c) ;
    print V_a
  end
}
  void F_inner(V_a, V_b, V_c)
  {
    num V_x, num V_y, num V_z,
    begin
      print V_c
    end
  }
  end
end
"#;

fn collect_labels(node: &SyntaxNode, labels: &mut HashSet<&'static str>) {
    if let Some(label) = node.label() {
        labels.insert(label);
    }
    for child in node.children() {
        collect_labels(child, labels);
    }
}

#[test]
fn test_every_production_appears_in_tree() {
    let tokens = Lexer::new(FULL_PROGRAM, "full.spl")
        .tokenize()
        .expect("Lexing failed");
    let program = parse(tokens).expect("Parsing failed");

    let mut labels = HashSet::new();
    collect_labels(&program.syntax_tree(), &mut labels);

    for expected in [
        "PROG", "GLOBVARS", "ALGO", "INSTRUC", "COMMAND", "ASSIGN", "TERM", "CALL", "BRANCH",
        "COND", "OP", "ARG", "ATOMIC", "CONST", "FUNCTIONS", "DECL", "HEADER", "BODY",
        "LOCALVARS",
    ] {
        assert!(labels.contains(expected), "missing {expected}");
    }
}

#[test]
fn test_full_program_compiles() {
    let compilation = compile(FULL_PROGRAM, "full.spl").expect("Compilation failed");
    let lines: Vec<&str> = compilation.basic.lines().collect();

    assert_eq!(lines[0], "10 LET v1 = 0");
    assert_eq!(lines[1], "20 LET v2 = \"\"");
    assert!(lines.contains(&"50 LET v1 = f1(v1, 1, 2)"));
    assert!(lines.iter().any(|l| l.ends_with("SUB f1(v3, v4, v5)")));
    assert!(lines.iter().any(|l| l.ends_with("LET v6 = (v3 + (v4 * (SQRT (v5))))")));
    assert!(lines.iter().any(|l| l.ends_with("SUB f3(v15, v16, v17)")));
    assert_eq!(lines.last(), Some(&"270 END SUB"));
}

#[test]
fn test_parse_error_points_at_first_bad_token() {
    let err = compile("main num V_x begin V_x = add(V_x 1) end", "bad.spl").unwrap_err();
    let err = match err {
        CompileError::Parse(err) => err,
        other => panic!("expected parse error, got {other:?}"),
    };
    assert_eq!(err.expected, "','");
    assert_eq!(err.found, "'1'");
    assert_eq!((err.location.line, err.location.column), (1, 34));
}

#[test]
fn test_parse_error_on_later_line() {
    let source = "main\nbegin\n  halt ;\n  print ;\nend";
    let err = compile(source, "lines.spl").unwrap_err();
    assert_eq!(
        err.to_string(),
        "lines.spl:4:9: error: expected a variable or constant, found ';'\n  print ;\n        ^"
    );
}

#[test]
fn test_unique_names_are_distinct() {
    let compilation = compile(FULL_PROGRAM, "full.spl").expect("Compilation failed");
    let symbols = compilation.scopes.symbols();

    let unique: HashSet<_> = symbols.iter().map(|s| s.unique_name.as_str()).collect();
    assert_eq!(unique.len(), symbols.len());

    // V_a is a parameter of all three functions
    let params: Vec<_> = symbols
        .iter()
        .filter(|s| s.original_name == "V_a")
        .map(|s| s.unique_name.as_str())
        .collect();
    assert_eq!(params, vec!["v3", "v9", "v15"]);

    let functions = symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Function)
        .count();
    assert_eq!(functions, 3);
}

#[test]
fn test_uses_of_one_declaration_share_a_name() {
    let compilation = compile(
        "main num V_x begin V_x < input ; V_x = add(V_x, 1) ; print V_x end",
        "same.spl",
    )
    .expect("Compilation failed");
    assert_eq!(
        compilation.basic,
        "10 LET v1 = 0\n20 INPUT v1\n30 LET v1 = (v1 + 1)\n40 PRINT v1\n50 END\n"
    );
}

#[test]
fn test_redeclaration_produces_no_code() {
    let err = compile("main num V_x, num V_x begin halt end", "dup.spl").unwrap_err();
    let CompileError::Scope(diagnostics) = &err else {
        panic!("expected scope errors, got {err:?}");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::Scope(ScopeError::VariableRedeclared {
            name: "V_x".to_string()
        })
    );
    assert_eq!(diagnostics[0].location.column, 19);
    assert_eq!(diagnostics[0].file, "dup.spl");
}

#[test]
fn test_type_soundness() {
    let compilation =
        compile("main num V_x begin V_x < input ; print V_x ; end", "ok.spl").expect("Compilation failed");
    assert_eq!(compilation.program.globals[0].name.ty, Type::Num);

    let err = compile("main num V_x begin V_x = \"hi\" ; end", "bad.spl").unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::Type(TypeError::AssignmentMismatch {
            name: "V_x".to_string(),
            expected: Type::Num,
            found: Type::Text,
        })
    );
    assert!(diagnostics[0].to_string().contains("'V_x'"));
}

#[test]
fn test_recursive_main_rejected_recursive_function_accepted() {
    let err = compile("main begin F_main(1, 2, 3) end", "rec.spl").unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "recursive call to main is not allowed");

    let source = "main num V_r begin V_r = F_fact(5, 0, 0) ; print V_r end \
                  num F_fact(V_n, V_b, V_c) { num V_m, num V_r, num V_z, \
                  begin \
                    if eq(V_n, 0) then begin return 1 end ; \
                    V_m = sub(V_n, 1) ; \
                    V_r = F_fact(V_m, V_b, V_c) ; \
                    V_r = mul(V_n, V_r) ; \
                    return V_r \
                  end } end";
    let compilation = compile(source, "fact.spl").expect("Compilation failed");
    assert!(compilation.basic.contains("LET v6 = f1(v5, v3, v4)"));
}

#[test]
fn test_compilation_is_deterministic() {
    let tokens = Lexer::new(FULL_PROGRAM, "full.spl")
        .tokenize()
        .expect("Lexing failed");
    let first = compile_tokens(tokens.clone()).expect("Compilation failed");
    let second = compile_tokens(tokens).expect("Compilation failed");
    assert_eq!(first.basic, second.basic);

    let broken = "main num V_x, num V_x begin print V_y ; V_z = V_x end \
                  num F_f(V_a, V_a, V_c) { num V_x, num V_y, num V_z, begin return V_q end } end";
    let a = compile(broken, "broken.spl").unwrap_err();
    let b = compile(broken, "broken.spl").unwrap_err();
    assert_eq!(a.diagnostics(), b.diagnostics());
    assert_eq!(a.diagnostics().len(), 5);
}

#[test]
fn test_foreign_token_stream_with_trivia() {
    let t = |kind, column, lexeme| Token::new(kind, "tokens", 1, column, lexeme);
    let tokens = vec![
        t(TokenKind::Main, 1, "main"),
        t(TokenKind::Trivia, 5, " "),
        t(TokenKind::Num, 6, "num"),
        t(TokenKind::VName, 10, "V_x"),
        t(TokenKind::Begin, 14, "begin"),
        t(TokenKind::Trivia, 19, "  "),
        t(TokenKind::Print, 21, "print"),
        t(TokenKind::VName, 27, "V_x"),
        t(TokenKind::End, 31, "end"),
    ];
    let compilation = compile_tokens(tokens).expect("Compilation failed");
    assert_eq!(compilation.basic, "10 LET v1 = 0\n20 PRINT v1\n30 END\n");
}
