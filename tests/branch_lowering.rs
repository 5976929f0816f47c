// Branch lowering tests
//
// Generated programs are checked by following their GOTO targets with a
// small line-addressed tracer instead of comparing text alone.

use pretty_assertions::assert_eq;
use splc::compile;
use std::collections::BTreeMap;

/// Statements keyed by line number, indentation stripped
fn listing(basic: &str) -> BTreeMap<usize, String> {
    basic
        .lines()
        .map(|line| {
            let (number, text) = line.split_once(' ').expect("numbered line");
            (number.parse().expect("line number"), text.trim_start().to_string())
        })
        .collect()
}

fn goto_target(text: &str) -> Option<usize> {
    text.strip_prefix("GOTO ").map(|n| n.parse().expect("target"))
}

/// `(then, else)` targets of an `IF` line
fn if_targets(text: &str) -> Option<(usize, usize)> {
    if !text.starts_with("IF ") {
        return None;
    }
    let (rest, else_target) = text.rsplit_once(" ELSE GOTO ")?;
    let (_, then_target) = rest.rsplit_once(" THEN GOTO ")?;
    Some((then_target.parse().ok()?, else_target.parse().ok()?))
}

struct Trace {
    /// Executed statements other than jumps
    statements: Vec<String>,
    visited: Vec<usize>,
}

/// Run from `start` until `END`, `END SUB` or `RETURN`. Each `IF` takes the
/// next branch from `choices` (`true` = then).
fn trace(listing: &BTreeMap<usize, String>, start: usize, choices: &[bool]) -> Trace {
    let mut choices = choices.iter();
    let mut current = Some(start);
    let mut result = Trace {
        statements: Vec::new(),
        visited: Vec::new(),
    };

    while let Some(line) = current {
        assert!(result.visited.len() < 1000, "trace does not terminate");
        let text = listing.get(&line).unwrap_or_else(|| panic!("jump to missing line {line}"));
        result.visited.push(line);

        if let Some(target) = goto_target(text) {
            current = Some(target);
            continue;
        }
        if let Some((then_target, else_target)) = if_targets(text) {
            let take_then = *choices.next().expect("not enough branch choices");
            current = Some(if take_then { then_target } else { else_target });
            continue;
        }
        if text == "END" || text == "END SUB" || text.starts_with("RETURN") {
            result.statements.push(text.clone());
            break;
        }

        result.statements.push(text.clone());
        current = listing.range(line + 1..).next().map(|(n, _)| *n);
    }
    result
}

fn compiled(source: &str) -> BTreeMap<usize, String> {
    listing(&compile(source, "branch.spl").expect("Compilation failed").basic)
}

const PRINT_OR_HALT: &str =
    "main num V_x begin V_x < input ; if gt(V_x, 0) then begin print V_x end else begin halt end end";

#[test]
fn test_targets_land_on_first_statement_of_each_block() {
    let listing = compiled(PRINT_OR_HALT);
    let (l1, l2) = listing.values().find_map(|t| if_targets(t)).expect("IF line");

    assert_eq!(listing[&l1], "PRINT v1");
    assert_eq!(listing[&l2], "END");
}

#[test]
fn test_then_path_skips_else_block() {
    let listing = compiled(PRINT_OR_HALT);
    let (_, l2) = listing.values().find_map(|t| if_targets(t)).expect("IF line");

    let run = trace(&listing, 10, &[true]);
    assert_eq!(run.statements, vec!["LET v1 = 0", "INPUT v1", "PRINT v1", "END"]);
    assert!(!run.visited.contains(&l2));
    assert_eq!(run.visited.last(), Some(&70));
}

#[test]
fn test_else_path_skips_then_block() {
    let listing = compiled(PRINT_OR_HALT);
    let (l1, l2) = listing.values().find_map(|t| if_targets(t)).expect("IF line");

    let run = trace(&listing, 10, &[false]);
    assert_eq!(run.statements, vec!["LET v1 = 0", "INPUT v1", "END"]);
    assert!(!run.visited.contains(&l1));
    assert_eq!(run.visited.last(), Some(&l2));
}

#[test]
fn test_branch_without_else_continues_after_block() {
    let listing = compiled(
        "main num V_x begin if eq(V_x, 1) then begin print 1 ; print 2 end ; print 3 end",
    );
    assert_eq!(
        trace(&listing, 10, &[true]).statements,
        vec!["LET v1 = 0", "PRINT 1", "PRINT 2", "PRINT 3", "END"]
    );
    assert_eq!(
        trace(&listing, 10, &[false]).statements,
        vec!["LET v1 = 0", "PRINT 3", "END"]
    );
}

#[test]
fn test_nested_branches_every_path() {
    let source = "main num V_x begin \
                  if gt(V_x, 0) then begin \
                    if gt(V_x, 5) then begin print \"big\" end else begin print \"small\" end \
                  end else begin \
                    if eq(V_x, 0) then begin print \"zero\" end else begin print \"neg\" end ; \
                    print \"done\" \
                  end ; \
                  print \"after\" end";
    let listing = compiled(source);

    let path = |choices: &[bool]| trace(&listing, 10, choices).statements;
    assert_eq!(
        path(&[true, true]),
        vec!["LET v1 = 0", "PRINT \"big\"", "PRINT \"after\"", "END"]
    );
    assert_eq!(
        path(&[true, false]),
        vec!["LET v1 = 0", "PRINT \"small\"", "PRINT \"after\"", "END"]
    );
    assert_eq!(
        path(&[false, true]),
        vec!["LET v1 = 0", "PRINT \"zero\"", "PRINT \"done\"", "PRINT \"after\"", "END"]
    );
    assert_eq!(
        path(&[false, false]),
        vec!["LET v1 = 0", "PRINT \"neg\"", "PRINT \"done\"", "PRINT \"after\"", "END"]
    );
}

#[test]
fn test_sequential_branches_and_skip() {
    let source = "main num V_x begin \
                  if gt(V_x, 0) then begin skip end else begin print 0 end ; \
                  if gt(V_x, 1) then begin print 1 end ; \
                  skip ; \
                  print 2 end";
    let listing = compiled(source);

    assert_eq!(
        trace(&listing, 10, &[true, true]).statements,
        vec!["LET v1 = 0", "PRINT 1", "PRINT 2", "END"]
    );
    assert_eq!(
        trace(&listing, 10, &[false, false]).statements,
        vec!["LET v1 = 0", "PRINT 0", "PRINT 2", "END"]
    );
}

#[test]
fn test_branch_inside_function_body() {
    let source = "main num V_r begin V_r = F_sign(V_r, 0, 0) end \
                  num F_sign(V_a, V_b, V_c) { num V_x, num V_y, num V_z, \
                  begin \
                    if gt(V_a, 0) then begin V_x = 1 end else begin V_x = 0 end ; \
                    return V_x \
                  end } end";
    let listing = compiled(source);
    let sub = listing
        .iter()
        .find(|(_, text)| text.starts_with("SUB "))
        .map(|(n, _)| *n)
        .expect("SUB line");

    assert_eq!(
        trace(&listing, sub, &[true]).statements,
        vec!["SUB f1(v2, v3, v4)", "LOCAL v2, v3, v4", "LET v5 = 1", "RETURN v5"]
    );
    assert_eq!(
        trace(&listing, sub, &[false]).statements,
        vec!["SUB f1(v2, v3, v4)", "LOCAL v2, v3, v4", "LET v5 = 0", "RETURN v5"]
    );
}

#[test]
fn test_every_jump_target_exists() {
    let programs = [
        PRINT_OR_HALT,
        "main num V_x begin if gt(V_x, 0) then begin end else begin end end",
        "main num V_x begin skip ; skip ; if not(eq(V_x, 0)) then begin skip end end",
        "main begin halt end void F_f(V_a, V_b, V_c) { num V_x, num V_y, num V_z, \
         begin if gt(V_a, V_b) then begin skip end else begin skip end end } end",
    ];

    for source in programs {
        let listing = compiled(source);
        for text in listing.values() {
            let targets: Vec<usize> = match (goto_target(text), if_targets(text)) {
                (Some(target), _) => vec![target],
                (None, Some((a, b))) => vec![a, b],
                (None, None) => continue,
            };
            for target in targets {
                assert!(
                    listing.contains_key(&target),
                    "{text:?} jumps to missing line {target} in:\n{listing:#?}"
                );
            }
        }
    }
}
