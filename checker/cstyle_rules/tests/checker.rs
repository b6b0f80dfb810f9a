//! End-to-end checks: whole files in, diagnostic streams out.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use cstyle_rules::{CheckError, Checker, RunOptions};
use cstyle_scan::ScanError;
use cstyle_source::{LexicalIndex, SourceFile};
use pretty_assertions::assert_eq;

fn check_with(text: &str, tweak: impl FnOnce(&mut RunOptions)) -> String {
    let src = SourceFile::new(text);
    let index = LexicalIndex::new(&src);
    let mut options = RunOptions::new("test.c");
    tweak(&mut options);
    let mut buf = Vec::new();
    let mut checker = Checker::new(&src, &index, &options, &mut buf).expect("checker builds");
    checker.run().expect("scan completes");
    String::from_utf8(buf).expect("diagnostics are UTF-8")
}

fn check(text: &str) -> String {
    check_with(text, |_| {})
}

fn check_err(text: &str) -> CheckError {
    let src = SourceFile::new(text);
    let index = LexicalIndex::new(&src);
    let options = RunOptions::new("test.c");
    let mut buf = Vec::new();
    match Checker::new(&src, &index, &options, &mut buf) {
        Err(err) => err,
        Ok(mut checker) => checker.run().expect_err("scan fails"),
    }
}

const CLEAN: &str = "\
/*
 * Widget routines.
 */

#include <stdio.h>

#define WIDGET_MAX 8

int main(int argc, char **argv) {
  int i;

  for (i = 0; i < WIDGET_MAX; i++) {
    if (i == 0) {
      putchar('\\n');
    } else {
      putchar('\\n');
    }
  }

  return 0;
}
";

#[test]
fn clean_file_produces_no_diagnostics() {
    assert_eq!(check(CLEAN), "");
}

#[test]
fn output_is_idempotent() {
    assert_eq!(check(CLEAN), check(CLEAN));
}

#[test]
fn over_indented_body_line_is_reported_once() {
    let text = "\
void f(int x) {
  if (x) {
      x = 0;
  }
}
";
    assert_eq!(
        check(text),
        "Line 3: Inconsistent Indentation\n      x = 0;\n"
    );
}

#[test]
fn trailing_comment_text_never_classifies() {
    // The `if` in the comment must not turn the line into a conditional.
    assert_eq!(check("int x = 5; // if (x) { }\n"), "");
}

#[test]
fn keyword_embedded_in_identifier_is_not_a_keyword() {
    // `dowork` starting a line must not parse as a `do` statement.
    assert_eq!(check("dowork();\n"), "");
}

#[test]
fn dangling_else_chains_without_braces() {
    let text = "\
void f(int a) {
  if (a)
    g();
  else
    h();
}
";
    assert_eq!(check(text), "");
}

#[test]
fn magic_literals_inside_function_bodies() {
    let text = "\
void f(void) {
  int x;

  x = 42;
  x = 0;
  puts(\"hello\");
}
";
    assert_eq!(
        check(text),
        "Line 4: Contains magic number/word\n  x = 42;\n\
         Line 6: Contains magic number/word\n  puts(\"hello\");\n"
    );
}

#[test]
fn file_scope_literals_are_not_magic() {
    assert_eq!(check("int limit = 250;\n"), "");
}

#[test]
fn io_mode_strings_are_allowed_in_bodies() {
    let text = "\
void f(void) {
  fp = fopen(path, \"r\");
  fp = fopen(path, \"wb\");
}
";
    assert_eq!(check(text), "");
}

#[test]
fn unmatched_brace_aborts_the_run() {
    let err = check_err("void f(void) {\n  x = 1;\n");
    match err {
        CheckError::Scan(ScanError::Unbalanced { open, close, line }) => {
            assert_eq!((open, close, line), ('{', '}', 1));
        }
        other => panic!("expected unbalanced-brace failure, got {other}"),
    }
}

#[test]
fn missing_terminator_aborts_the_run() {
    let err = check_err("int x = 1\n");
    assert!(matches!(
        err,
        CheckError::Scan(ScanError::MissingTerminator { line: 1 })
    ));
}

#[test]
fn excess_blank_lines_are_reported() {
    let text = "int a;\n\n\n\n\nint b;\n";
    assert_eq!(
        check(text),
        "Line 2 to 5: Excess newlines. More than the newline limit (2)\n"
    );
}

#[test]
fn blank_line_whitespace_needs_the_toggle() {
    let text = "int a;\n   \nint b;\n";
    assert_eq!(check(text), "");
    assert_eq!(
        check_with(text, |o| o.check_whitespace = true),
        "Line 2: Extra whitespace on empty line\n\
         Note: White space replaced with ^\n\
         ^^^\n"
    );
}

#[test]
fn long_lines_are_reported() {
    let long = format!("int x; // {}", "x".repeat(75));
    assert_eq!(long.len(), 85);
    let text = format!("{long}\n");
    assert_eq!(
        check(&text),
        format!("Line 1 is over 80 characters\n{long}\n")
    );

    let exactly_80 = format!("// {}", "x".repeat(77));
    assert_eq!(exactly_80.len(), 80);
    assert_eq!(check(&format!("{exactly_80}\n")), "");
}

#[test]
fn tabs_expand_for_column_checks() {
    let text = "void f(void) {\n\tx = 1;\n}\n";
    assert_eq!(check(text), "");
}

#[test]
fn auto_detected_four_space_indent() {
    let text = "\
void f(void) {
    x = 1;
    if (x) {
        g();
    }
}
";
    assert_eq!(check(text), "");
}

#[test]
fn indent_override_wins_over_detection() {
    let text = "\
void f(void) {
    x = 1;
}
";
    assert_eq!(check(text), "");
    let out = check_with(text, |o| o.indent_override = Some(2));
    assert!(out.contains("Inconsistent Indentation"), "got: {out}");
}

#[test]
fn switch_with_indented_case_labels() {
    let text = "\
void f(int x) {
  switch (x) {
    case 0:
      g();
      break;
    default:
      h();
      break;
  }
}
";
    assert_eq!(check(text), "");
}

#[test]
fn switch_with_flush_case_labels() {
    let text = "\
void f(int x) {
  switch (x) {
  case 0:
    g();
    break;
  default:
    h();
    break;
  }
}
";
    assert_eq!(check(text), "");
}

#[test]
fn commented_out_code_and_todo_markers() {
    let text = "\
void f(void) {
  g();
  // x = 5;
  // TODO clean up
}
";
    assert_eq!(
        check(text),
        "Line 3: Commented out code\n  // x = 5;\n\
         Line 4: Left in TODO comment\n  // TODO clean up\n"
    );
}

#[test]
fn statements_after_braces_are_reported() {
    let text = "\
void f(int x) {
  if (x) { g(); }
}
";
    assert_eq!(
        check(text),
        "Line 2: Statements behind { should be on the next line\n  if (x) { g(); }\n\
         Line 2: } should be on the next line\n\
         Line 2: Inconsistent Indentation\n  if (x) { g(); }\n"
    );
}

#[test]
fn do_while_checks_cleanly() {
    let text = "\
void f(int x) {
  do {
    x--;
  } while (x > 0);
}
";
    assert_eq!(check(text), "");
}

#[test]
fn else_if_chains_check_as_one_construct() {
    let text = "\
void f(int x) {
  if (x == 0) {
    g();
  } else if (x == 1) {
    h();
  } else {
    k();
  }
}
";
    assert_eq!(check(text), "");
}

#[test]
fn struct_aggregates_at_file_scope() {
    let text = "\
struct point {
  int x;
  int y;
};
";
    assert_eq!(check(text), "");
}

// === Strict mode ===

#[test]
fn strict_requires_one_space_before_brace() {
    let text = "\
void f(int x) {
  if (x){
    g();
  }
}
";
    assert_eq!(check(text), "");
    assert_eq!(
        check_with(text, |o| o.strict = true),
        "Line 2: Expected exactly one space between ) and {\n  if (x){\n"
    );
}

#[test]
fn strict_requires_braces_on_bodies() {
    let text = "\
void f(int x) {
  if (x)
    g();
}
";
    assert_eq!(check(text), "");
    assert_eq!(
        check_with(text, |o| o.strict = true),
        "Line 2: Conditional body must use curly braces\n  if (x)\n"
    );
}

#[test]
fn strict_checks_else_adjacency_spacing() {
    let text = "\
void f(int x) {
  if (x) {
    g();
  }  else {
    h();
  }
}
";
    assert_eq!(check(text), "");
    assert_eq!(
        check_with(text, |o| o.strict = true),
        "Line 4: Expected exactly one space between } and else\n  }  else {\n"
    );
}

#[test]
fn print_headers_lists_function_definitions() {
    let text = "\
int one(void) {
  return 0;
}

int two(int a) {
  return a;
}
";
    let src = SourceFile::new(text);
    let index = LexicalIndex::new(&src);
    let options = RunOptions::new("test.c");
    let mut buf = Vec::new();
    let mut checker = Checker::new(&src, &index, &options, &mut buf).expect("checker builds");
    checker.print_headers().expect("headers print");
    drop(checker);
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "Line 1: int one(void) {\nLine 5: int two(int a) {\n"
    );
}
