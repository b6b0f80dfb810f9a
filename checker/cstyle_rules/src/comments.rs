//! Comment hygiene: commented-out code and leftover TODO markers.

#![allow(
    clippy::expect_used,
    reason = "pattern literals are fixed at compile time and covered by tests"
)]

use std::sync::LazyLock;

use cstyle_scan::patterns;
use regex::Regex;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *=.* *;").expect("assignment pattern compiles")
});

static DECL_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *\** *[a-zA-Z_][a-zA-Z0-9_]* *=.* *;")
        .expect("declaration-assignment pattern compiles")
});

static FUNC_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *\(.*\) *;").expect("call pattern compiles")
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *\** *[a-zA-Z_][a-zA-Z0-9_]* *;")
        .expect("declaration pattern compiles")
});

static KEYWORD_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( *(if|else if|while|for|switch) *\(.*\)|(continue|break);)")
        .expect("keyword statement pattern compiles")
});

static TODO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *// *TODO").expect("todo pattern compiles"));

/// Returns `true` if trailing text is acceptable as a comment.
pub(crate) fn is_comment_text(text: &str) -> bool {
    text.starts_with("//") || text.starts_with("/*")
}

/// Returns `true` if stripped comment text re-matches the live-code
/// pattern set (directive, signature, assignment, declaration, call, or a
/// keyword statement).
pub(crate) fn looks_like_code(text: &str) -> bool {
    patterns::is_directive(text)
        || patterns::is_function_signature(text)
        || patterns::is_function_declaration(text)
        || ASSIGNMENT.is_match(text)
        || DECL_ASSIGNMENT.is_match(text)
        || FUNC_CALL.is_match(text)
        || DECLARATION.is_match(text)
        || KEYWORD_STMT.is_match(text)
}

/// Returns `true` for a `// TODO` line comment.
pub(crate) fn is_todo_line_comment(text: &str) -> bool {
    TODO_LINE.is_match(text)
}

/// Returns `true` when a block-comment line carries a TODO marker after
/// its decoration (`/*`, `*`, whitespace).
pub(crate) fn block_comment_line_has_todo(text: &str) -> bool {
    text.trim_start()
        .trim_start_matches(['/', '*', ' '])
        .starts_with("TODO")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_out_statements_look_like_code() {
        assert!(looks_like_code(" x = 5;"));
        assert!(looks_like_code(" int x = 5;"));
        assert!(looks_like_code(" foo(a, b);"));
        assert!(looks_like_code(" char *p;"));
        assert!(looks_like_code(" if (x) return;"));
        assert!(looks_like_code("break;"));
        assert!(looks_like_code("#include <stdio.h>"));
    }

    #[test]
    fn prose_does_not_look_like_code() {
        assert!(!looks_like_code(" walks the list once"));
        assert!(!looks_like_code(" handles the empty case"));
        assert!(!looks_like_code(" see the header for details"));
    }

    #[test]
    fn todo_detection() {
        assert!(is_todo_line_comment("// TODO fix overflow"));
        assert!(is_todo_line_comment("  //TODO"));
        assert!(!is_todo_line_comment("// nothing to do here"));
        assert!(block_comment_line_has_todo(" * TODO revisit"));
        assert!(!block_comment_line_has_todo(" * all done"));
    }

    #[test]
    fn comment_text_recognition() {
        assert!(is_comment_text("// x"));
        assert!(is_comment_text("/* x */"));
        assert!(!is_comment_text("x = 1;"));
    }
}
