//! Magic-literal detection.
//!
//! A numeric, string, or character literal in live code is "magic" unless
//! it appears on the allow-list below. Literals inside comments never
//! count; a number inside a string literal is not reported separately
//! (the string itself is).

#![allow(
    clippy::expect_used,
    reason = "pattern literals are fixed at compile time and covered by tests"
)]

use std::sync::LazyLock;

use cstyle_source::{LexicalIndex, Loc, SourceFile};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Literals that never count as magic: the identity values and the
/// standard I/O mode strings.
const ALLOWED_LITERALS: [&str; 21] = [
    "0",
    "-1",
    "1",
    "\"\\n\"",
    "'\\n'",
    "'\\0'",
    "\"r\"",
    "\"w\"",
    "\"a\"",
    "\"r+\"",
    "\"w+\"",
    "\"a+\"",
    "\"rb\"",
    "\"wb\"",
    "\"ab\"",
    "\"r+b\"",
    "\"w+b\"",
    "\"a+b\"",
    "\"rb+\"",
    "\"wb+\"",
    "\"ab+\"",
];

static ALLOWED: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| ALLOWED_LITERALS.iter().copied().collect());

/// A numeric literal not glued to an identifier. The capture excludes any
/// leading sign, so `-1` is vetted as `1`.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^a-zA-Z0-9_])-?((?:0x|0)?[0-9]+)").expect("number pattern compiles")
});

/// Returns `true` if the line contains a magic literal in live code.
pub(crate) fn contains_magic(src: &SourceFile, index: &LexicalIndex<'_>, line: u32) -> bool {
    let text = src.line(line);
    let scan = index.scan_line(line);

    // Numeric literals.
    for cap in NUMBER.captures_iter(text) {
        let Some(m) = cap.get(1) else { continue };
        if ALLOWED.contains(m.as_str()) {
            continue;
        }
        let col = u32::try_from(m.start()).unwrap_or(u32::MAX);
        let loc = Loc::new(line, col);
        if index.in_block_comment(loc) || scan.commented_at(col) || scan.quoted_at(col) {
            continue;
        }
        return true;
    }

    // String and character literals. `scan_line` already skips quotes
    // inside comments, so every recorded pair is live code.
    for &(a, b, _) in scan.quote_spans() {
        let Some(token) = text.get(a as usize..=b as usize) else {
            continue;
        };
        if !ALLOWED.contains(token) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magic(text: &str) -> bool {
        let src = SourceFile::new(text);
        let index = LexicalIndex::new(&src);
        contains_magic(&src, &index, 0)
    }

    #[test]
    fn allowed_numbers_pass() {
        assert!(!magic("x = 0;"));
        assert!(!magic("x = 1;"));
        assert!(!magic("x = -1;"));
        assert!(!magic("return 0;"));
    }

    #[test]
    fn bare_numbers_are_magic() {
        assert!(magic("x = 5;"));
        assert!(magic("x = 42 + y;"));
        assert!(magic("x = -7;"));
        assert!(magic("mask = 0x1F;"));
    }

    #[test]
    fn digits_in_identifiers_are_not_literals() {
        assert!(!magic("var2 = var3;"));
        assert!(!magic("p = buf2;"));
    }

    #[test]
    fn io_mode_strings_pass() {
        assert!(!magic("fp = fopen(path, \"r\");"));
        assert!(!magic("fp = fopen(path, \"wb\");"));
        assert!(!magic("fp = fopen(path, \"a+b\");"));
    }

    #[test]
    fn newline_literals_pass() {
        assert!(!magic("printf(\"\\n\");"));
        assert!(!magic("c = '\\n';"));
        assert!(!magic("c = '\\0';"));
    }

    #[test]
    fn other_strings_and_chars_are_magic() {
        assert!(magic("puts(\"hello\");"));
        assert!(magic("c = 'x';"));
        assert!(magic("fp = fopen(path, \"rw\");"));
    }

    #[test]
    fn literals_in_comments_pass() {
        assert!(!magic("x = y; // was 5"));
        assert!(!magic("x = y; /* \"hello\" 42 */"));
    }

    #[test]
    fn number_inside_string_is_reported_as_the_string() {
        // The 42 is quoted; the string token itself is the magic literal.
        assert!(magic("puts(\"42\");"));
    }
}
