//! Balanced-pair delimiter matching.
//!
//! The matcher walks forward character by character, counting nesting
//! depth, and skips any occurrence that is guarded (inside a quote or a
//! comment). A `{` inside a string literal is never counted; a `}` inside
//! a block comment never closes anything.

use cstyle_source::{Loc, Span};

use crate::{ScanError, Scanner};

/// Closing delimiter for a supported opener.
fn closer_for(open: u8) -> u8 {
    match open {
        b'{' => b'}',
        b'(' => b')',
        _ => open,
    }
}

impl Scanner<'_> {
    /// Find the first unguarded occurrence of `byte` at or after `from`.
    pub fn find_unguarded(&self, byte: u8, from: Loc) -> Option<Loc> {
        for line in from.line..self.src.line_count() {
            let lo = if line == from.line { from.col } else { 0 };
            let bytes = self.src.line(line).as_bytes();
            let scan = self.index.scan_line(line);
            for col in (lo as usize)..bytes.len() {
                let loc = Loc::new(line, u32::try_from(col).unwrap_or(u32::MAX));
                if bytes[col] == byte && !self.index.guarded(&scan, loc) {
                    return Some(loc);
                }
            }
        }
        None
    }

    /// Match the delimiter pair opened at `at`, returning the inclusive
    /// span from opener to closer.
    ///
    /// `at` must point at an unguarded `{` or `(`. Depth starts at 1 and
    /// the walk ends when it returns to 0, however many lines, comments,
    /// and string literals lie in between. Running out of file is fatal:
    /// the source is structurally unbalanced.
    pub fn match_pair(&self, at: Loc) -> Result<Span, ScanError> {
        let open = self
            .src
            .line(at.line)
            .as_bytes()
            .get(at.col as usize)
            .copied()
            .unwrap_or(0);
        debug_assert!(
            open == b'{' || open == b'(',
            "match_pair must start at an opening delimiter, got {:?} at {at}",
            open as char
        );
        let close = closer_for(open);

        let mut depth: u32 = 1;
        for line in at.line..self.src.line_count() {
            let lo = if line == at.line {
                at.col as usize + 1
            } else {
                0
            };
            let bytes = self.src.line(line).as_bytes();
            let scan = self.index.scan_line(line);
            for col in lo..bytes.len() {
                let loc = Loc::new(line, u32::try_from(col).unwrap_or(u32::MAX));
                if self.index.guarded(&scan, loc) {
                    continue;
                }
                let b = bytes[col];
                if b == open {
                    depth += 1;
                } else if b == close {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Span::new(at, loc));
                    }
                }
            }
        }
        Err(ScanError::unbalanced(open, close, at))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use cstyle_source::{LexicalIndex, SourceFile};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn with_scanner<R>(text: &str, f: impl FnOnce(&Scanner<'_>) -> R) -> R {
        let src = SourceFile::new(text);
        let index = LexicalIndex::new(&src);
        let scanner = Scanner::new(&src, &index);
        f(&scanner)
    }

    #[test]
    fn matches_simple_pair_on_one_line() {
        with_scanner("f(a, b);", |s| {
            let span = s.match_pair(Loc::new(0, 1)).expect("balanced");
            assert_eq!(span, Span::new(Loc::new(0, 1), Loc::new(0, 6)));
        });
    }

    #[test]
    fn matches_nested_braces_across_lines() {
        with_scanner("{\n  { x; }\n  { y; }\n}", |s| {
            let span = s.match_pair(Loc::new(0, 0)).expect("balanced");
            assert_eq!(span.end, Loc::new(3, 0));
        });
    }

    #[test]
    fn brace_in_string_is_not_counted() {
        with_scanner("{ s = \"}\"; }", |s| {
            let span = s.match_pair(Loc::new(0, 0)).expect("balanced");
            assert_eq!(span.end, Loc::new(0, 11));
        });
    }

    #[test]
    fn brace_in_char_literal_is_not_counted() {
        with_scanner("{ c = '}'; }", |s| {
            let span = s.match_pair(Loc::new(0, 0)).expect("balanced");
            assert_eq!(span.end, Loc::new(0, 11));
        });
    }

    #[test]
    fn brace_in_comment_is_not_counted() {
        with_scanner("{\n  /* } */\n  // }\n}", |s| {
            let span = s.match_pair(Loc::new(0, 0)).expect("balanced");
            assert_eq!(span.end, Loc::new(3, 0));
        });
    }

    #[test]
    fn unbalanced_brace_is_fatal() {
        with_scanner("{ x;", |s| {
            let err = s.match_pair(Loc::new(0, 0)).expect_err("unbalanced");
            assert_eq!(
                err,
                ScanError::Unbalanced {
                    open: '{',
                    close: '}',
                    line: 1
                }
            );
        });
    }

    #[test]
    fn paren_matching_ignores_inner_semicolons() {
        with_scanner("for (i = 0; i < n; i++) {", |s| {
            let span = s.match_pair(Loc::new(0, 4)).expect("balanced");
            assert_eq!(span.end, Loc::new(0, 22));
        });
    }

    #[test]
    fn find_unguarded_skips_quotes_and_comments() {
        with_scanner("x = \"(\"; /* ( */ (y)", |s| {
            let loc = s.find_unguarded(b'(', Loc::new(0, 0)).expect("found");
            assert_eq!(loc, Loc::new(0, 17));
        });
    }

    // === Properties ===

    /// Strategy producing brace-balanced snippets with line breaks and
    /// junk, always starting with `{` and ending with its closer.
    fn balanced() -> impl Strategy<Value = String> {
        let leaf = proptest::string::string_regex("[a-z ;\n]{0,6}")
            .expect("valid generator regex")
            .prop_map(|fill| format!("{{{fill}}}"));
        leaf.prop_recursive(3, 24, 3, |inner| {
            (
                proptest::collection::vec(inner, 0..3),
                proptest::string::string_regex("[a-z ;\n]{0,4}").expect("valid generator regex"),
            )
                .prop_map(|(kids, fill)| format!("{{{fill}{}}}", kids.join(";")))
        })
    }

    proptest! {
        /// For any well-formed nesting, the matcher lands exactly on the
        /// final closer with zero net depth.
        #[test]
        fn balance_invariant(text in balanced()) {
            let src = SourceFile::new(&text);
            let index = LexicalIndex::new(&src);
            let scanner = Scanner::new(&src, &index);
            let span = scanner.match_pair(Loc::new(0, 0)).expect("balanced input");

            let last_line = src.line_count() - 1;
            let last_col = src.line_len(last_line) - 1;
            prop_assert_eq!(span.end, Loc::new(last_line, last_col));
        }
    }
}
