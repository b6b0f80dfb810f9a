//! Control-keyword and statement-terminator search.
//!
//! Keyword matches are word-boundary-checked (a keyword embedded in an
//! identifier like `dowork` never matches) and skipped when they fall
//! inside a quote or comment. The earliest occurrence on the line wins;
//! at the same start column the longest keyword wins, so `else if` beats
//! `else`.

use cstyle_source::Loc;

use crate::Scanner;

/// The fixed control-keyword set the scanner recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    ElseIf,
    While,
    For,
    Switch,
    Do,
    Else,
    Case,
    Default,
    Break,
    Continue,
}

/// How a keyword drives classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordClass {
    /// Owns a parenthesized condition: `if`, `else if`, `while`, `for`,
    /// `switch`.
    Conditional,
    /// Introduces a body with no condition of its own: `else`, `do`.
    Unconditional,
    /// A switch-case label: `case`, `default`.
    CaseLabel,
    /// Recognized for lookahead only; the line classifies as a plain
    /// statement: `break`, `continue`.
    Other,
}

impl Keyword {
    /// Every keyword, in no significant order (search is position-driven).
    pub const ALL: [Keyword; 11] = [
        Keyword::While,
        Keyword::For,
        Keyword::Switch,
        Keyword::If,
        Keyword::ElseIf,
        Keyword::Else,
        Keyword::Do,
        Keyword::Case,
        Keyword::Default,
        Keyword::Break,
        Keyword::Continue,
    ];

    /// Source text of the keyword.
    pub fn text(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::ElseIf => "else if",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::Switch => "switch",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Case => "case",
            Keyword::Default => "default",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
        }
    }

    /// Classification role of the keyword.
    pub fn class(self) -> KeywordClass {
        match self {
            Keyword::If | Keyword::ElseIf | Keyword::While | Keyword::For | Keyword::Switch => {
                KeywordClass::Conditional
            }
            Keyword::Else | Keyword::Do => KeywordClass::Unconditional,
            Keyword::Case | Keyword::Default => KeywordClass::CaseLabel,
            Keyword::Break | Keyword::Continue => KeywordClass::Other,
        }
    }
}

/// A keyword found on a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeywordMatch {
    pub keyword: Keyword,
    pub loc: Loc,
}

/// Result of a terminator search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermHit {
    /// A terminator character from the requested set.
    Byte(u8, Loc),
    /// Keyword lookahead stopped the search on a later line.
    Keyword(KeywordMatch),
}

impl TermHit {
    /// The position of the hit, whichever form it took.
    pub fn loc(&self) -> Loc {
        match *self {
            TermHit::Byte(_, loc) => loc,
            TermHit::Keyword(m) => m.loc,
        }
    }
}

/// Returns `true` for identifier-continuation bytes.
fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Scanner<'_> {
    /// Find the earliest control keyword on `line` at or after column
    /// `from`, honoring word boundaries and quote/comment guards.
    pub fn find_keyword(&self, line: u32, from: u32) -> Option<KeywordMatch> {
        let text = self.src.line(line);
        let bytes = text.as_bytes();
        let scan = self.index.scan_line(line);

        let mut best: Option<(KeywordMatch, usize)> = None;
        for keyword in Keyword::ALL {
            let word = keyword.text();
            let mut search = from as usize;
            while let Some(rel) = text.get(search..).and_then(|s| s.find(word)) {
                let at = search + rel;
                let end = at + word.len();
                let left_ok = at == 0 || !is_ident(bytes[at - 1]);
                let right_ok = end >= bytes.len() || !is_ident(bytes[end]);
                let col = u32::try_from(at).unwrap_or(u32::MAX);
                if left_ok && right_ok && !self.index.guarded(&scan, Loc::new(line, col)) {
                    let better = match best {
                        None => true,
                        Some((b, blen)) => {
                            col < b.loc.col || (col == b.loc.col && word.len() > blen)
                        }
                    };
                    if better {
                        best = Some((
                            KeywordMatch {
                                keyword,
                                loc: Loc::new(line, col),
                            },
                            word.len(),
                        ));
                    }
                    break;
                }
                search = at + 1;
            }
        }
        best.map(|(m, _)| m)
    }

    /// Find the first unguarded terminator byte from `from`, scanning
    /// forward line by line.
    ///
    /// With `keyword_lookahead`, lines after the first are also checked for
    /// a control keyword once their character scan comes up empty: this is
    /// how dangling single-statement bodies of nested conditionals are
    /// detected. A terminator character on a line wins over a keyword on
    /// the same line.
    pub fn find_terminator(
        &self,
        from: Loc,
        terms: &[u8],
        keyword_lookahead: bool,
    ) -> Option<TermHit> {
        for line in from.line..self.src.line_count() {
            let lo = if line == from.line { from.col } else { 0 };
            let bytes = self.src.line(line).as_bytes();
            let scan = self.index.scan_line(line);
            for col in (lo as usize)..bytes.len() {
                let loc = Loc::new(line, u32::try_from(col).unwrap_or(u32::MAX));
                if self.index.guarded(&scan, loc) {
                    continue;
                }
                if terms.contains(&bytes[col]) {
                    return Some(TermHit::Byte(bytes[col], loc));
                }
            }
            if line != from.line && keyword_lookahead {
                if let Some(m) = self.find_keyword(line, 0) {
                    return Some(TermHit::Keyword(m));
                }
            }
        }
        None
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

    fn with_scanner<R>(text: &str, f: impl FnOnce(&Scanner<'_>) -> R) -> R {
        let src = SourceFile::new(text);
        let index = LexicalIndex::new(&src);
        let scanner = Scanner::new(&src, &index);
        f(&scanner)
    }

    // === Keyword search ===

    #[test]
    fn finds_keyword_at_line_start() {
        with_scanner("if (x) {", |s| {
            let m = s.find_keyword(0, 0).expect("keyword");
            assert_eq!(m.keyword, Keyword::If);
            assert_eq!(m.loc, Loc::new(0, 0));
        });
    }

    #[test]
    fn embedded_keyword_does_not_match() {
        with_scanner("  dowork();", |s| {
            assert_eq!(s.find_keyword(0, 0), None);
        });
    }

    #[test]
    fn else_if_beats_else() {
        with_scanner("} else if (x) {", |s| {
            let m = s.find_keyword(0, 0).expect("keyword");
            assert_eq!(m.keyword, Keyword::ElseIf);
            assert_eq!(m.loc.col, 2);
        });
    }

    #[test]
    fn earliest_occurrence_wins() {
        with_scanner("if (a) x = do_it;", |s| {
            let m = s.find_keyword(0, 0).expect("keyword");
            assert_eq!(m.keyword, Keyword::If);
        });
    }

    #[test]
    fn keyword_in_comment_is_skipped() {
        with_scanner("x = 1; // if (y) { }", |s| {
            assert_eq!(s.find_keyword(0, 0), None);
        });
    }

    #[test]
    fn keyword_in_string_is_skipped() {
        with_scanner("puts(\"else\");", |s| {
            assert_eq!(s.find_keyword(0, 0), None);
        });
    }

    #[test]
    fn search_respects_from_column() {
        with_scanner("} while (x);", |s| {
            let m = s.find_keyword(0, 1).expect("keyword");
            assert_eq!(m.keyword, Keyword::While);
            assert_eq!(s.find_keyword(0, 5), None);
        });
    }

    // === Terminator search ===

    #[test]
    fn finds_semicolon_on_same_line() {
        with_scanner("x = 1;", |s| {
            let hit = s.find_terminator(Loc::new(0, 0), b"{;", false);
            assert_eq!(hit, Some(TermHit::Byte(b';', Loc::new(0, 5))));
        });
    }

    #[test]
    fn skips_terminator_in_string() {
        with_scanner("s = \";\"; t;", |s| {
            let hit = s.find_terminator(Loc::new(0, 0), b"{;", false);
            assert_eq!(hit, Some(TermHit::Byte(b';', Loc::new(0, 7))));
        });
    }

    #[test]
    fn skips_terminator_in_comment() {
        with_scanner("x = 1 /* ; */\n  + 2;", |s| {
            let hit = s.find_terminator(Loc::new(0, 0), b"{;", false);
            assert_eq!(hit, Some(TermHit::Byte(b';', Loc::new(1, 5))));
        });
    }

    #[test]
    fn lookahead_stops_at_keyword_on_later_line() {
        with_scanner("if (a)\n  if (b)\n    x = 1;", |s| {
            let hit = s
                .find_terminator(Loc::new(0, 6), b"{;", true)
                .expect("hit");
            match hit {
                TermHit::Keyword(m) => {
                    assert_eq!(m.keyword, Keyword::If);
                    assert_eq!(m.loc, Loc::new(1, 2));
                }
                TermHit::Byte(..) => panic!("expected keyword hit, got {hit:?}"),
            }
        });
    }

    #[test]
    fn terminator_on_line_beats_keyword_on_same_line() {
        // The character scan of a line runs before its keyword check.
        with_scanner("else\nif (b) { x; }", |s| {
            let hit = s
                .find_terminator(Loc::new(0, 0), b"{;", true)
                .expect("hit");
            assert_eq!(hit, TermHit::Byte(b'{', Loc::new(1, 7)));
        });
    }
}
