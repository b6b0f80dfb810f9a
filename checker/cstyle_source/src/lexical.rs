//! Lexical-span index: where comments and quoted literals live.
//!
//! Built once per file by a single forward scan that records every
//! block-comment span. An open sequence only toggles comment state when it
//! is not itself inside a string literal (a `"/*"` string constant must not
//! open a comment) and not behind an unquoted `//` on the same line.
//!
//! Per-line quote spans and `//` positions are *not* cached: they are
//! recomputed on demand by [`LexicalIndex::scan_line`]. The scan is
//! left-to-right and the first opener found is authoritative: a quote
//! inside a comment never opens, and a comment opener inside a quote never
//! toggles ("outer wins").

use memchr::memmem;

use crate::{Loc, SourceFile, Span};

/// Returns `true` if the byte at `col` is escaped by a backslash run.
///
/// A character is escaped iff it is preceded by an odd number of
/// consecutive backslashes, so `"a\""` stays open at the inner quote and
/// `"a\\"` closes.
fn is_escaped(bytes: &[u8], col: usize) -> bool {
    let mut backslashes = 0;
    let mut i = col;
    while i > 0 && bytes[i - 1] == b'\\' {
        backslashes += 1;
        i -= 1;
    }
    backslashes % 2 == 1
}

/// Pre-computed block-comment spans plus on-demand per-line lexical queries.
pub struct LexicalIndex<'a> {
    src: &'a SourceFile,
    /// Block-comment spans, ordered by start, non-overlapping.
    blocks: Vec<Span>,
}

impl<'a> LexicalIndex<'a> {
    /// Scan the whole file once and record every block-comment span.
    ///
    /// A comment left open at end of file produces no span; the classifier
    /// reports the unterminated comment when it reaches the opener.
    pub fn new(src: &'a SourceFile) -> Self {
        let mut blocks = Vec::new();
        let mut open: Option<Loc> = None;

        for line in 0..src.line_count() {
            let bytes = src.line(line).as_bytes();
            let mut col = 0usize;

            'line: loop {
                if open.is_some() {
                    // Inside a block comment: look for the closer.
                    match memmem::find(&bytes[col..], b"*/") {
                        Some(p) => {
                            let start = open.take().unwrap_or(Loc::new(line, 0));
                            let end = Loc::new(line, u32::try_from(col + p + 1).unwrap_or(0));
                            blocks.push(Span::new(start, end));
                            col += p + 2;
                        }
                        // Comment continues onto the next line.
                        None => break 'line,
                    }
                } else {
                    // Live code: look for an opener, tracking quotes so an
                    // opener inside a string does not toggle state.
                    let mut quote: Option<u8> = None;
                    while col < bytes.len() {
                        let b = bytes[col];
                        match quote {
                            Some(q) => {
                                if b == q && !is_escaped(bytes, col) {
                                    quote = None;
                                }
                            }
                            None => {
                                if b == b'"' || b == b'\'' {
                                    quote = Some(b);
                                } else if b == b'/' && col + 1 < bytes.len() {
                                    if bytes[col + 1] == b'*' {
                                        open = Some(Loc::new(
                                            line,
                                            u32::try_from(col).unwrap_or(0),
                                        ));
                                        col += 2;
                                        continue 'line;
                                    }
                                    if bytes[col + 1] == b'/' {
                                        // Rest of the line is a line comment.
                                        break 'line;
                                    }
                                }
                            }
                        }
                        col += 1;
                    }
                    break 'line;
                }
            }
        }

        LexicalIndex { src, blocks }
    }

    /// All block-comment spans, ordered by start.
    pub fn block_comment_spans(&self) -> &[Span] {
        &self.blocks
    }

    /// The block-comment span covering `loc`, delimiters included.
    pub fn block_comment_at(&self, loc: Loc) -> Option<Span> {
        let idx = self.blocks.partition_point(|s| s.start <= loc);
        if idx == 0 {
            return None;
        }
        let span = self.blocks[idx - 1];
        span.contains(loc).then_some(span)
    }

    /// Returns `true` if `loc` falls in a block comment, delimiters included.
    pub fn in_block_comment(&self, loc: Loc) -> bool {
        self.block_comment_at(loc).is_some()
    }

    /// Returns `true` if `loc` is comment text: inside a block comment or
    /// behind an unquoted `//` on the same line.
    pub fn in_comment(&self, loc: Loc) -> bool {
        self.in_block_comment(loc) || self.scan_line(loc.line).commented_at(loc.col)
    }

    /// Scan one line for quote spans and a line-comment start.
    ///
    /// Positions covered by block-comment spans are skipped entirely, so an
    /// apostrophe in `/* don't */` never opens a character literal.
    pub fn scan_line(&self, line: u32) -> LineScan {
        let bytes = self.src.line(line).as_bytes();
        let mut quotes = Vec::new();
        let mut comment = None;
        let mut quote_open: Option<(u32, u8)> = None;

        let mut col = 0usize;
        while col < bytes.len() {
            let here = u32::try_from(col).unwrap_or(u32::MAX);
            if self.in_block_comment(Loc::new(line, here)) {
                col += 1;
                continue;
            }
            let b = bytes[col];
            match quote_open {
                Some((start, q)) => {
                    if b == q && !is_escaped(bytes, col) {
                        quotes.push((start, here, q));
                        quote_open = None;
                    }
                }
                None => {
                    if b == b'"' || b == b'\'' {
                        quote_open = Some((here, b));
                    } else if b == b'/' && col + 1 < bytes.len() && bytes[col + 1] == b'/' {
                        comment = Some(here);
                        break;
                    }
                }
            }
            col += 1;
        }

        // An unclosed quote produces no span; multi-line strings are not
        // legal in the sources this tool targets.
        LineScan { quotes, comment }
    }

    /// Returns `true` if `loc` must be skipped by a structural scan:
    /// inside a comment or inside a quoted literal.
    ///
    /// Takes the line's [`LineScan`] so walkers that visit many columns of
    /// one line can reuse a single scan.
    pub fn guarded(&self, scan: &LineScan, loc: Loc) -> bool {
        self.in_block_comment(loc) || scan.commented_at(loc.col) || scan.quoted_at(loc.col)
    }
}

/// Result of scanning one line: closed quote spans and the line-comment
/// start, if any.
#[derive(Clone, Debug)]
pub struct LineScan {
    /// Closed quote pairs as `(open col, close col, quote byte)`.
    quotes: Vec<(u32, u32, u8)>,
    /// Column of the first `/` of an unquoted `//`, if present.
    comment: Option<u32>,
}

impl LineScan {
    /// Returns `true` if `col` is behind an unquoted `//` on this line.
    pub fn commented_at(&self, col: u32) -> bool {
        self.comment.is_some_and(|c| col >= c + 2)
    }

    /// Returns `true` if `col` is strictly inside a quoted literal.
    pub fn quoted_at(&self, col: u32) -> bool {
        self.quotes.iter().any(|&(a, b, _)| a < col && col < b)
    }

    /// Returns `true` if the inclusive column range sits strictly inside
    /// one quoted literal.
    pub fn quoted_range(&self, lo: u32, hi: u32) -> bool {
        self.quotes.iter().any(|&(a, b, _)| a < lo && hi < b)
    }

    /// Closed quote pairs on this line as `(open col, close col, quote byte)`.
    pub fn quote_spans(&self) -> &[(u32, u32, u8)] {
        &self.quotes
    }

    /// Column of the first `/` of an unquoted `//`, if present.
    pub fn comment_start(&self) -> Option<u32> {
        self.comment
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
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn index(src: &SourceFile) -> LexicalIndex<'_> {
        LexicalIndex::new(src)
    }

    // === Block-comment span construction ===

    #[test]
    fn single_line_block_comment() {
        let src = SourceFile::new("int x; /* note */ int y;");
        let idx = index(&src);
        assert_eq!(
            idx.block_comment_spans(),
            &[Span::new(Loc::new(0, 7), Loc::new(0, 16))]
        );
        assert!(idx.in_block_comment(Loc::new(0, 10)));
        assert!(!idx.in_block_comment(Loc::new(0, 18)));
    }

    #[test]
    fn multi_line_block_comment() {
        let src = SourceFile::new("/*\n * body\n */\nint x;");
        let idx = index(&src);
        assert_eq!(
            idx.block_comment_spans(),
            &[Span::new(Loc::new(0, 0), Loc::new(2, 2))]
        );
        assert!(idx.in_block_comment(Loc::new(1, 4)));
        assert!(!idx.in_block_comment(Loc::new(3, 0)));
    }

    #[test]
    fn two_comments_on_one_line() {
        let src = SourceFile::new("/* a */ x /* b */");
        let idx = index(&src);
        assert_eq!(idx.block_comment_spans().len(), 2);
        assert!(!idx.in_block_comment(Loc::new(0, 8)));
    }

    #[test]
    fn opener_inside_string_does_not_toggle() {
        let src = SourceFile::new("char *s = \"/* not a comment\";\nint x;");
        let idx = index(&src);
        assert!(idx.block_comment_spans().is_empty());
    }

    #[test]
    fn opener_behind_line_comment_does_not_toggle() {
        let src = SourceFile::new("int x; // see /* below\nint y;");
        let idx = index(&src);
        assert!(idx.block_comment_spans().is_empty());
    }

    #[test]
    fn nested_opener_is_ignored() {
        // C comments do not nest: the first closer ends the span.
        let src = SourceFile::new("/* outer /* inner */ int x;");
        let idx = index(&src);
        assert_eq!(
            idx.block_comment_spans(),
            &[Span::new(Loc::new(0, 0), Loc::new(0, 19))]
        );
    }

    #[test]
    fn unterminated_comment_produces_no_span() {
        let src = SourceFile::new("/* never closed\nint x;");
        let idx = index(&src);
        assert!(idx.block_comment_spans().is_empty());
    }

    // === Line scans: quotes ===

    #[test]
    fn quote_spans_on_a_line() {
        let src = SourceFile::new("f(\"ab\", 'c');");
        let scan = index(&src).scan_line(0);
        assert_eq!(scan.quote_spans(), &[(2, 5, b'"'), (8, 10, b'\'')]);
        assert!(scan.quoted_at(3));
        assert!(!scan.quoted_at(2));
        assert!(!scan.quoted_at(5));
    }

    #[test]
    fn escaped_quote_stays_open() {
        let src = SourceFile::new(r#"s = "a\"b";"#);
        let scan = index(&src).scan_line(0);
        assert_eq!(scan.quote_spans(), &[(4, 9, b'"')]);
    }

    #[test]
    fn double_backslash_closes() {
        let src = SourceFile::new(r#"s = "a\\";"#);
        let scan = index(&src).scan_line(0);
        assert_eq!(scan.quote_spans(), &[(4, 8, b'"')]);
    }

    #[test]
    fn brace_char_literal_is_quoted() {
        let src = SourceFile::new("case '{':");
        let scan = index(&src).scan_line(0);
        assert!(scan.quoted_at(6));
    }

    // === Line scans: comments ===

    #[test]
    fn line_comment_start_found() {
        let src = SourceFile::new("int x; // trailing");
        let scan = index(&src).scan_line(0);
        assert_eq!(scan.comment_start(), Some(7));
        assert!(scan.commented_at(9));
        assert!(!scan.commented_at(7));
        assert!(!scan.commented_at(3));
    }

    #[test]
    fn slashes_inside_string_are_not_a_comment() {
        let src = SourceFile::new("s = \"http://example\"; x = 1;");
        let scan = index(&src).scan_line(0);
        assert_eq!(scan.comment_start(), None);
    }

    #[test]
    fn apostrophe_in_block_comment_is_skipped() {
        let src = SourceFile::new("/* don't */ x = '{';");
        let idx = index(&src);
        let scan = idx.scan_line(0);
        assert_eq!(scan.quote_spans(), &[(16, 18, b'\'')]);
    }

    #[test]
    fn in_comment_covers_both_forms() {
        let src = SourceFile::new("/* a */ x // b");
        let idx = index(&src);
        assert!(idx.in_comment(Loc::new(0, 3)));
        assert!(idx.in_comment(Loc::new(0, 13)));
        assert!(!idx.in_comment(Loc::new(0, 8)));
    }

    // === Properties ===

    proptest! {
        /// Scanning arbitrary ASCII never panics and yields ordered,
        /// non-overlapping quote spans.
        #[test]
        fn scan_line_is_total(text in "[ -~]{0,60}") {
            let src = SourceFile::new(&text);
            if src.line_count() == 1 {
                let idx = LexicalIndex::new(&src);
                let scan = idx.scan_line(0);
                let spans = scan.quote_spans();
                for w in spans.windows(2) {
                    prop_assert!(w[0].1 < w[1].0);
                }
                for &(a, b, _) in spans {
                    prop_assert!(a < b);
                }
            }
        }

        /// Block-comment spans are ordered and non-overlapping across the
        /// whole file.
        #[test]
        fn block_spans_are_ordered(text in "[ -~\n]{0,120}") {
            let src = SourceFile::new(&text);
            let idx = LexicalIndex::new(&src);
            let spans = idx.block_comment_spans();
            for w in spans.windows(2) {
                prop_assert!(w[0].end < w[1].start);
            }
        }
    }
}
