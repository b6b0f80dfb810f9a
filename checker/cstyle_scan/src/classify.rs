//! Block classification: "what construct starts here".
//!
//! Decision order, first match wins: blank run, line comment, block
//! comment, control keyword (conditional / branch / case label), directive,
//! then terminator-driven fallback (function definition, brace aggregate,
//! plain statement). Everything is located positionally: a keyword or
//! delimiter inside a quote or comment never participates.

use cstyle_source::Loc;

use crate::block::{
    Block, BlockKind, Conditional, DoWhile, Function, SwitchCase, Terminator, Unconditional,
};
use crate::keyword::{Keyword, KeywordClass, KeywordMatch, TermHit};
use crate::{patterns, ScanError, Scanner};

impl Scanner<'_> {
    /// Classify the construct starting at `line`.
    ///
    /// `line` must be in range. Fails only when required structure (a
    /// matching delimiter, a terminator, a comment closer) cannot be found
    /// before end of file: fatal for the run.
    pub fn classify(&self, line: u32) -> Result<Block, ScanError> {
        let n = self.src.line_count();
        debug_assert!(line < n, "classify called past end of file");

        // Blank run: absorb all immediately following blank lines.
        if self.src.is_blank(line) {
            let mut last = line;
            while last + 1 < n && self.src.is_blank(last + 1) {
                last += 1;
            }
            return Ok(Block::new(line, last, BlockKind::BlankRun));
        }

        let trimmed = self.src.line(line).trim_start();

        if trimmed.starts_with("//") {
            return Ok(Block::new(line, line, BlockKind::LineComment));
        }

        if trimmed.starts_with("/*") {
            let opener = Loc::new(line, self.src.indent_of(line));
            let span = self
                .index
                .block_comment_at(opener)
                .ok_or_else(|| ScanError::unterminated_comment(line))?;
            return Ok(Block::new(line, span.end.line, BlockKind::BlockComment { span }));
        }

        if let Some(m) = self.find_keyword(line, 0) {
            match m.keyword.class() {
                KeywordClass::Conditional => return self.classify_conditional(line, m),
                KeywordClass::Unconditional => return self.classify_unconditional(line, m),
                KeywordClass::CaseLabel => return self.classify_switch_case(line, m),
                // break/continue classify through the statement path below.
                KeywordClass::Other => {}
            }
        }

        if patterns::is_directive(self.src.line(line)) {
            let mut last = line;
            while last + 1 < n && self.src.line(last).trim_end().ends_with('\\') {
                last += 1;
            }
            return Ok(Block::new(line, last, BlockKind::Directive));
        }

        // Plain statement, aggregate, or function definition.
        let hit = self
            .find_terminator(Loc::new(line, 0), b"{;", false)
            .ok_or_else(|| ScanError::missing_terminator(line))?;
        let (byte, tloc) = match hit {
            TermHit::Byte(b, l) => (b, l),
            // Lookahead is off here; keyword hits cannot occur.
            TermHit::Keyword(m) => return Err(ScanError::missing_terminator(m.loc.line)),
        };

        let joined: String = (line..=tloc.line).map(|l| self.src.line(l)).collect();
        if patterns::is_function_signature(&joined) && !patterns::is_function_declaration(&joined) {
            return self.classify_function(line, byte, tloc);
        }

        if byte == b'{' {
            let braces = self.match_pair(tloc)?;
            return Ok(Block::new(line, braces.end.line, BlockKind::Aggregate { braces }));
        }
        Ok(Block::new(line, tloc.line, BlockKind::Statement { terminator: tloc }))
    }

    /// Conditional: locate the condition parens, then the terminator with
    /// keyword lookahead so dangling nested bodies are detected.
    fn classify_conditional(&self, line: u32, m: KeywordMatch) -> Result<Block, ScanError> {
        let popen = self
            .find_unguarded(b'(', m.loc)
            .ok_or_else(|| ScanError::missing_condition(line))?;
        let cond = self.match_pair(popen)?;

        let hit = self
            .find_terminator(cond.end, b"{;", true)
            .ok_or_else(|| ScanError::missing_terminator(line))?;
        let (terminator, last) = self.resolve_terminator(hit)?;

        Ok(Block::new(
            line,
            last,
            BlockKind::Conditional(Conditional {
                keyword: m.keyword,
                keyword_loc: m.loc,
                cond,
                terminator,
                prev_brace: self.brace_left_of(m.loc),
            }),
        ))
    }

    /// Unconditional branch: `else` follows the conditional terminator
    /// logic; `do` must additionally locate its trailing `while (...);`.
    fn classify_unconditional(&self, line: u32, m: KeywordMatch) -> Result<Block, ScanError> {
        let hit = self
            .find_terminator(Loc::new(line, 0), b"{;", true)
            .ok_or_else(|| ScanError::missing_terminator(line))?;

        if m.keyword == Keyword::Do {
            let TermHit::Byte(b'{', brace) = hit else {
                return Err(ScanError::malformed_do(line));
            };
            let braces = self.match_pair(brace)?;
            let semi = self
                .find_terminator(braces.end, b"{;", false)
                .ok_or_else(|| ScanError::missing_terminator(braces.end.line))?
                .loc();
            let while_loc = self
                .find_keyword(braces.end.line, braces.end.col)
                .and_then(|k| (k.keyword == Keyword::While).then_some(k.loc));
            return Ok(Block::new(
                line,
                semi.line,
                BlockKind::Unconditional(Unconditional {
                    keyword: m.keyword,
                    keyword_loc: m.loc,
                    terminator: Terminator::Braces(braces),
                    do_while: Some(DoWhile {
                        while_loc,
                        semicolon: semi,
                    }),
                    prev_brace: None,
                }),
            ));
        }

        let (terminator, last) = self.resolve_terminator(hit)?;
        Ok(Block::new(
            line,
            last,
            BlockKind::Unconditional(Unconditional {
                keyword: m.keyword,
                keyword_loc: m.loc,
                terminator,
                do_while: None,
                prev_brace: self.brace_left_of(m.loc),
            }),
        ))
    }

    /// Case label: find the colon, probe for an explicit brace scope, and
    /// otherwise run to the next label or the switch's closing brace.
    fn classify_switch_case(&self, line: u32, m: KeywordMatch) -> Result<Block, ScanError> {
        let n = self.src.line_count();
        let colon = self
            .find_terminator(Loc::new(line, 0), b":", false)
            .ok_or_else(|| ScanError::missing_terminator(line))?
            .loc();
        let after = Loc::new(colon.line, colon.col + 1);

        // Explicit scope: an unguarded `{` after the colon before any
        // statement terminator or keyword/label.
        let scope = match self.find_terminator(after, b"{;", true) {
            Some(TermHit::Byte(b'{', t)) => Some(self.match_pair(t)?),
            _ => None,
        };
        let case = SwitchCase {
            keyword: m.keyword,
            keyword_loc: m.loc,
            colon,
            scope,
        };
        if let Some(sc) = scope {
            return Ok(Block::new(line, sc.end.line, BlockKind::SwitchCase(case)));
        }

        // Fallthrough scope: depth starts at 1 because we are inside the
        // switch body. The label line's own remainder is depth-counted too.
        let mut depth: u32 = 1;
        for ln in colon.line..n {
            if ln != colon.line
                && patterns::is_case_label(self.src.line(ln))
                && self
                    .find_keyword(ln, 0)
                    .is_some_and(|k| k.keyword.class() == KeywordClass::CaseLabel)
            {
                // Next label: this case ends on the previous line.
                return Ok(Block::new(line, ln - 1, BlockKind::SwitchCase(case)));
            }

            let lo = if ln == colon.line {
                (colon.col + 1) as usize
            } else {
                0
            };
            let bytes = self.src.line(ln).as_bytes();
            let scan = self.index.scan_line(ln);
            for col in lo..bytes.len() {
                let loc = Loc::new(ln, u32::try_from(col).unwrap_or(u32::MAX));
                if self.index.guarded(&scan, loc) {
                    continue;
                }
                match bytes[col] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            // Include the switch's closing-brace line only
                            // when statements precede the brace.
                            let before = self.src.text_before(ln, loc.col);
                            let last = if before.trim().is_empty() { ln - 1 } else { ln };
                            return Ok(Block::new(line, last, BlockKind::SwitchCase(case)));
                        }
                    }
                    _ => {}
                }
            }
        }

        // End of file ends the case leniently.
        Ok(Block::new(line, n - 1, BlockKind::SwitchCase(case)))
    }

    /// Function definition: force the search for the body brace (old-style
    /// parameter declarations put a `;` before it) and capture the
    /// parameter-list span.
    fn classify_function(&self, line: u32, byte: u8, tloc: Loc) -> Result<Block, ScanError> {
        let brace = if byte == b'{' {
            tloc
        } else {
            match self.find_terminator(tloc, b"{", false) {
                Some(hit) => hit.loc(),
                None => return Err(ScanError::missing_terminator(tloc.line)),
            }
        };
        let braces = self.match_pair(brace)?;
        let popen = self
            .find_unguarded(b'(', Loc::new(line, 0))
            .ok_or_else(|| ScanError::missing_condition(line))?;
        let params = self.match_pair(popen)?;
        Ok(Block::new(
            line,
            braces.end.line,
            BlockKind::Function(Function { params, braces }),
        ))
    }

    /// Map a terminator hit to the block terminator and last line.
    fn resolve_terminator(&self, hit: TermHit) -> Result<(Terminator, u32), ScanError> {
        match hit {
            TermHit::Byte(b'{', t) => {
                let braces = self.match_pair(t)?;
                Ok((Terminator::Braces(braces), braces.end.line))
            }
            TermHit::Byte(_, t) => Ok((Terminator::Semicolon(t), t.line)),
            TermHit::Keyword(km) => Ok((Terminator::Keyword(km.keyword, km.loc), km.loc.line)),
        }
    }

    /// The closing brace immediately left of `loc` (whitespace between is
    /// fine), for `} else`-style adjacency checks.
    fn brace_left_of(&self, loc: Loc) -> Option<Loc> {
        let bytes = self.src.line(loc.line).as_bytes();
        let mut col = loc.col as usize;
        while col > 0 {
            col -= 1;
            match bytes[col] {
                b' ' | b'\t' => {}
                b'}' => return Some(Loc::new(loc.line, u32::try_from(col).unwrap_or(0))),
                _ => return None,
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
    use cstyle_source::{LexicalIndex, SourceFile, Span};
    use pretty_assertions::assert_eq;

    fn classify_at(text: &str, line: u32) -> Block {
        let src = SourceFile::new(text);
        let index = LexicalIndex::new(&src);
        let scanner = Scanner::new(&src, &index);
        scanner.classify(line).expect("classification succeeds")
    }

    fn classify_err(text: &str, line: u32) -> ScanError {
        let src = SourceFile::new(text);
        let index = LexicalIndex::new(&src);
        let scanner = Scanner::new(&src, &index);
        scanner.classify(line).expect_err("classification fails")
    }

    // === Blanks and comments ===

    #[test]
    fn blank_run_absorbs_following_blanks() {
        let b = classify_at("x;\n\n \n\t\ny;", 1);
        assert_eq!((b.first_line, b.last_line), (1, 3));
        assert_eq!(b.kind, BlockKind::BlankRun);
    }

    #[test]
    fn line_comment_is_single_line() {
        let b = classify_at("  // note\nx;", 0);
        assert_eq!((b.first_line, b.last_line), (0, 0));
        assert_eq!(b.kind, BlockKind::LineComment);
    }

    #[test]
    fn block_comment_extends_to_closer() {
        let b = classify_at("/*\n * body\n */\nx;", 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
        assert_eq!(
            b.kind,
            BlockKind::BlockComment {
                span: Span::new(Loc::new(0, 0), Loc::new(2, 2))
            }
        );
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = classify_err("/* never closed\nx;", 0);
        assert_eq!(err, ScanError::UnterminatedComment { line: 1 });
    }

    // === Conditionals ===

    #[test]
    fn braced_if_spans_its_body() {
        let b = classify_at("if (x) {\n  y = 1;\n}", 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
        let BlockKind::Conditional(c) = b.kind else {
            panic!("expected conditional, got {:?}", b.kind);
        };
        assert_eq!(c.keyword, Keyword::If);
        assert_eq!(c.cond, Span::new(Loc::new(0, 3), Loc::new(0, 5)));
        assert_eq!(
            c.terminator,
            Terminator::Braces(Span::new(Loc::new(0, 7), Loc::new(2, 0)))
        );
    }

    #[test]
    fn braceless_if_ends_at_semicolon() {
        let b = classify_at("if (x)\n  y = 1;\nz = 2;", 0);
        assert_eq!((b.first_line, b.last_line), (0, 1));
        let BlockKind::Conditional(c) = b.kind else {
            panic!("expected conditional");
        };
        assert_eq!(c.terminator, Terminator::Semicolon(Loc::new(1, 7)));
    }

    #[test]
    fn dangling_nested_if_terminates_at_keyword() {
        let b = classify_at("if (a)\n  if (b)\n    x = 1;", 0);
        let BlockKind::Conditional(c) = b.kind else {
            panic!("expected conditional");
        };
        assert_eq!(c.terminator, Terminator::Keyword(Keyword::If, Loc::new(1, 2)));
        assert_eq!(b.last_line, 1);
    }

    #[test]
    fn multi_line_condition_is_spanned() {
        let b = classify_at("while (a &&\n       b) {\n  x;\n}", 0);
        let BlockKind::Conditional(c) = b.kind else {
            panic!("expected conditional");
        };
        assert_eq!(c.cond.start, Loc::new(0, 6));
        assert_eq!(c.cond.end, Loc::new(1, 8));
        assert_eq!(b.last_line, 3);
    }

    #[test]
    fn else_if_chain_records_previous_brace() {
        let b = classify_at("} else if (x) {\n  y;\n}", 0);
        let BlockKind::Conditional(c) = b.kind else {
            panic!("expected conditional");
        };
        assert_eq!(c.keyword, Keyword::ElseIf);
        assert_eq!(c.prev_brace, Some(Loc::new(0, 0)));
    }

    #[test]
    fn condition_without_parens_is_fatal() {
        let err = classify_err("if x\n  y;\n", 0);
        assert_eq!(err, ScanError::MissingCondition { line: 1 });
    }

    // === Unconditionals ===

    #[test]
    fn else_with_braces() {
        let b = classify_at("} else {\n  y;\n}", 0);
        let BlockKind::Unconditional(u) = b.kind else {
            panic!("expected unconditional");
        };
        assert_eq!(u.keyword, Keyword::Else);
        assert_eq!(u.prev_brace, Some(Loc::new(0, 0)));
        assert!(u.terminator.uses_braces());
        assert_eq!(b.last_line, 2);
    }

    #[test]
    fn do_while_includes_trailing_condition() {
        let b = classify_at("do {\n  x--;\n} while (x > LIMIT);", 0);
        let BlockKind::Unconditional(u) = b.kind else {
            panic!("expected unconditional");
        };
        assert_eq!(u.keyword, Keyword::Do);
        let dw = u.do_while.expect("do-while metadata");
        assert_eq!(dw.while_loc, Some(Loc::new(2, 2)));
        assert_eq!(dw.semicolon, Loc::new(2, 19));
        assert_eq!(b.last_line, 2);
    }

    // === Switch cases ===

    #[test]
    fn case_runs_to_next_label() {
        let text = "case 0:\n  f();\n  break;\ncase 1:\n  g();\n}";
        let b = classify_at(text, 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
        let BlockKind::SwitchCase(sc) = b.kind else {
            panic!("expected switch case");
        };
        assert_eq!(sc.keyword, Keyword::Case);
        assert_eq!(sc.colon, Loc::new(0, 6));
        assert_eq!(sc.scope, None);
    }

    #[test]
    fn last_case_stops_at_switch_close() {
        let text = "default:\n  g();\n  break;\n}";
        let b = classify_at(text, 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
    }

    #[test]
    fn case_with_statements_on_close_line_includes_it() {
        let text = "default: g(); }";
        let b = classify_at(text, 0);
        assert_eq!((b.first_line, b.last_line), (0, 0));
    }

    #[test]
    fn case_with_explicit_scope() {
        let text = "case 0: {\n  int t = v;\n  break;\n}\ncase 1:\n  g();\n}";
        let b = classify_at(text, 0);
        assert_eq!((b.first_line, b.last_line), (0, 3));
        let BlockKind::SwitchCase(sc) = b.kind else {
            panic!("expected switch case");
        };
        assert_eq!(
            sc.scope,
            Some(Span::new(Loc::new(0, 8), Loc::new(3, 0)))
        );
    }

    #[test]
    fn case_value_with_brace_char_literal() {
        let text = "case '{':\n  depth++;\n  break;\ncase '}':\n  depth--;\n}";
        let b = classify_at(text, 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
    }

    // === Directives ===

    #[test]
    fn directive_is_single_line() {
        let b = classify_at("#include <stdio.h>\nint x;", 0);
        assert_eq!((b.first_line, b.last_line), (0, 0));
        assert_eq!(b.kind, BlockKind::Directive);
    }

    #[test]
    fn continued_directive_spans_lines() {
        let b = classify_at("#define TWICE(x) \\\n  ((x) + (x))\nint y;", 0);
        assert_eq!((b.first_line, b.last_line), (0, 1));
        assert_eq!(b.kind, BlockKind::Directive);
    }

    // === Statements, aggregates, functions ===

    #[test]
    fn plain_statement_ends_at_semicolon() {
        let b = classify_at("x = y + z;\nnext();", 0);
        assert_eq!((b.first_line, b.last_line), (0, 0));
        assert_eq!(
            b.kind,
            BlockKind::Statement {
                terminator: Loc::new(0, 9)
            }
        );
    }

    #[test]
    fn trailing_comment_does_not_affect_classification() {
        let b = classify_at("int x = 5; // if (x) { }", 0);
        assert_eq!((b.first_line, b.last_line), (0, 0));
        assert!(matches!(b.kind, BlockKind::Statement { .. }));
    }

    #[test]
    fn break_statement_is_a_statement() {
        let b = classify_at("break;", 0);
        assert!(matches!(b.kind, BlockKind::Statement { .. }));
    }

    #[test]
    fn struct_definition_is_an_aggregate() {
        let b = classify_at("struct point {\n  int x;\n  int y;\n};", 0);
        assert_eq!((b.first_line, b.last_line), (0, 3));
        let BlockKind::Aggregate { braces } = b.kind else {
            panic!("expected aggregate");
        };
        assert_eq!(braces, Span::new(Loc::new(0, 13), Loc::new(3, 0)));
    }

    #[test]
    fn function_definition_captures_params_and_body() {
        let b = classify_at("int add(int a, int b) {\n  return a + b;\n}", 0);
        assert_eq!((b.first_line, b.last_line), (0, 2));
        let BlockKind::Function(f) = b.kind else {
            panic!("expected function");
        };
        assert_eq!(f.params, Span::new(Loc::new(0, 7), Loc::new(0, 20)));
        assert_eq!(f.braces, Span::new(Loc::new(0, 22), Loc::new(2, 0)));
    }

    #[test]
    fn function_declaration_is_a_statement() {
        let b = classify_at("int add(int a, int b);\nint x;", 0);
        assert!(matches!(b.kind, BlockKind::Statement { .. }));
    }

    #[test]
    fn old_style_definition_finds_its_brace() {
        let b = classify_at("int f(c)\nint c;\n{\n  return c;\n}", 0);
        let BlockKind::Function(f) = b.kind else {
            panic!("expected function");
        };
        assert_eq!(f.braces, Span::new(Loc::new(2, 0), Loc::new(4, 0)));
        assert_eq!(b.last_line, 4);
    }

    #[test]
    fn unmatched_brace_is_fatal() {
        let err = classify_err("int f(void) {\n  x = 1;\n", 0);
        assert_eq!(
            err,
            ScanError::Unbalanced {
                open: '{',
                close: '}',
                line: 1
            }
        );
    }
}
