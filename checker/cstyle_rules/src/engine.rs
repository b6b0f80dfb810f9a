//! The checker: classify-then-dispatch over the whole file.
//!
//! Each per-kind handler checks the block's own indentation, recurses into
//! any owned body at one indent unit deeper, validates trailing content
//! around terminators and closing braces, and returns the next unconsumed
//! line. Chained branches (`if {...} else {...}`) are handled by returning
//! control to the caller at the closing-brace line instead of advancing
//! past it.

use std::io;

use cstyle_scan::{
    Block, BlockKind, Conditional, Function, Keyword, KeywordClass, Scanner, SwitchCase,
    Terminator, Unconditional,
};
use cstyle_source::{LexicalIndex, Loc, SourceFile, Span, TAB_WIDTH};
use tracing::{debug, trace};

use crate::comments;
use crate::config::{CheckConfig, RunOptions};
use crate::diagnostics::Emitter;
use crate::magic;
use crate::CheckError;

/// Maximum line length before a diagnostic.
const LINE_LIMIT: usize = 80;
/// Longest permitted run of blank lines.
const NEWLINES_LIMIT: u32 = 2;

/// How a group of lines must sit relative to the expected column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IndentMode {
    /// First line exact, continuation lines at least the expected column.
    FirstExact,
    /// Every line exact.
    AllExact,
    /// Every line at least the expected column.
    AtLeast,
}

/// One checking run over one file.
pub struct Checker<'a, W: io::Write> {
    scanner: Scanner<'a>,
    src: &'a SourceFile,
    index: &'a LexicalIndex<'a>,
    cfg: CheckConfig,
    out: Emitter<W>,
}

impl<'a, W: io::Write> Checker<'a, W> {
    /// Build a checker. Runs the initialization pass (indent-unit and
    /// case-convention detection) and applies any override, so it can
    /// already fail on unparseable structure.
    pub fn new(
        src: &'a SourceFile,
        index: &'a LexicalIndex<'a>,
        options: &RunOptions,
        out: W,
    ) -> Result<Self, CheckError> {
        let scanner = Scanner::new(src, index);
        let indent_unit = detect_indent_unit(&scanner, src)?;
        let case_indent = detect_case_indent(&scanner, src, indent_unit);

        let mut cfg = CheckConfig {
            indent_unit,
            case_indent,
            check_whitespace: options.check_whitespace,
            strict: options.strict,
        };
        if let Some(unit) = options.indent_override {
            cfg.indent_unit = unit;
            if cfg.case_indent != 0 {
                cfg.case_indent = unit;
            }
        }
        debug!(
            indent_unit = cfg.indent_unit,
            case_indent = cfg.case_indent,
            "indentation conventions established"
        );

        Ok(Checker {
            scanner,
            src,
            index,
            cfg,
            out: Emitter::new(out),
        })
    }

    /// The indent unit in effect (auto-detected or overridden).
    pub fn indent_unit(&self) -> u32 {
        self.cfg.indent_unit
    }

    /// List every file-scope function definition: 1-based line number and
    /// the signature's first line.
    pub fn print_headers(&mut self) -> Result<(), CheckError> {
        let n = self.src.line_count();
        let mut i = 0;
        while i < n {
            let block = self.scanner.classify(i)?;
            if matches!(block.kind, BlockKind::Function(_)) {
                let text = self.src.line(block.first_line).trim();
                self.out
                    .line(&format!("Line {}: {text}", block.first_line + 1))?;
            }
            i = block.last_line + 1;
        }
        Ok(())
    }

    /// Check the whole file. Returns the number of diagnostics emitted.
    pub fn run(&mut self) -> Result<usize, CheckError> {
        self.check_line_limit()?;

        let n = self.src.line_count();
        let mut i = 0;
        while i < n {
            let block = self.scanner.classify(i)?;
            trace!(first = block.first_line, last = block.last_line, "classified block");
            // File scope: magic-literal checks only apply inside bodies.
            i = self.handle(&block, 0, false)?;
        }
        Ok(self.out.count())
    }

    // === Dispatch ===

    /// Handle one block at the given indent column; returns the next
    /// unconsumed line.
    fn handle(&mut self, b: &Block, indent: u32, check_magic: bool) -> Result<u32, CheckError> {
        match &b.kind {
            BlockKind::BlankRun => self.blank_run(b),
            BlockKind::LineComment => self.line_comment(b, indent, false),
            BlockKind::BlockComment { span } => self.block_comment(b, *span, indent, false),
            BlockKind::Directive => self.directive(b, indent),
            BlockKind::Conditional(c) => self.conditional(b, c, indent),
            BlockKind::Unconditional(u) => self.unconditional(b, u, indent),
            BlockKind::Function(f) => self.function(b, f, indent),
            BlockKind::Statement { .. } => self.statement(b, indent, check_magic),
            BlockKind::Aggregate { braces } => self.aggregate(b, *braces, indent, check_magic),
            BlockKind::SwitchCase(sc) => self.switch_case(b, sc, indent),
        }
    }

    // === Per-kind handlers ===

    fn blank_run(&mut self, b: &Block) -> Result<u32, CheckError> {
        self.blank_whitespace(b.first_line, b.last_line)?;
        if b.line_count() > NEWLINES_LIMIT {
            self.out.group(
                b.first_line,
                b.last_line,
                &format!("Excess newlines. More than the newline limit ({NEWLINES_LIMIT})"),
            )?;
        }
        Ok(b.last_line + 1)
    }

    fn line_comment(&mut self, b: &Block, expected: u32, relaxed: bool) -> Result<u32, CheckError> {
        let mode = if relaxed {
            IndentMode::AtLeast
        } else {
            IndentMode::FirstExact
        };
        self.check_indent(b.first_line, b.first_line, expected, mode)?;

        let text = self.src.line(b.first_line);
        let stripped = text.trim_start().trim_start_matches('/');
        if comments::looks_like_code(stripped) {
            self.out.group(b.first_line, b.first_line, "Commented out code")?;
            self.print_lines(b.first_line, b.first_line)?;
        }
        if comments::is_todo_line_comment(text) {
            self.out
                .group(b.first_line, b.first_line, "Left in TODO comment")?;
            self.print_lines(b.first_line, b.first_line)?;
        }
        Ok(b.first_line + 1)
    }

    fn block_comment(
        &mut self,
        b: &Block,
        span: Span,
        indent: u32,
        relaxed: bool,
    ) -> Result<u32, CheckError> {
        if relaxed {
            // Inside a switch body the comment only has to clear the
            // label column (the permissive convention).
            self.check_indent(b.first_line, b.last_line, indent, IndentMode::AtLeast)?;
        } else {
            // First line exact; continuation lines line their `*` up under
            // the opener, one column deeper. Blank interior lines are fine.
            let mut bad = false;
            for ln in b.first_line..=b.last_line {
                if self.src.is_blank(ln) {
                    continue;
                }
                let expected = if ln == b.first_line { indent } else { indent + 1 };
                if self.src.indent_of(ln) != expected {
                    bad = true;
                }
            }
            if bad {
                self.out
                    .group(b.first_line, b.last_line, "Inconsistent Indentation")?;
                self.print_lines(b.first_line, b.last_line)?;
            }
        }

        for ln in b.first_line..=b.last_line {
            if comments::block_comment_line_has_todo(self.src.line(ln)) {
                self.out.group(ln, ln, "Left in TODO comment")?;
                self.print_lines(ln, ln)?;
            }
        }

        self.check_trailing(span.end.line, span.end.col, "*/")?;
        Ok(b.last_line + 1)
    }

    fn directive(&mut self, b: &Block, indent: u32) -> Result<u32, CheckError> {
        self.check_indent(b.first_line, b.last_line, indent, IndentMode::FirstExact)?;
        Ok(b.last_line + 1)
    }

    fn statement(&mut self, b: &Block, indent: u32, check_magic: bool) -> Result<u32, CheckError> {
        self.check_indent(b.first_line, b.last_line, indent, IndentMode::FirstExact)?;
        if check_magic {
            self.check_magic(b.first_line, b.last_line)?;
        }
        Ok(b.last_line + 1)
    }

    fn aggregate(
        &mut self,
        b: &Block,
        braces: Span,
        indent: u32,
        check_magic: bool,
    ) -> Result<u32, CheckError> {
        self.check_indent(b.first_line, b.first_line, indent, IndentMode::AllExact)?;
        if b.first_line == b.last_line {
            return Ok(b.last_line + 1);
        }

        self.check_trailing(braces.start.line, braces.start.col, "{")?;

        let mut i = braces.start.line + 1;
        while i < self.src.line_count() && i < b.last_line {
            let nb = self.scanner.classify(i)?;
            i = self.handle(&nb, indent + self.cfg.indent_unit, check_magic)?;
        }

        self.check_leading(braces.end, indent)?;
        Ok(b.last_line + 1)
    }

    fn function(&mut self, b: &Block, f: &Function, indent: u32) -> Result<u32, CheckError> {
        let brace = f.braces.start;
        self.check_magic(b.first_line, brace.line)?;
        self.brace_open_indent(b.first_line, brace, indent)?;

        let mut i = brace.line + 1;
        while i < self.src.line_count() && i < b.last_line {
            let nb = self.scanner.classify(i)?;
            i = self.handle(&nb, indent + self.cfg.indent_unit, true)?;
        }

        self.check_indent(b.last_line, b.last_line, indent, IndentMode::AllExact)?;
        Ok(b.last_line + 1)
    }

    fn conditional(&mut self, b: &Block, c: &Conditional, indent: u32) -> Result<u32, CheckError> {
        let is_switch = c.keyword == Keyword::Switch;
        self.check_magic(b.first_line, c.cond.end.line)?;

        if self.cfg.strict {
            self.strict_branch_spacing(c.keyword, c.keyword_loc, c.prev_brace)?;
            self.strict_body_braces(b.first_line, &c.terminator, Some(c.cond.end))?;
        }

        match c.terminator {
            Terminator::Braces(braces) => {
                self.brace_open_indent(b.first_line, braces.start, indent)?;
                self.check_trailing(braces.start.line, braces.start.col, "{")?;

                let mut i = braces.start.line + 1;
                while i < self.src.line_count() && i < b.last_line {
                    let nb = self.scanner.classify(i)?;
                    i = if is_switch {
                        self.switch_body_member(&nb, indent)?
                    } else {
                        self.handle(&nb, indent + self.cfg.indent_unit, true)?
                    };
                }

                self.check_leading(braces.end, indent)?;
                self.close_with_chain(b, braces.end)
            }
            Terminator::Semicolon(t) => {
                self.dangling_body(t.line, indent, t.line == b.first_line, false)
            }
            Terminator::Keyword(_, loc) => self.dangling_body(loc.line, indent, false, true),
        }
    }

    fn unconditional(
        &mut self,
        b: &Block,
        u: &Unconditional,
        indent: u32,
    ) -> Result<u32, CheckError> {
        if self.cfg.strict {
            self.strict_branch_spacing(u.keyword, u.keyword_loc, u.prev_brace)?;
            self.strict_body_braces(b.first_line, &u.terminator, None)?;
        }

        match u.terminator {
            Terminator::Braces(braces) => {
                self.brace_open_indent(b.first_line, braces.start, indent)?;
                self.check_trailing(braces.start.line, braces.start.col, "{")?;

                let mut i = braces.start.line + 1;
                while i < self.src.line_count() && i < b.last_line {
                    let nb = self.scanner.classify(i)?;
                    i = self.handle(&nb, indent + self.cfg.indent_unit, true)?;
                }

                self.check_leading(braces.end, indent)?;
                if u.keyword == Keyword::Do {
                    // The `} while (...);` trailer owns the closing line; its
                    // condition still gets the magic check.
                    self.check_magic(braces.end.line, braces.end.line)?;
                    Ok(b.last_line + 1)
                } else {
                    self.close_with_chain(b, braces.end)
                }
            }
            Terminator::Semicolon(t) => {
                self.dangling_body(t.line, indent, t.line == b.first_line, false)
            }
            Terminator::Keyword(_, loc) => self.dangling_body(loc.line, indent, false, true),
        }
    }

    fn switch_case(&mut self, b: &Block, sc: &SwitchCase, switch_indent: u32) -> Result<u32, CheckError> {
        let label_indent = switch_indent + self.cfg.case_indent;
        self.check_indent(b.first_line, b.first_line, label_indent, IndentMode::AllExact)?;
        let body_indent = label_indent + self.cfg.indent_unit;

        match sc.scope {
            Some(braces) => {
                if braces.start.line == sc.colon.line {
                    if self.cfg.strict {
                        self.strict_gap(sc.colon, braces.start, ":", "{")?;
                    }
                } else {
                    self.check_trailing(sc.colon.line, sc.colon.col, ":")?;
                }
                self.check_trailing(braces.start.line, braces.start.col, "{")?;

                let mut i = braces.start.line + 1;
                while i < self.src.line_count() && i < braces.end.line {
                    let nb = self.scanner.classify(i)?;
                    i = self.case_body_member(&nb, body_indent)?;
                }

                self.check_leading(braces.end, label_indent)?;
                self.check_trailing(braces.end.line, braces.end.col, "}")?;
                Ok(b.last_line + 1)
            }
            None => {
                self.check_trailing(sc.colon.line, sc.colon.col, ":")?;

                let mut i = sc.colon.line + 1;
                while i < self.src.line_count() && i <= b.last_line {
                    let nb = self.scanner.classify(i)?;
                    i = self.case_body_member(&nb, body_indent)?;
                }
                Ok(b.last_line + 1)
            }
        }
    }

    // === Body-loop helpers ===

    /// One block directly inside a switch body. Case labels re-enter the
    /// case handler; comments are checked relaxed against the label
    /// column; anything else is case-body content.
    fn switch_body_member(&mut self, b: &Block, switch_indent: u32) -> Result<u32, CheckError> {
        match &b.kind {
            BlockKind::SwitchCase(sc) => self.switch_case(b, sc, switch_indent),
            BlockKind::LineComment => {
                self.line_comment(b, switch_indent + self.cfg.case_indent, true)
            }
            BlockKind::BlockComment { span } => {
                self.block_comment(b, *span, switch_indent + self.cfg.case_indent, true)
            }
            _ => {
                let body = switch_indent + self.cfg.case_indent + self.cfg.indent_unit;
                self.handle(b, body, true)
            }
        }
    }

    /// One block inside a case body; comments stay relaxed there.
    fn case_body_member(&mut self, b: &Block, body_indent: u32) -> Result<u32, CheckError> {
        match &b.kind {
            BlockKind::LineComment => self.line_comment(b, body_indent, true),
            BlockKind::BlockComment { span } => self.block_comment(b, *span, body_indent, true),
            _ => self.handle(b, body_indent, true),
        }
    }

    /// Braceless body of a conditional or branch: the terminator was a
    /// semicolon (possibly on the same line) or a nested keyword.
    fn dangling_body(
        &mut self,
        line: u32,
        indent: u32,
        same_line: bool,
        is_keyword: bool,
    ) -> Result<u32, CheckError> {
        if is_keyword {
            self.check_indent(line, line, indent + self.cfg.indent_unit, IndentMode::AllExact)?;
        }
        if same_line {
            // `if (cond) stmt;` on one line: nothing left to consume.
            return Ok(line + 1);
        }
        let nb = self.scanner.classify(line)?;
        self.handle(&nb, indent + self.cfg.indent_unit, true)
    }

    /// Trailing content after a closing brace. A chained branch keyword
    /// (`} else ...`) hands control back to the caller so the chain is
    /// checked as one construct.
    fn close_with_chain(&mut self, b: &Block, close: Loc) -> Result<u32, CheckError> {
        let after = self.src.text_from(close.line, close.col + 1);
        if !after.is_empty()
            && !comments::is_comment_text(after.trim_start())
            && self.scanner.find_keyword(close.line, close.col + 1).is_some()
            && close.line > b.first_line
        {
            return Ok(b.last_line);
        }
        self.check_trailing(close.line, close.col, "}")?;
        Ok(b.last_line + 1)
    }

    // === Shared checks ===

    /// Indentation of the header lines of a brace-owning block: either the
    /// brace shares the header's last line, or it sits alone on its own
    /// line at the block's own column.
    fn brace_open_indent(&mut self, first: u32, brace: Loc, indent: u32) -> Result<(), CheckError> {
        let before = self.src.text_before(brace.line, brace.col);
        if before.trim().is_empty() && brace.line > first {
            self.check_indent(first, brace.line - 1, indent, IndentMode::FirstExact)?;
            self.check_indent(brace.line, brace.line, indent, IndentMode::AllExact)?;
        } else {
            self.check_indent(first, brace.line, indent, IndentMode::FirstExact)?;
        }
        Ok(())
    }

    fn check_indent(
        &mut self,
        first: u32,
        last: u32,
        expected: u32,
        mode: IndentMode,
    ) -> Result<(), CheckError> {
        let mut bad = false;
        for ln in first..=last {
            if self.src.is_blank(ln) {
                self.blank_whitespace(ln, ln)?;
                continue;
            }
            let actual = self.src.indent_of(ln);
            let exact = match mode {
                IndentMode::AllExact => true,
                IndentMode::AtLeast => false,
                IndentMode::FirstExact => ln == first,
            };
            if exact {
                if actual != expected {
                    bad = true;
                }
            } else if actual < expected {
                bad = true;
            }
        }
        if bad {
            self.out.group(first, last, "Inconsistent Indentation")?;
            self.print_lines(first, last)?;
        }
        Ok(())
    }

    /// Content after a terminator character must be blank or a comment.
    fn check_trailing(&mut self, line: u32, col: u32, what: &str) -> Result<(), CheckError> {
        let after = self.src.text_from(line, col + 1);
        if after.is_empty() {
            return Ok(());
        }
        if after.trim().is_empty() {
            if after.len() > 1 && self.cfg.check_whitespace {
                self.out
                    .group(line, line, &format!("Extra white space behind {what}"))?;
                self.print_lines(line, line)?;
            }
        } else if !comments::is_comment_text(after.trim_start()) {
            self.out.group(
                line,
                line,
                &format!("Statements behind {what} should be on the next line"),
            )?;
            self.print_lines(line, line)?;
        }
        Ok(())
    }

    /// Content before a closing brace: whitespace gets the plain indent
    /// check, code means the brace belongs on the next line.
    fn check_leading(&mut self, close: Loc, expected: u32) -> Result<(), CheckError> {
        let before = self.src.text_before(close.line, close.col);
        if before.is_empty() {
            return Ok(());
        }
        if before.trim().is_empty() {
            self.check_indent(close.line, close.line, expected, IndentMode::AllExact)
        } else {
            self.out
                .group(close.line, close.line, "} should be on the next line")?;
            self.check_indent(
                close.line,
                close.line,
                expected + self.cfg.indent_unit,
                IndentMode::AllExact,
            )
        }
    }

    fn check_magic(&mut self, first: u32, last: u32) -> Result<(), CheckError> {
        for ln in first..=last {
            if magic::contains_magic(self.src, self.index, ln) {
                self.out.group(ln, ln, "Contains magic number/word")?;
                self.print_lines(ln, ln)?;
            }
        }
        Ok(())
    }

    /// Blank-line hygiene for `first..=last`, all blank: excess whitespace
    /// is only reported when whitespace checking is on.
    fn blank_whitespace(&mut self, first: u32, last: u32) -> Result<(), CheckError> {
        if !self.cfg.check_whitespace {
            return Ok(());
        }
        let noisy = (first..=last).any(|ln| self.src.line(ln).len() > 1);
        if !noisy {
            return Ok(());
        }
        if first == last {
            self.out.group(first, last, "Extra whitespace on empty line")?;
        } else {
            self.out
                .group(first, last, "Extra whitespace on empty lines")?;
        }
        self.out.line("Note: White space replaced with ^")?;
        for ln in first..=last {
            self.out.line(&self.src.line(ln).replace(' ', "^"))?;
        }
        Ok(())
    }

    fn check_line_limit(&mut self) -> Result<(), CheckError> {
        for ln in 0..self.src.line_count() {
            let text = self.src.line(ln);
            if text.len() > LINE_LIMIT {
                self.out
                    .headline(&format!("Line {} is over {LINE_LIMIT} characters", ln + 1))?;
                self.out.line(text)?;
            }
        }
        Ok(())
    }

    // === Strict-mode checks ===

    /// A branch keyword sharing a line with the previous branch's closing
    /// brace must sit exactly one space after it.
    fn strict_branch_spacing(
        &mut self,
        keyword: Keyword,
        at: Loc,
        prev_brace: Option<Loc>,
    ) -> Result<(), CheckError> {
        let Some(pb) = prev_brace else {
            return Ok(());
        };
        let gap = self
            .src
            .line(at.line)
            .get(pb.col as usize + 1..at.col as usize)
            .unwrap_or("");
        if gap != " " {
            self.out.group(
                at.line,
                at.line,
                &format!("Expected exactly one space between }} and {}", keyword.text()),
            )?;
            self.print_lines(at.line, at.line)?;
        }
        Ok(())
    }

    /// Conditional and branch bodies must use braces; a same-line brace
    /// follows its `)` (or case `:`) after exactly one space.
    fn strict_body_braces(
        &mut self,
        first: u32,
        terminator: &Terminator,
        cond_end: Option<Loc>,
    ) -> Result<(), CheckError> {
        match *terminator {
            Terminator::Braces(braces) => {
                let Some(end) = cond_end else {
                    return Ok(());
                };
                if braces.start.line == end.line {
                    self.strict_gap(end, braces.start, ")", "{")?;
                } else {
                    self.out.group(
                        braces.start.line,
                        braces.start.line,
                        "{ should be on the same line as the condition",
                    )?;
                    self.print_lines(braces.start.line, braces.start.line)?;
                }
            }
            Terminator::Semicolon(_) | Terminator::Keyword(..) => {
                self.out
                    .group(first, first, "Conditional body must use curly braces")?;
                self.print_lines(first, first)?;
            }
        }
        Ok(())
    }

    /// Exactly one space between two same-line delimiters.
    fn strict_gap(&mut self, left: Loc, right: Loc, lname: &str, rname: &str) -> Result<(), CheckError> {
        let gap = self
            .src
            .line(left.line)
            .get(left.col as usize + 1..right.col as usize)
            .unwrap_or("");
        if gap != " " {
            self.out.group(
                left.line,
                left.line,
                &format!("Expected exactly one space between {lname} and {rname}"),
            )?;
            self.print_lines(left.line, left.line)?;
        }
        Ok(())
    }

    fn print_lines(&mut self, first: u32, last: u32) -> Result<(), CheckError> {
        for ln in first..=last {
            let text = self.src.line(ln);
            self.out.line(text)?;
        }
        Ok(())
    }
}

// === Initialization pass ===

/// Detect the indent unit from the first function definition: the first
/// non-blank line after its opening-brace line sets the convention.
fn detect_indent_unit(scanner: &Scanner<'_>, src: &SourceFile) -> Result<u32, CheckError> {
    let n = src.line_count();
    let mut i = 0;
    while i < n {
        let block = scanner.classify(i)?;
        if matches!(block.kind, BlockKind::Function(_)) {
            if let Some(hit) = scanner.find_terminator(Loc::new(block.first_line, 0), b"{;", false)
            {
                let mut j = hit.loc().line + 1;
                while j < n && src.is_blank(j) {
                    j += 1;
                }
                if j < n {
                    return Ok(src.indent_of(j));
                }
            }
            break;
        }
        i = block.last_line + 1;
    }
    Ok(u32::try_from(TAB_WIDTH).unwrap_or(2))
}

/// Detect the case-label convention from the first switch/case pair:
/// labels flush with their switch mean 0, indented labels mean one unit.
/// With nothing to sample, labels are assumed indented.
fn detect_case_indent(scanner: &Scanner<'_>, src: &SourceFile, unit: u32) -> u32 {
    let n = src.line_count();
    for i in 0..n {
        let Some(m) = scanner.find_keyword(i, 0) else {
            continue;
        };
        if m.keyword != Keyword::Switch {
            continue;
        }
        let Some(colon) = scanner.find_terminator(m.loc, b":", false) else {
            break;
        };
        for j in colon.loc().line + 1..n {
            let Some(cm) = scanner.find_keyword(j, 0) else {
                continue;
            };
            if cm.keyword.class() == KeywordClass::CaseLabel {
                return if cm.loc.col == m.loc.col { 0 } else { unit };
            }
        }
        break;
    }
    unit
}
