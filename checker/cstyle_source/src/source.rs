//! Line-oriented source buffer with tab expansion.
//!
//! Each line is kept in two forms: the raw bytes as read from disk (used to
//! detect literal tab characters) and a tab-expanded form in which every tab
//! becomes [`TAB_WIDTH`] spaces. All column arithmetic in the checker runs
//! against the expanded form, so a tab-indented file and a space-indented
//! file measure identically.

/// Number of spaces a tab character expands to.
pub const TAB_WIDTH: usize = 2;

/// One source file, split into lines and immutable for the run.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Lines exactly as read, line terminators stripped.
    raw: Vec<String>,
    /// Lines with each tab replaced by [`TAB_WIDTH`] spaces.
    expanded: Vec<String>,
}

impl SourceFile {
    /// Build a source file from the full text of a file.
    ///
    /// Splits on line terminators (`\n` or `\r\n`) and precomputes the
    /// tab-expanded form of every line.
    pub fn new(text: &str) -> Self {
        let raw: Vec<String> = text.lines().map(str::to_owned).collect();
        let expanded = raw
            .iter()
            .map(|l| l.replace('\t', &" ".repeat(TAB_WIDTH)))
            .collect();
        SourceFile { raw, expanded }
    }

    /// Number of lines in the file.
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.expanded.len()).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the file has no lines.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// The tab-expanded text of a line. Panics if `line` is out of range.
    pub fn line(&self, line: u32) -> &str {
        &self.expanded[line as usize]
    }

    /// The raw (unexpanded) text of a line. Panics if `line` is out of range.
    pub fn raw_line(&self, line: u32) -> &str {
        &self.raw[line as usize]
    }

    /// Byte length of the tab-expanded line.
    pub fn line_len(&self, line: u32) -> u32 {
        u32::try_from(self.expanded[line as usize].len()).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the line is empty or whitespace-only.
    pub fn is_blank(&self, line: u32) -> bool {
        self.line(line).trim().is_empty()
    }

    /// Column count of the leading whitespace on a line.
    pub fn indent_of(&self, line: u32) -> u32 {
        let text = self.line(line);
        let lead = text.len() - text.trim_start().len();
        u32::try_from(lead).unwrap_or(u32::MAX)
    }

    /// The line text from column `col` to the end, or `""` past the end.
    pub fn text_from(&self, line: u32, col: u32) -> &str {
        self.line(line).get(col as usize..).unwrap_or("")
    }

    /// The line text before column `col` (exclusive), clamped to the line.
    pub fn text_before(&self, line: u32, col: u32) -> &str {
        let text = self.line(line);
        text.get(..(col as usize).min(text.len())).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_lines_and_strips_terminators() {
        let src = SourceFile::new("int x;\nint y;\r\nint z;\n");
        assert_eq!(src.line_count(), 3);
        assert_eq!(src.line(0), "int x;");
        assert_eq!(src.line(1), "int y;");
        assert_eq!(src.line(2), "int z;");
    }

    #[test]
    fn expands_tabs_to_spaces() {
        let src = SourceFile::new("\tx = 1;\n\t\ty = 2;");
        assert_eq!(src.line(0), "  x = 1;");
        assert_eq!(src.line(1), "    y = 2;");
        // Raw form keeps the literal tabs.
        assert_eq!(src.raw_line(0), "\tx = 1;");
        assert_eq!(src.indent_of(0), 2);
        assert_eq!(src.indent_of(1), 4);
    }

    #[test]
    fn blank_detection() {
        let src = SourceFile::new("x;\n\n   \n\t");
        assert!(!src.is_blank(0));
        assert!(src.is_blank(1));
        assert!(src.is_blank(2));
        assert!(src.is_blank(3));
    }

    #[test]
    fn text_slicing_clamps_out_of_range() {
        let src = SourceFile::new("abc");
        assert_eq!(src.text_from(0, 1), "bc");
        assert_eq!(src.text_from(0, 99), "");
        assert_eq!(src.text_before(0, 2), "ab");
        assert_eq!(src.text_before(0, 99), "abc");
    }

    #[test]
    fn empty_file_has_no_lines() {
        let src = SourceFile::new("");
        assert!(src.is_empty());
        assert_eq!(src.line_count(), 0);
    }
}
