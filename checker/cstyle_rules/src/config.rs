//! Run configuration.

use std::path::PathBuf;

/// Options handed in from the command line, consumed as a plain record.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// File to check.
    pub file: PathBuf,
    /// Override for the auto-detected indent unit. Parsed by the CLI; a
    /// non-integer argument never reaches this record.
    pub indent_override: Option<u32>,
    /// Report excess whitespace (trailing spaces, noisy blank lines).
    pub check_whitespace: bool,
    /// List function headers before checking.
    pub print_headers: bool,
    /// Enforce mandatory braces and fixed brace/keyword spacing.
    pub strict: bool,
}

impl RunOptions {
    /// Options with every toggle off.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        RunOptions {
            file: file.into(),
            indent_override: None,
            check_whitespace: false,
            print_headers: false,
            strict: false,
        }
    }
}

/// Per-run conventions, established once before the main pass and never
/// mutated during it.
#[derive(Clone, Copy, Debug)]
pub struct CheckConfig {
    /// Base indent unit in columns, auto-detected from the first function
    /// body unless overridden.
    pub indent_unit: u32,
    /// Extra indent of case labels relative to their switch: 0 or one
    /// indent unit, sampled from the first switch/case pair.
    pub case_indent: u32,
    pub check_whitespace: bool,
    pub strict: bool,
}
