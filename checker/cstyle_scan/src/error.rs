//! Fatal scan failures.
//!
//! Style violations are never errors: they are printed and the pass
//! continues. A `ScanError` means the structural scan could not make sense
//! of the file (unbalanced delimiters, a terminator that never arrives):
//! the run aborts with a non-zero status.

use cstyle_source::Loc;
use thiserror::Error;

/// Fatal structural-scan failure. Line numbers are 1-based for display.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// An opening delimiter has no matching closer before end of file.
    #[error("Line {line}: no matching '{close}' for '{open}' before end of file")]
    Unbalanced { open: char, close: char, line: u32 },

    /// No statement terminator (`;`, `{` or `:`) before end of file.
    #[error("Line {line}: statement terminator not found before end of file")]
    MissingTerminator { line: u32 },

    /// A control keyword has no condition parentheses.
    #[error("Line {line}: condition parentheses not found")]
    MissingCondition { line: u32 },

    /// A block comment is opened but never closed.
    #[error("Line {line}: block comment is never closed")]
    UnterminatedComment { line: u32 },

    /// A `do` statement whose body braces cannot be located.
    #[error("Line {line}: cannot locate the body of this 'do' statement")]
    MalformedDo { line: u32 },
}

impl ScanError {
    pub(crate) fn unbalanced(open: u8, close: u8, at: Loc) -> Self {
        ScanError::Unbalanced {
            open: open as char,
            close: close as char,
            line: at.line + 1,
        }
    }

    pub(crate) fn missing_terminator(line: u32) -> Self {
        ScanError::MissingTerminator { line: line + 1 }
    }

    pub(crate) fn missing_condition(line: u32) -> Self {
        ScanError::MissingCondition { line: line + 1 }
    }

    pub(crate) fn unterminated_comment(line: u32) -> Self {
        ScanError::UnterminatedComment { line: line + 1 }
    }

    pub(crate) fn malformed_do(line: u32) -> Self {
        ScanError::MalformedDo { line: line + 1 }
    }
}
