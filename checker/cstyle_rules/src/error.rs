//! Fatal checker failures.

use std::io;

use cstyle_scan::ScanError;
use thiserror::Error;

/// A failure that aborts the run. Style violations are diagnostics, not
/// errors; this type covers unparseable structure and output failures.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The structural scan could not make sense of the file.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Writing a diagnostic failed.
    #[error("failed to write diagnostics: {0}")]
    Io(#[from] io::Error),
}
