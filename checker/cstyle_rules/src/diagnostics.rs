//! Diagnostic output.
//!
//! Diagnostics are an unstructured stream of line-groups on the given
//! writer: a header naming the offending 1-based line or line range and a
//! short message, usually followed by the offending source line(s). No
//! machine-readable form is produced.

use std::io;

/// Writes diagnostic line-groups and counts how many were emitted.
pub struct Emitter<W: io::Write> {
    out: W,
    emitted: usize,
}

impl<W: io::Write> Emitter<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Emitter { out, emitted: 0 }
    }

    /// Emit a diagnostic header for a line or line range (0-based in,
    /// 1-based out).
    pub(crate) fn group(&mut self, first: u32, last: u32, message: &str) -> io::Result<()> {
        self.emitted += 1;
        if first == last {
            writeln!(self.out, "Line {}: {message}", first + 1)
        } else {
            writeln!(self.out, "Line {} to {}: {message}", first + 1, last + 1)
        }
    }

    /// Emit a free-form diagnostic header.
    pub(crate) fn headline(&mut self, text: &str) -> io::Result<()> {
        self.emitted += 1;
        writeln!(self.out, "{text}")
    }

    /// Emit a context line (source text or a note); does not count as a
    /// diagnostic.
    pub(crate) fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Number of diagnostics emitted so far.
    pub fn count(&self) -> usize {
        self.emitted
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

    #[test]
    fn single_line_header() {
        let mut buf = Vec::new();
        let mut e = Emitter::new(&mut buf);
        e.group(4, 4, "Inconsistent Indentation").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Line 5: Inconsistent Indentation\n"
        );
    }

    #[test]
    fn range_header_and_count() {
        let mut buf = Vec::new();
        let mut e = Emitter::new(&mut buf);
        e.group(2, 6, "Excess newlines").unwrap();
        e.line("context").unwrap();
        assert_eq!(e.count(), 1);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Line 3 to 7: Excess newlines\ncontext\n"
        );
    }
}
