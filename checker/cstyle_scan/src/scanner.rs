//! The scanner handle: a borrowed view of one file plus its lexical index.

use cstyle_source::{LexicalIndex, SourceFile};

/// Structural scanner over one source file.
///
/// Cheap to construct; all state lives in the borrowed [`SourceFile`] and
/// [`LexicalIndex`]. The interesting methods are spread over the sibling
/// modules: delimiter matching in `delim`, keyword and terminator search
/// in `keyword`, and block classification in `classify`.
pub struct Scanner<'a> {
    pub(crate) src: &'a SourceFile,
    pub(crate) index: &'a LexicalIndex<'a>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `src` using the pre-built lexical index.
    pub fn new(src: &'a SourceFile, index: &'a LexicalIndex<'a>) -> Self {
        Scanner { src, index }
    }

    /// The underlying source file.
    pub fn source(&self) -> &'a SourceFile {
        self.src
    }
}
