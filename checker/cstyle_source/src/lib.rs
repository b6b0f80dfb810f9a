//! Source text model for the cstyle checker.
//!
//! Holds the line-oriented view of one source file and answers the lexical
//! questions every scanning pass depends on: where block comments live,
//! whether a position sits inside a comment or a quoted literal, and how
//! columns map onto tab-expanded text.
//!
//! This crate is standalone on purpose: the structural scanner, the rule
//! engine, and any external tooling can depend on it without pulling in the
//! rest of the checker.

mod lexical;
mod loc;
mod source;

pub use lexical::{LexicalIndex, LineScan};
pub use loc::{Loc, Span};
pub use source::{SourceFile, TAB_WIDTH};
