//! Classified blocks: the unit the rule engine consumes.

use cstyle_source::{Loc, Span};

use crate::Keyword;

/// How a conditional or branch body is closed off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminator {
    /// The body is a brace block; the span runs from `{` to `}`.
    Braces(Span),
    /// A single-statement body ending at `;`.
    Semicolon(Loc),
    /// A dangling body: the next control keyword starts before any
    /// terminator character (e.g. a nested braceless `if`).
    Keyword(Keyword, Loc),
}

impl Terminator {
    /// Returns `true` if the body uses braces.
    pub fn uses_braces(&self) -> bool {
        matches!(self, Terminator::Braces(_))
    }
}

/// A conditional construct: `if`, `else if`, `while`, `for`, `switch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conditional {
    pub keyword: Keyword,
    pub keyword_loc: Loc,
    /// Span of the condition parentheses.
    pub cond: Span,
    pub terminator: Terminator,
    /// Closing brace of the previous branch when this is a chained
    /// `else if` on the same line (`} else if (...)`).
    pub prev_brace: Option<Loc>,
}

/// Trailing `while (...) ;` of a do-while.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoWhile {
    /// The `while` keyword after the closing brace, when present.
    pub while_loc: Option<Loc>,
    /// The terminating semicolon.
    pub semicolon: Loc,
}

/// An unconditional branch: `else` or `do`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unconditional {
    pub keyword: Keyword,
    pub keyword_loc: Loc,
    pub terminator: Terminator,
    /// Trailing `while (...);` when the keyword is `do`.
    pub do_while: Option<DoWhile>,
    /// Closing brace of the previous branch when this is a chained
    /// `else` on the same line (`} else {`).
    pub prev_brace: Option<Loc>,
}

/// A function definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Function {
    /// Span of the parameter-list parentheses.
    pub params: Span,
    /// Span of the body braces.
    pub braces: Span,
}

/// A `case`/`default` label and the statements that belong to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchCase {
    pub keyword: Keyword,
    pub keyword_loc: Loc,
    /// The label's colon.
    pub colon: Loc,
    /// Explicit brace scope opened right after the colon, if any. Without
    /// one the block runs to the next label or the switch's closing brace.
    pub scope: Option<Span>,
}

/// What construct starts at a given line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// One or more consecutive blank lines.
    BlankRun,
    /// A single `//` comment line.
    LineComment,
    /// A `/* ... */` comment; the span covers opener through closer.
    BlockComment { span: Span },
    /// A preprocessor directive, including `\`-continued lines.
    Directive,
    Conditional(Conditional),
    Unconditional(Unconditional),
    Function(Function),
    /// A plain statement ending at `;`.
    Statement { terminator: Loc },
    /// A brace-delimited body that is not a function definition
    /// (struct/union/enum/anonymous block).
    Aggregate { braces: Span },
    SwitchCase(SwitchCase),
}

/// A classified, line-ranged unit of source structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// First line of the block (the line classification started at).
    pub first_line: u32,
    /// Last line of the block, inclusive.
    pub last_line: u32,
    pub kind: BlockKind,
}

impl Block {
    pub(crate) fn new(first_line: u32, last_line: u32, kind: BlockKind) -> Self {
        debug_assert!(first_line <= last_line);
        Block {
            first_line,
            last_line,
            kind,
        }
    }

    /// The keyword that drove classification, if any.
    pub fn keyword(&self) -> Option<Keyword> {
        match &self.kind {
            BlockKind::Conditional(c) => Some(c.keyword),
            BlockKind::Unconditional(u) => Some(u.keyword),
            BlockKind::SwitchCase(sc) => Some(sc.keyword),
            _ => None,
        }
    }

    /// Number of lines the block covers.
    pub fn line_count(&self) -> u32 {
        self.last_line - self.first_line + 1
    }
}
