//! Indentation and style rule engine for the cstyle checker.
//!
//! Drives a whole file: classify the next block, dispatch to a per-kind
//! handler, recurse into nested bodies one indent unit deeper, resume at
//! the line the handler returns. Style violations print immediately and
//! the pass continues; only unparseable structure aborts the run.

mod comments;
mod config;
mod diagnostics;
mod engine;
mod error;
mod magic;

pub use config::{CheckConfig, RunOptions};
pub use diagnostics::Emitter;
pub use engine::Checker;
pub use error::CheckError;
