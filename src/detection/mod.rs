//! Term detection.
//!
//! Compiles a lexicon into a word-boundary matcher and answers detection and
//! occurrence-vector queries against it.

mod engine;
mod matcher;

pub use engine::{Detection, DetectionEngine};
pub use matcher::{Matcher, TermMatch};
