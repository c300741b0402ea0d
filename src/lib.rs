//! # Redflag
//!
//! Curated lexicon management and flagged-term detection.
//!
//! Redflag keeps a list of flagged words and phrases, minimizes it at build
//! time, stores it obscured at rest, and detects its terms in arbitrary text.
//!
//! ## Components
//!
//! - [`security::obscure`]: reversible, deterministic at-rest encoding of terms
//! - [`lexicon::normalize()`]: deduplication and overlap elimination for raw lists
//! - [`lexicon::LexiconStore`]: atomic, line-per-record lexicon file I/O
//! - [`DetectionEngine`]: word-boundary, case-insensitive multi-term matching
//!   with occurrence vectors
//!
//! ## Example
//!
//! ```rust
//! use redflag::DetectionEngine;
//!
//! let engine = DetectionEngine::new(&["Big Ben", "clocktower", "on-foot"])?;
//! assert_eq!(
//!     engine.matches("I went to see that clocktower Big Ben"),
//!     vec!["clocktower", "Big Ben"]
//! );
//! assert_eq!(engine.abuse_vector("clocktower, clocktower"), vec![0, 2, 0]);
//! # Ok::<(), redflag::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

pub mod config;
pub mod detection;
pub mod lexicon;
pub mod observability;
pub mod security;

pub use config::RedflagConfig;
pub use detection::{Detection, DetectionEngine, Matcher, TermMatch};
pub use lexicon::{LexiconStore, normalize};
pub use security::{CodecError, ObscuringCodec, TermCodec};

/// Error type for redflag operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Codec` | A record was not produced by the obscuring codec |
/// | `Store` | Lexicon file missing, unreadable, oversized, or holding a bad record |
/// | `RoundTripMismatch` | A bulk encode did not decode back to its input |
/// | `InvalidInput` | Caller passed an unusable argument (e.g. a blank term) |
/// | `OperationFailed` | Matcher compilation, logging setup, config parsing |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A record failed to decode.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The lexicon file could not be read or written.
    ///
    /// `line` is the 1-based record line for decode failures and `None` for
    /// whole-file failures.
    #[error(
        "lexicon store {}{}: {cause}",
        .path.display(),
        .line.map_or_else(String::new, |l| format!(" line {l}"))
    )]
    Store {
        /// The lexicon file path.
        path: PathBuf,
        /// The offending line, if any.
        line: Option<usize>,
        /// The underlying cause.
        cause: String,
    },

    /// Round-trip verification failed for the term at `index`.
    #[error("round-trip verification failed for term at index {index}")]
    RoundTripMismatch {
        /// Index of the first mismatching term.
        index: usize,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for redflag operations.
pub type Result<T> = std::result::Result<T, Error>;
