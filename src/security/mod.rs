//! Security features.
//!
//! At-rest obscuring of lexicon terms.

pub mod obscure;

pub use obscure::{CodecError, ObscuringCodec, TermCodec};
