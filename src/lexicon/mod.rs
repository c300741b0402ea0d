//! Lexicon building and persistence.
//!
//! [`normalize()`] minimizes a raw candidate list at build time; [`store`]
//! reads and writes the obscured lexicon file the detection engine loads.

pub mod normalize;
pub mod store;

pub use normalize::{normalize, term_key, tokenize};
pub use store::LexiconStore;
