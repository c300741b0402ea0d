//! Detection engine.
//!
//! Owns the live lexicon and its compiled [`Matcher`]. The pair is held as a
//! single immutable `Snapshot` behind an `Arc`; every mutation builds a new
//! snapshot and swaps it in, so readers always see terms and matcher from the
//! same generation.
//!
//! # Concurrency
//!
//! - Mutations (`add_terms`, `remove_terms`, `rebuild`) are serialized by a
//!   writer mutex.
//! - The matcher is compiled outside the read/write lock; only the pointer
//!   swap holds the write lock.
//! - If compilation fails, the previous snapshot stays in place.
//!
//! Each mutation recompiles the full matcher, which is O(lexicon size).
//! Mutations are rare compared to detection calls.

use super::matcher::{Matcher, TermMatch};
use crate::lexicon::store::LexiconStore;
use crate::security::obscure::TermCodec;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Result of [`DetectionEngine::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Every matched substring, in document order and casing.
    Matches(Vec<String>),
    /// Whether at least one term matched.
    Flagged(bool),
}

impl Detection {
    /// Returns true if anything was detected.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        match self {
            Self::Matches(matches) => !matches.is_empty(),
            Self::Flagged(flagged) => *flagged,
        }
    }

    /// Returns the matched substrings, or `None` for a boolean result.
    #[must_use]
    pub fn into_matches(self) -> Option<Vec<String>> {
        match self {
            Self::Matches(matches) => Some(matches),
            Self::Flagged(_) => None,
        }
    }
}

/// One consistent generation of lexicon and matcher.
#[derive(Debug, Default)]
struct Snapshot {
    terms: Vec<String>,
    matcher: Matcher,
}

impl Snapshot {
    fn build(terms: Vec<String>) -> Result<Self> {
        let matcher = Matcher::compile(&terms)?;
        tracing::debug!(terms = terms.len(), "Compiled lexicon matcher");
        Ok(Self { terms, matcher })
    }
}

/// Lexicon-backed term detector.
#[derive(Debug, Default)]
pub struct DetectionEngine {
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl DetectionEngine {
    /// Creates an engine with the given terms, kept exactly as provided.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the matcher cannot be compiled.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let terms = terms.iter().map(|t| t.as_ref().to_string()).collect();
        Ok(Self {
            current: RwLock::new(Arc::new(Snapshot::build(terms)?)),
            writer: Mutex::new(()),
        })
    }

    /// Loads the lexicon from `store` and compiles the matcher.
    ///
    /// Terms are used exactly as decoded; normalization is a build step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the file is missing or malformed, or
    /// [`Error::OperationFailed`] if the matcher cannot be compiled.
    pub fn load<C: TermCodec>(store: &LexiconStore<C>) -> Result<Self> {
        let terms = store.read()?;
        tracing::info!(
            path = %store.path().display(),
            terms = terms.len(),
            "Loaded detection engine"
        );
        Self::new(&terms)
    }

    /// Writes the current terms to `store`.
    ///
    /// # Errors
    ///
    /// See [`LexiconStore::write`].
    pub fn export<C: TermCodec>(&self, store: &LexiconStore<C>) -> Result<()> {
        store.write(&self.snapshot().terms)
    }

    /// Returns a copy of the current terms in lexicon order.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        self.snapshot().terms.clone()
    }

    /// Returns the number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().terms.len()
    }

    /// Returns true if the lexicon has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().terms.is_empty()
    }

    /// Appends terms verbatim and recompiles the matcher.
    ///
    /// No deduplication or overlap filtering is applied: runtime additions
    /// are trusted input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any term is empty or whitespace-only,
    /// or [`Error::OperationFailed`] if the matcher cannot be compiled. The
    /// engine is unchanged on error.
    pub fn add_terms<S: AsRef<str>>(&self, terms: &[S]) -> Result<()> {
        if let Some(index) = terms.iter().position(|t| t.as_ref().trim().is_empty()) {
            return Err(Error::InvalidInput(format!("term at index {index} is empty")));
        }

        self.mutate(|current| {
            let mut next = current.to_vec();
            next.extend(terms.iter().map(|t| t.as_ref().to_string()));
            next
        })
    }

    /// Removes every term exactly equal (case-sensitive) to an entry in
    /// `terms`, then recompiles the matcher. Absent terms are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the matcher cannot be compiled.
    pub fn remove_terms<S: AsRef<str>>(&self, terms: &[S]) -> Result<()> {
        let doomed: HashSet<&str> = terms.iter().map(|t| t.as_ref()).collect();
        self.mutate(|current| {
            current
                .iter()
                .filter(|t| !doomed.contains(t.as_str()))
                .cloned()
                .collect()
        })
    }

    /// Recompiles the matcher from the current terms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the matcher cannot be compiled.
    pub fn rebuild(&self) -> Result<()> {
        self.mutate(<[String]>::to_vec)
    }

    /// Returns every detected occurrence with byte offsets.
    #[must_use]
    pub fn find_matches(&self, document: &str) -> Vec<TermMatch> {
        self.snapshot().matcher.find_all(document)
    }

    /// Returns every matched substring in document order and casing.
    #[must_use]
    pub fn matches(&self, document: &str) -> Vec<String> {
        self.find_matches(document)
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    /// Returns true if any term occurs in `document`.
    #[must_use]
    pub fn is_flagged(&self, document: &str) -> bool {
        self.snapshot().matcher.is_match(document)
    }

    /// Detects lexicon terms in `document`.
    ///
    /// With `return_matches` the result carries every matched substring;
    /// otherwise only whether anything matched.
    #[must_use]
    pub fn detect(&self, document: &str, return_matches: bool) -> Detection {
        if return_matches {
            Detection::Matches(self.matches(document))
        } else {
            Detection::Flagged(self.is_flagged(document))
        }
    }

    /// Counts occurrences of each term in `document`.
    ///
    /// The result has one entry per term, in lexicon order. Each match is
    /// attributed to every term it equals under the matcher's case folding,
    /// so duplicate terms that differ only in casing each receive the same
    /// count.
    #[must_use]
    pub fn abuse_vector(&self, document: &str) -> Vec<usize> {
        self.snapshot().matcher.term_counts(document)
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        // Snapshots are immutable, so a poisoned lock still guards valid data.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    fn mutate(&self, update: impl FnOnce(&[String]) -> Vec<String>) -> Result<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let next = Snapshot::build(update(&self.snapshot().terms))?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        Ok(())
    }
}
