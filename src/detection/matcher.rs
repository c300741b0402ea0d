//! Compiled multi-term matcher.
//!
//! All terms are folded into one case-insensitive alternation, each term
//! escaped and wrapped in `\b` word-boundary assertions:
//!
//! ```text
//! (?i)\bBig Ben\b|\bclocktower\b|\bon\-foot\b
//! ```
//!
//! A term embedded inside a larger alphanumeric word never matches
//! (`cat` does not match inside `category`), while punctuation-adjacent
//! occurrences do. Alternation is leftmost-first, so when two terms could
//! match at the same position the one listed first in the lexicon wins.
//!
//! Per-term counting runs each matched span through a set of anchored,
//! case-insensitive term patterns, so attribution folds case exactly as the
//! scan does.

use crate::{Error, Result};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

/// Compiled program size limit. Large lexicons produce large alternations.
const REGEX_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// A detected term occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    /// Start byte offset in the document.
    pub start: usize,
    /// End byte offset in the document (exclusive).
    pub end: usize,
    /// The matched text, with the document's casing.
    pub text: String,
}

/// Word-boundary matcher compiled from a term list.
///
/// An empty term list compiles to a matcher that never matches. Blank terms
/// are left out of the pattern.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    regex: Option<Regex>,
    terms: Option<RegexSet>,
    /// Lexicon index of each pattern in `terms`.
    slots: Vec<usize>,
    len: usize,
}

impl Matcher {
    /// Compiles a matcher for `terms`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the combined pattern cannot be
    /// compiled (for example when it exceeds the size limit).
    pub fn compile<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        Self::compile_with_limit(terms, REGEX_SIZE_LIMIT)
    }

    /// Compiles a matcher with an explicit compiled-program size limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the patterns exceed `size_limit`
    /// or otherwise fail to compile.
    pub fn compile_with_limit<S: AsRef<str>>(terms: &[S], size_limit: usize) -> Result<Self> {
        let len = terms.len();
        let Some(pattern) = build_pattern(terms) else {
            return Ok(Self {
                len,
                ..Self::default()
            });
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()
            .map_err(compile_error)?;

        let (slots, anchored): (Vec<usize>, Vec<String>) = terms
            .iter()
            .map(|t| t.as_ref())
            .enumerate()
            .filter(|(_, term)| !term.trim().is_empty())
            .map(|(slot, term)| (slot, format!("^{}$", regex::escape(term))))
            .unzip();
        let set = RegexSetBuilder::new(&anchored)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()
            .map_err(compile_error)?;

        Ok(Self {
            regex: Some(regex),
            terms: Some(set),
            slots,
            len,
        })
    }

    /// Returns the compiled pattern, or `None` for an empty matcher.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    /// Returns true if any term occurs in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Returns every non-overlapping occurrence in left-to-right order.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<TermMatch> {
        let Some(re) = &self.regex else {
            return Vec::new();
        };
        re.find_iter(text)
            .map(|m| TermMatch {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
            })
            .collect()
    }

    /// Counts occurrences per term, indexed like the compiled term list.
    ///
    /// Each match is credited to every term it equals under case folding, so
    /// terms that differ only in casing share their counts.
    #[must_use]
    pub fn term_counts(&self, text: &str) -> Vec<usize> {
        let mut counts = vec![0; self.len];
        let (Some(re), Some(set)) = (&self.regex, &self.terms) else {
            return counts;
        };
        for m in re.find_iter(text) {
            for pattern in set.matches(m.as_str()).iter() {
                counts[self.slots[pattern]] += 1;
            }
        }
        counts
    }
}

fn compile_error(e: regex::Error) -> Error {
    Error::OperationFailed {
        operation: "compile_matcher".to_string(),
        cause: e.to_string(),
    }
}

/// Builds the alternation pattern, or `None` if there is nothing to match.
fn build_pattern<S: AsRef<str>>(terms: &[S]) -> Option<String> {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref())
        .filter(|term| !term.trim().is_empty())
        .map(|term| format!(r"\b{}\b", regex::escape(term)))
        .collect();

    if alternatives.is_empty() {
        None
    } else {
        Some(alternatives.join("|"))
    }
}
