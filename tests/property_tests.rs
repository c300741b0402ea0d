//! Property-based tests for lexicon handling.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Codec round trip is lossless and deterministic
//! - Normalization is idempotent and leaves no redundant phrase
//! - Occurrence vectors always have one entry per term
//! - Matches never start or end inside a word

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use redflag::lexicon::{term_key, tokenize};
use redflag::security::obscure;
use redflag::{DetectionEngine, normalize};

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,6}"
}

fn candidate() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|tokens| tokens.join(" "))
}

proptest! {
    /// Property: decode(encode(s)) == s for arbitrary text.
    #[test]
    fn prop_codec_round_trip(s in "\\PC{0,64}") {
        let record = obscure::encode(&s);
        prop_assert_eq!(obscure::decode(&record).unwrap(), s);
    }

    /// Property: encoding is deterministic and yields single-line ASCII.
    #[test]
    fn prop_codec_deterministic(s in "\\PC{0,64}") {
        let first = obscure::encode(&s);
        prop_assert_eq!(&first, &obscure::encode(&s));
        prop_assert!(first.iter().all(|b| b.is_ascii_graphic()));
    }

    /// Property: normalize(normalize(x)) == normalize(x).
    #[test]
    fn prop_normalize_idempotent(raw in prop::collection::vec(candidate(), 0..20)) {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Property: no surviving phrase contains a retained unigram or another phrase.
    #[test]
    fn prop_normalize_leaves_no_redundancy(raw in prop::collection::vec(candidate(), 0..20)) {
        let lexicon = normalize(&raw);
        let unigrams: Vec<String> = lexicon
            .iter()
            .filter(|t| tokenize(t).len() == 1)
            .map(|t| t.to_lowercase())
            .collect();
        let phrases: Vec<String> = lexicon
            .iter()
            .filter(|t| tokenize(t).len() > 1)
            .map(|t| term_key(t))
            .collect();

        for (i, phrase) in phrases.iter().enumerate() {
            prop_assert!(phrase.split(' ').all(|tok| !unigrams.contains(&tok.to_string())));
            let haystack = format!(" {phrase} ");
            for (j, other) in phrases.iter().enumerate() {
                if i != j {
                    let needle = format!(" {other} ");
                    prop_assert!(!haystack.contains(&needle), "{phrase:?} contains {other:?}");
                }
            }
        }

        let mut keys: Vec<String> = lexicon.iter().map(|t| term_key(t)).collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), lexicon.len());
    }

    /// Property: the occurrence vector has one entry per term.
    #[test]
    fn prop_vector_length_matches_lexicon(
        terms in prop::collection::vec(candidate(), 0..10),
        text in "[a-zA-Z ,.]{0,120}",
    ) {
        let engine = DetectionEngine::new(&terms).unwrap();
        prop_assert_eq!(engine.abuse_vector(&text).len(), terms.len());
    }

    /// Property: every match is delimited by non-word characters or text edges.
    #[test]
    fn prop_matches_respect_word_boundaries(
        terms in prop::collection::vec(word(), 1..5),
        text in "[a-zA-Z ]{0,120}",
    ) {
        let engine = DetectionEngine::new(&terms).unwrap();
        for m in engine.find_matches(&text) {
            let before = text[..m.start].chars().next_back();
            let after = text[m.end..].chars().next();
            prop_assert!(before.is_none_or(|c| !c.is_alphanumeric()));
            prop_assert!(after.is_none_or(|c| !c.is_alphanumeric()));
            prop_assert!(terms.iter().any(|t| t.eq_ignore_ascii_case(&m.text)));
        }
    }
}
