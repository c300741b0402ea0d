//! Lexicon normalization ("filter-and-stabilize").
//!
//! Turns a raw candidate list into a minimal, ordered lexicon:
//!
//! 1. Split into unigrams and phrases, dropping case-insensitive duplicates
//!    (first occurrence wins, original casing kept).
//! 2. Drop every phrase that contains another candidate phrase at token
//!    boundaries (`"a cat"` removes `"a cat catches mice"`).
//! 3. Drop every phrase with a token equal to a retained unigram
//!    (`"dog"` removes `"a dog chased the bus"`).
//!
//! Output is all unigrams in first-encounter order, then surviving phrases in
//! first-encounter order, each rejoined with single spaces.
//!
//! Phrase containment is quadratic in the number of phrases. Lists are small
//! and determinism matters more here than asymptotic cost.

use std::collections::HashSet;

/// A candidate phrase with its original tokens and lower-cased lookup key.
#[derive(Debug)]
struct Phrase<'a> {
    tokens: Vec<&'a str>,
    key: String,
}

impl Phrase<'_> {
    /// Returns true if `other` appears inside this phrase at token boundaries.
    fn contains_phrase(&self, other: &Self) -> bool {
        if other.tokens.len() > self.tokens.len() {
            return false;
        }
        let haystack = format!(" {} ", self.key);
        let needle = format!(" {} ", other.key);
        haystack.contains(&needle)
    }
}

/// Splits a term into whitespace-delimited tokens.
#[must_use]
pub fn tokenize(term: &str) -> Vec<&str> {
    term.split_whitespace().collect()
}

/// Returns the case-insensitive identity of a term: lower-cased tokens joined
/// by single spaces.
#[must_use]
pub fn term_key(term: &str) -> String {
    lowercase_join(&tokenize(term))
}

fn lowercase_join(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a raw candidate list into a non-redundant lexicon.
///
/// Deterministic for a given input order. Blank entries are ignored.
#[must_use]
pub fn normalize<S: AsRef<str>>(raw_terms: &[S]) -> Vec<String> {
    let mut unigrams: Vec<&str> = Vec::new();
    let mut unigram_keys: HashSet<String> = HashSet::new();
    let mut phrases: Vec<Phrase<'_>> = Vec::new();
    let mut phrase_keys: HashSet<String> = HashSet::new();

    for raw in raw_terms {
        let tokens = tokenize(raw.as_ref());
        match tokens.len() {
            0 => {},
            1 => {
                let word = tokens[0];
                if unigram_keys.insert(word.to_lowercase()) {
                    unigrams.push(word);
                }
            },
            _ => {
                let key = lowercase_join(&tokens);
                if phrase_keys.insert(key.clone()) {
                    phrases.push(Phrase { tokens, key });
                }
            },
        }
    }

    // Pairwise over every candidate, not only survivors: if C is inside B and
    // B is inside A, both A and B go.
    let contained: Vec<bool> = phrases
        .iter()
        .enumerate()
        .map(|(i, outer)| {
            phrases
                .iter()
                .enumerate()
                .any(|(j, inner)| i != j && outer.contains_phrase(inner))
        })
        .collect();

    let survivors = phrases
        .iter()
        .zip(contained)
        .filter(|(_, is_contained)| !is_contained)
        .map(|(phrase, _)| phrase)
        .filter(|phrase| {
            !phrase
                .tokens
                .iter()
                .any(|token| unigram_keys.contains(&token.to_lowercase()))
        });

    let mut lexicon: Vec<String> = unigrams.into_iter().map(str::to_string).collect();
    lexicon.extend(survivors.map(|phrase| phrase.tokens.join(" ")));

    tracing::debug!(
        input = raw_terms.len(),
        output = lexicon.len(),
        "Normalized lexicon"
    );

    lexicon
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_normalize_reference_list() {
        let raw = [
            "cat",
            "cats",
            "a cat",
            "a cat catches mice",
            "dog",
            "black squirrel",
            "black squirrels",
            "the groom waited at the altar",
            "the groom waited at the altar",
        ];
        assert_eq!(
            normalize(&raw),
            vec![
                "cat",
                "cats",
                "dog",
                "black squirrel",
                "black squirrels",
                "the groom waited at the altar",
            ]
        );
    }

    #[test]
    fn test_normalize_mixed_case_list() {
        let raw = [
            "a cat",
            "a cat catches mice",
            "The groom waited at the altar",
            "Cats groom",
            "dog",
            "The Cat Napped",
            "the Cat caught a mouse",
            "a dog chased the bus",
            "the Dog caught the cat",
            "the cat",
            "The groom waited at the altar",
            "cat",
            "cats",
            "black Squirrel",
            "black squirrels",
        ];
        assert_eq!(
            normalize(&raw),
            vec![
                "dog",
                "cat",
                "cats",
                "The groom waited at the altar",
                "black Squirrel",
                "black squirrels",
            ]
        );
    }

    #[test]
    fn test_first_unigram_casing_wins() {
        assert_eq!(normalize(&["Cat", "cat", "CAT"]), vec!["Cat"]);
    }

    #[test]
    fn test_phrase_whitespace_is_collapsed() {
        assert_eq!(normalize(&["  big   ben "]), vec!["big ben"]);
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        assert_eq!(normalize(&["", "   ", "dog"]), vec!["dog"]);
    }

    #[test]
    fn test_chained_containment_drops_both_outer_phrases() {
        let raw = ["a b c d", "a b c", "b c"];
        assert_eq!(normalize(&raw), vec!["b c"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = ["cat", "a cat", "Big Ben", "big ben tower", "on-foot", "the tube"];
        let once = normalize(&raw);
        assert_eq!(normalize(&once), once);
    }

    #[test_case("a cat", "a cat catches mice", true ; "prefix")]
    #[test_case("cat catches", "a cat catches mice", true ; "middle")]
    #[test_case("black squirrel", "black squirrels", false ; "partial token")]
    #[test_case("a cat catches", "a cat", false ; "longer needle")]
    #[test_case("The Cat", "saw the cat", true ; "case insensitive")]
    fn test_contains_phrase(inner: &str, outer: &str, expected: bool) {
        fn phrase(s: &str) -> Phrase<'_> {
            Phrase {
                tokens: tokenize(s),
                key: term_key(s),
            }
        }
        let (inner, outer) = (phrase(inner), phrase(outer));
        assert_eq!(outer.contains_phrase(&inner), expected);
    }

    #[test]
    fn test_term_key() {
        assert_eq!(term_key("  Big\tBEN "), "big ben");
    }
}
