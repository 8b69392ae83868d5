//! Folding of lexical variants onto one canonical phrase.
//!
//! Every decision is taken against a frozen [`Vocabulary`] of raw phrases, and
//! each phrase is folded exactly once. Folding is not transitive
//! and hyphen/space folding only runs hyphen to space.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:a|an|the)\s+").unwrap());

/// The set of distinct raw candidate phrases observed over the whole corpus.
///
/// Built once, after every document has been processed, and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    phrases: HashSet<String>,
}

impl Vocabulary {
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrases in sorted order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut phrases: Vec<&str> = self.phrases.iter().map(String::as_str).collect();
        phrases.sort_unstable();
        phrases
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            phrases: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Canonical form of one raw phrase.
///
/// Applied in order: plural to singular, hyphen to space, leading article
/// removal, then two-word order folding to the lexicographically smaller form.
pub fn canonicalize(phrase: &str, vocabulary: &Vocabulary) -> String {
    let mut base = phrase.trim().to_lowercase();

    if let Some(singular) = base.strip_suffix('s')
        && vocabulary.contains(singular)
    {
        base = singular.to_string();
    }

    if base.contains('-') {
        let spaced = base.replace('-', " ");
        if vocabulary.contains(&spaced) {
            base = spaced;
        }
    }

    base = LEADING_ARTICLE.replace(&base, "").into_owned();

    let words: Vec<&str> = base.split_whitespace().collect();
    if let [first, second] = words[..] {
        let reversed = format!("{second} {first}");
        if vocabulary.contains(&reversed) && reversed < base {
            base = reversed;
        }
    }

    base
}

/// Raw phrase to canonical phrase, for every phrase of a vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CanonicalMap {
    mapping: BTreeMap<String, String>,
}

impl CanonicalMap {
    pub fn build(vocabulary: &Vocabulary) -> Self {
        let mapping = vocabulary
            .sorted()
            .into_iter()
            .map(|raw| (raw.to_string(), canonicalize(raw, vocabulary)))
            .collect();
        Self { mapping }
    }

    /// Canonical form of a vocabulary phrase. Phrases outside the vocabulary
    /// map to themselves.
    pub fn get<'a>(&'a self, raw: &'a str) -> &'a str {
        self.mapping.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Number of phrases whose canonical form differs from the raw text.
    pub fn folded(&self) -> usize {
        self.mapping.iter().filter(|(raw, canon)| raw != canon).count()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
