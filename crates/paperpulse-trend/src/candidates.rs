//! Candidate phrase generation for one annotated title.

use std::collections::{BTreeMap, BTreeSet};

use crate::annotation::{AnnotatedDoc, Token};

/// Fine-grained tags whose modifiers contribute their whole subtree.
const SUBTREE_TAGS: [&str; 2] = ["NN", "VBG"];
/// Dependency roles that qualify a token for subtree extraction.
const SUBTREE_DEPS: [&str; 2] = ["compound", "amod"];

/// All lowercase candidate phrases of one document, duplicates collapsed.
///
/// The union of noun chunks, compound/adjectival-modifier subtrees and
/// adjective-or-noun + noun bigrams, plus every contiguous sub-span of two or
/// more words of each multi-word candidate.
pub fn extract_phrases(doc: &AnnotatedDoc) -> BTreeSet<String> {
    let tokens = &doc.tokens;
    let mut base: BTreeSet<String> = BTreeSet::new();

    // ── Noun chunks ──
    let mut chunks: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for token in tokens {
        if let Some(id) = token.chunk {
            chunks.entry(id).or_default().push(&token.text);
        }
    }
    for words in chunks.values() {
        base.insert(join_lower(words.iter().copied()));
    }

    // ── Modifier subtrees ──
    for (idx, token) in tokens.iter().enumerate() {
        if SUBTREE_TAGS.contains(&token.tag.as_str()) && SUBTREE_DEPS.contains(&token.dep.as_str())
        {
            let span = subtree(tokens, idx);
            base.insert(join_lower(span.iter().map(|&i| tokens[i].text.as_str())));
        }
    }

    // ── Bigrams ──
    for pair in tokens.windows(2) {
        if matches!(pair[0].pos.as_str(), "ADJ" | "NOUN") && pair[1].pos == "NOUN" {
            base.insert(join_lower([pair[0].text.as_str(), pair[1].text.as_str()]));
        }
    }

    let mut phrases = base.clone();
    for phrase in &base {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        phrases.extend(sub_spans(&words));
    }
    phrases.remove("");
    phrases
}

/// Every contiguous run of at least two words, including the full sequence.
pub fn sub_spans(words: &[&str]) -> Vec<String> {
    let mut spans = Vec::new();
    for start in 0..words.len() {
        for end in start + 2..=words.len() {
            spans.push(words[start..end].join(" "));
        }
    }
    spans
}

/// Indices of `root` and every token whose head chain passes through it, in
/// document order. Cycles in malformed head links are cut.
fn subtree(tokens: &[Token], root: usize) -> Vec<usize> {
    (0..tokens.len())
        .filter(|&i| descends_from(tokens, i, root))
        .collect()
}

fn descends_from(tokens: &[Token], mut idx: usize, root: usize) -> bool {
    for _ in 0..=tokens.len() {
        if idx == root {
            return true;
        }
        let head = tokens[idx].head;
        if head == idx || head >= tokens.len() {
            return false;
        }
        idx = head;
    }
    false
}

fn join_lower<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
