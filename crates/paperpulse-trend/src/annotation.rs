//! Contract with the external part-of-speech / dependency annotator.
//!
//! Tagging itself happens outside this crate. The tagger is expected to
//! tokenize with [`tokenize`] (runs of `[A-Za-z0-9_-]`, so `self-supervised`
//! and `pre_training` stay single tokens) and to write one [`AnnotatedDoc`]
//! per line of a JSON-lines file, which [`AnnotationFile`] serves back.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::TrendError;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// One token of an annotated title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text.
    pub text: String,
    /// Fine-grained tag (`NN`, `NNS`, `VBG`, `JJ`, ...).
    #[serde(default)]
    pub tag: String,
    /// Coarse part of speech (`NOUN`, `ADJ`, `VERB`, ...).
    #[serde(default)]
    pub pos: String,
    /// Dependency label (`compound`, `amod`, `ROOT`, ...).
    #[serde(default)]
    pub dep: String,
    /// Index of the syntactic head. A root points at itself.
    pub head: usize,
    /// Noun-chunk id, if the token belongs to one.
    #[serde(default)]
    pub chunk: Option<usize>,
}

/// An annotated title: its text and token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDoc {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl AnnotatedDoc {
    /// Token texts in order.
    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Tokenized but untagged document, for handing to the external tagger.
    /// Every token is its own root and outside any noun chunk.
    pub fn skeleton(text: &str) -> Self {
        let tokens = tokenize(text)
            .into_iter()
            .enumerate()
            .map(|(i, word)| Token {
                text: word.to_string(),
                tag: String::new(),
                pos: String::new(),
                dep: String::new(),
                head: i,
                chunk: None,
            })
            .collect();
        Self {
            text: text.to_string(),
            tokens,
        }
    }
}

/// A title that could not be annotated. Recovered per title: the title
/// contributes no phrases and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("no annotation for {0:?}")]
    Missing(String),

    #[error("tokens for {text:?} do not follow the tokenization rule: expected {expected:?}, got {found:?}")]
    TokenMismatch {
        text: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("token {token} of {text:?} has head {head} outside the document")]
    HeadOutOfRange {
        text: String,
        token: usize,
        head: usize,
    },
}

/// Annotates a batch of titles, one result per input, in input order.
pub trait Annotator {
    fn annotate(&self, texts: &[&str]) -> Vec<Result<AnnotatedDoc, AnnotationError>>;
}

/// Split text into tokens: maximal runs of ASCII word characters and hyphens.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Check a tagger's output against the tokenization rule and its own head links.
pub fn validate(doc: &AnnotatedDoc) -> Result<(), AnnotationError> {
    let expected = tokenize(&doc.text);
    let found = doc.words();
    if expected != found {
        return Err(AnnotationError::TokenMismatch {
            text: doc.text.clone(),
            expected: expected.into_iter().map(str::to_string).collect(),
            found: found.into_iter().map(str::to_string).collect(),
        });
    }
    let n = doc.tokens.len();
    if let Some((token, t)) = doc.tokens.iter().enumerate().find(|(_, t)| t.head >= n) {
        return Err(AnnotationError::HeadOutOfRange {
            text: doc.text.clone(),
            token,
            head: t.head,
        });
    }
    Ok(())
}

/// Pre-computed annotations loaded from a JSON-lines file, keyed by exact text.
#[derive(Debug, Default)]
pub struct AnnotationFile {
    docs: HashMap<String, AnnotatedDoc>,
}

impl AnnotationFile {
    /// Load annotations from a JSON-lines file. Blank lines are skipped.
    pub fn open(path: &Path) -> Result<Self, TrendError> {
        let file = std::fs::File::open(path).map_err(|source| TrendError::AnnotationIo {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = Self::from_reader(std::io::BufReader::new(file), path)?;
        info!(path = %path.display(), docs = loaded.len(), "loaded annotations");
        Ok(loaded)
    }

    /// Parse JSON-lines from any reader; `origin` is only used in error messages.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self, TrendError> {
        let mut docs = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TrendError::AnnotationIo {
                path: origin.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: AnnotatedDoc =
                serde_json::from_str(&line).map_err(|source| TrendError::AnnotationJson {
                    path: origin.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            docs.insert(doc.text.clone(), doc);
        }
        Ok(Self { docs })
    }

    pub fn from_docs(docs: impl IntoIterator<Item = AnnotatedDoc>) -> Self {
        Self {
            docs: docs.into_iter().map(|d| (d.text.clone(), d)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Annotator for AnnotationFile {
    fn annotate(&self, texts: &[&str]) -> Vec<Result<AnnotatedDoc, AnnotationError>> {
        texts
            .iter()
            .map(|&text| {
                if tokenize(text).is_empty() {
                    return Ok(AnnotatedDoc {
                        text: text.to_string(),
                        tokens: Vec::new(),
                    });
                }
                let doc = self
                    .docs
                    .get(text)
                    .ok_or_else(|| AnnotationError::Missing(text.to_string()))?;
                validate(doc)?;
                Ok(doc.clone())
            })
            .collect()
    }
}
