//! Title normalisation applied to scraped listings before phrase extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::records::{PaperRecord, RawPaper};

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalise a paper title.
///
/// 1. Drop every character that is not a word character, whitespace or `-`
/// 2. Collapse whitespace runs to a single space and trim
/// 3. Lowercase
pub fn clean_title(text: &str) -> String {
    let stripped = PUNCTUATION.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_lowercase()
}

/// Reduce scraped listings to cleaned `(title, year, conference)` records.
pub fn clean_papers(raw: &[RawPaper]) -> Vec<PaperRecord> {
    let papers: Vec<PaperRecord> = raw
        .iter()
        .map(|p| PaperRecord {
            title: clean_title(&p.title),
            year: p.year,
            conference: p.conference.clone(),
        })
        .collect();
    let empty = papers.iter().filter(|p| p.title.is_empty()).count();
    debug!(papers = papers.len(), empty, "cleaned titles");
    papers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Conference;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(
            clean_title("Attention Is All You Need!"),
            "attention is all you need"
        );
        assert_eq!(
            clean_title("NeRF: Representing Scenes as Neural Radiance Fields."),
            "nerf representing scenes as neural radiance fields"
        );
    }

    #[test]
    fn keeps_hyphens_and_underscores() {
        assert_eq!(
            clean_title("Self-Supervised Pre_Training (SSL)"),
            "self-supervised pre_training ssl"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_title("  graph \t neural\n\nnetworks  "), "graph neural networks");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(clean_title(""), "");
        assert_eq!(clean_title("?!."), "");
    }

    #[test]
    fn clean_papers_keeps_every_row() {
        let raw = vec![
            RawPaper {
                title: "Diffusion Models Beat GANs.".into(),
                authors: None,
                year: 2021,
                conference: Conference::Icml,
                doi_link: None,
                dblp_link: None,
            },
            RawPaper {
                title: String::new(),
                authors: None,
                year: 2021,
                conference: Conference::Icml,
                doi_link: None,
                dblp_link: None,
            },
        ];
        let cleaned = clean_papers(&raw);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].title, "diffusion models beat gans");
        assert_eq!(cleaned[1].title, "");
    }
}
