//! End-to-end stages: titles → keyword counts → hot keywords, and
//! titles → paper counts → forecast.

use paperpulse_core::{
    ConferenceYearCount, HotKeyword, KeywordCount, PaperRecord, PipelineConfig,
};
use tracing::{info, warn};

use crate::TrendError;
use crate::aggregate::{PhraseTally, count_papers};
use crate::annotation::Annotator;
use crate::candidates::extract_phrases;
use crate::canonical::CanonicalMap;
use crate::forecast::forecast_paper_counts;
use crate::hot_index::rank_hot_keywords;

/// Titles handed to the annotator per call.
pub const ANNOTATION_BATCH: usize = 500;

/// Keyword counts plus bookkeeping from one extraction run.
#[derive(Debug, Clone, Default)]
pub struct KeywordExtraction {
    pub counts: Vec<KeywordCount>,
    pub titles: usize,
    pub missing_annotations: usize,
    pub vocabulary_size: usize,
    pub folded_phrases: usize,
}

/// Annotate every title, extract candidate phrases, canonicalize them against
/// the corpus vocabulary, filter per conference and count.
///
/// A title the annotator cannot handle is logged and contributes nothing.
/// The vocabulary is only built once every title has been processed.
pub fn extract_keyword_counts<A: Annotator + ?Sized>(
    papers: &[PaperRecord],
    annotator: &A,
) -> Result<KeywordExtraction, TrendError> {
    if papers.is_empty() {
        return Err(TrendError::NoData("papers table is empty"));
    }

    let mut tally = PhraseTally::new();
    let mut missing = 0usize;
    for batch in papers.chunks(ANNOTATION_BATCH) {
        let texts: Vec<&str> = batch.iter().map(|p| p.title.as_str()).collect();
        let docs = annotator.annotate(&texts);
        if docs.len() != batch.len() {
            return Err(TrendError::AnnotatorContract {
                expected: batch.len(),
                got: docs.len(),
            });
        }
        for (paper, doc) in batch.iter().zip(docs) {
            match doc {
                Ok(doc) => {
                    tally.add_title(&paper.conference, paper.year, &extract_phrases(&doc));
                }
                Err(e) => {
                    warn!(
                        conference = %paper.conference,
                        year = paper.year,
                        error = %e,
                        "title skipped"
                    );
                    missing += 1;
                }
            }
        }
    }

    let vocabulary = tally.vocabulary();
    let map = CanonicalMap::build(&vocabulary);
    let counts = tally.keyword_counts(&map);

    info!(
        titles = papers.len(),
        missing,
        vocabulary = vocabulary.len(),
        folded = map.folded(),
        rows = counts.len(),
        "keyword counts extracted"
    );

    Ok(KeywordExtraction {
        counts,
        titles: papers.len(),
        missing_annotations: missing,
        vocabulary_size: vocabulary.len(),
        folded_phrases: map.folded(),
    })
}

/// Observed paper counts with one forecast row per conference appended.
pub fn paper_count_forecast(
    papers: &[PaperRecord],
    config: &PipelineConfig,
) -> Result<Vec<ConferenceYearCount>, TrendError> {
    let observed = count_papers(papers);
    forecast_paper_counts(&observed, config.forecast_year)
}

/// Every output table of a full run.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub keyword_counts: Vec<KeywordCount>,
    pub hot_keywords: Vec<HotKeyword>,
    pub paper_counts: Vec<ConferenceYearCount>,
    pub missing_annotations: usize,
}

/// Both branches over one papers table. The forecast dispatch is checked
/// first so an unknown conference fails before any annotation work.
pub fn run_pipeline<A: Annotator + ?Sized>(
    papers: &[PaperRecord],
    annotator: &A,
    config: &PipelineConfig,
) -> Result<PipelineOutputs, TrendError> {
    let paper_counts = paper_count_forecast(papers, config)?;
    let extraction = extract_keyword_counts(papers, annotator)?;
    let hot_keywords = rank_hot_keywords(&extraction.counts, &config.scoring)?;
    Ok(PipelineOutputs {
        keyword_counts: extraction.counts,
        hot_keywords,
        paper_counts,
        missing_annotations: extraction.missing_annotations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotatedDoc, AnnotationError, AnnotationFile, Token};
    use paperpulse_core::Conference;

    struct ShortAnnotator;

    impl Annotator for ShortAnnotator {
        fn annotate(&self, _texts: &[&str]) -> Vec<Result<AnnotatedDoc, AnnotationError>> {
            Vec::new()
        }
    }

    fn noun_pair(text: &str) -> AnnotatedDoc {
        let words: Vec<&str> = text.split(' ').collect();
        AnnotatedDoc {
            text: text.into(),
            tokens: words
                .iter()
                .enumerate()
                .map(|(i, w)| Token {
                    text: w.to_string(),
                    tag: "NN".into(),
                    pos: "NOUN".into(),
                    dep: (if i + 1 == words.len() { "ROOT" } else { "compound" }).into(),
                    head: words.len() - 1,
                    chunk: Some(0),
                })
                .collect(),
        }
    }

    fn paper(title: &str, year: i64, conf: Conference) -> PaperRecord {
        PaperRecord {
            title: title.into(),
            year,
            conference: conf,
        }
    }

    #[test]
    fn missing_annotations_are_skipped() {
        let annotations = AnnotationFile::from_docs([noun_pair("graph transformers")]);
        let papers = vec![
            paper("graph transformers", 2024, Conference::Kdd),
            paper("unannotated title", 2024, Conference::Kdd),
        ];
        let extraction = extract_keyword_counts(&papers, &annotations).unwrap();
        assert_eq!(extraction.titles, 2);
        assert_eq!(extraction.missing_annotations, 1);
        assert_eq!(extraction.counts.len(), 1);
        assert_eq!(extraction.counts[0].phrase, "graph transformers");
    }

    #[test]
    fn plural_variants_fold_across_conferences() {
        let annotations = AnnotationFile::from_docs([
            noun_pair("graph transformers"),
            noun_pair("graph transformer"),
        ]);
        let papers = vec![
            paper("graph transformers", 2024, Conference::Cvpr),
            paper("graph transformer", 2023, Conference::Kdd),
        ];
        let extraction = extract_keyword_counts(&papers, &annotations).unwrap();
        assert!(extraction.counts.iter().all(|r| r.phrase == "graph transformer"));
        assert_eq!(extraction.folded_phrases, 1);
    }

    #[test]
    fn short_annotator_output_is_rejected() {
        let papers = vec![paper("graph transformers", 2024, Conference::Kdd)];
        assert!(matches!(
            extract_keyword_counts(&papers, &ShortAnnotator),
            Err(TrendError::AnnotatorContract {
                expected: 1,
                got: 0
            })
        ));
    }

    #[test]
    fn empty_papers_is_no_data() {
        assert!(matches!(
            extract_keyword_counts(&[], &ShortAnnotator),
            Err(TrendError::NoData(_))
        ));
    }

    #[test]
    fn unknown_conference_fails_before_annotation() {
        let papers = vec![paper("graph transformers", 2024, Conference::parse("aaai"))];
        assert!(matches!(
            run_pipeline(&papers, &ShortAnnotator, &PipelineConfig::default()),
            Err(TrendError::UnknownConference { .. })
        ));
    }
}
