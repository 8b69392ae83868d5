//! Full keyword → hot-index and paper-count → forecast runs over a small corpus.

use std::io::Write;

use paperpulse_core::table::{hot_keywords_to_batch, keyword_counts_to_batch, paper_counts_to_batch};
use paperpulse_core::{Conference, PaperRecord, PipelineConfig};
use paperpulse_trend::{
    AnnotatedDoc, AnnotationError, AnnotationFile, Annotator, PipelineOutputs, Token, run_pipeline,
    tokenize,
};
use tempfile::TempDir;

const FUNCTION_WORDS: [&str; 6] = ["for", "of", "with", "and", "in", "on"];

/// Tags every content word as a noun in one chunk headed by the last word.
struct NounChunkAnnotator;

fn annotate_one(text: &str) -> AnnotatedDoc {
    let words = tokenize(text);
    let root = words.len().saturating_sub(1);
    let tokens = words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let function = FUNCTION_WORDS.contains(w);
            Token {
                text: w.to_string(),
                tag: (if function { "IN" } else { "NN" }).to_string(),
                pos: (if function { "ADP" } else { "NOUN" }).to_string(),
                dep: (if i == root {
                    "ROOT"
                } else if function {
                    "prep"
                } else {
                    "compound"
                })
                .to_string(),
                head: root,
                chunk: if function { None } else { Some(0) },
            }
        })
        .collect();
    AnnotatedDoc {
        text: text.to_string(),
        tokens,
    }
}

impl Annotator for NounChunkAnnotator {
    fn annotate(&self, texts: &[&str]) -> Vec<Result<AnnotatedDoc, AnnotationError>> {
        texts.iter().map(|t| Ok(annotate_one(t))).collect()
    }
}

fn push(papers: &mut Vec<PaperRecord>, conf: Conference, year: i64, title: &str, n: usize) {
    for _ in 0..n {
        papers.push(PaperRecord {
            title: title.to_string(),
            year,
            conference: conf.clone(),
        });
    }
}

fn corpus() -> Vec<PaperRecord> {
    let mut papers = Vec::new();
    for (i, year) in (2020..=2024).enumerate() {
        push(&mut papers, Conference::Cvpr, year, "vision transformers", i + 1);
        push(&mut papers, Conference::Cvpr, year, "point cloud segmentation", 3);
        push(&mut papers, Conference::Iclr, year, "diffusion policies", i + 1);
        push(&mut papers, Conference::Iclr, year, "graph learning", 2);
        push(&mut papers, Conference::Icml, year, "scaling laws", 2 * i + 1);
        push(&mut papers, Conference::Icml, year, "graph learning", 2);
        push(&mut papers, Conference::Kdd, year, "graph mining", 2 + i);
        push(&mut papers, Conference::Kdd, year, "anomaly detection", 2);
    }
    push(&mut papers, Conference::Cvpr, 2024, "vision transformer", 1);
    papers
}

fn run(annotator: &dyn Annotator) -> PipelineOutputs {
    run_pipeline(&corpus(), annotator, &PipelineConfig::default()).unwrap()
}

#[test]
fn hot_keywords_rank_rising_topics_first() {
    let out = run(&NounChunkAnnotator);
    assert_eq!(out.missing_annotations, 0);

    let cvpr: Vec<_> = out
        .hot_keywords
        .iter()
        .filter(|h| h.conference == Conference::Cvpr)
        .collect();
    assert_eq!(cvpr[0].keyword, "vision transformer");
    // Series 1, 2, 3, 4, 6 has the largest slope, newest count 6.
    assert!((cvpr[0].hot_index - 2.7 * 6.0).abs() < 1e-9);
    assert!(cvpr.iter().any(|h| h.keyword == "cloud segmentation" && h.hot_index == 3.0));

    for conf in Conference::KNOWN {
        let scores: Vec<f64> = out
            .hot_keywords
            .iter()
            .filter(|h| h.conference == conf)
            .map(|h| h.hot_index)
            .collect();
        assert!(!scores.is_empty(), "{conf} has no hot keywords");
        assert!(scores.len() <= 200);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn keyword_counts_are_filtered_and_folded() {
    let out = run(&NounChunkAnnotator);
    let phrases: Vec<&str> = out.keyword_counts.iter().map(|r| r.phrase.as_str()).collect();

    assert!(phrases.iter().all(|p| p.split_whitespace().count() >= 2));
    assert!(!phrases.contains(&"point cloud"));
    assert!(!phrases.contains(&"anomaly detection"));
    assert!(!phrases.contains(&"vision transformers"));

    let vt_2024 = out
        .keyword_counts
        .iter()
        .find(|r| r.conference == Conference::Cvpr && r.year == 2024 && r.phrase == "vision transformer")
        .unwrap();
    assert_eq!(vt_2024.count, 6);
}

#[test]
fn forecast_appends_one_row_per_conference() {
    let out = run(&NounChunkAnnotator);
    let forecasts: Vec<_> = out.paper_counts.iter().filter(|r| r.year == 2025).collect();
    assert_eq!(forecasts.len(), 4);
    assert_eq!(out.paper_counts.len(), 4 * 6);

    // KDD: 4, 5, 6, 7, 8 papers → linear increment of 1.
    let kdd = forecasts.iter().find(|r| r.conference == Conference::Kdd).unwrap();
    assert_eq!(kdd.count, 9);
    assert!(forecasts.iter().all(|r| r.count > 0));
}

#[test]
fn annotation_file_matches_in_process_annotator() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("annotations.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    let mut titles: Vec<String> = corpus().into_iter().map(|p| p.title).collect();
    titles.sort();
    titles.dedup();
    for title in &titles {
        writeln!(file, "{}", serde_json::to_string(&annotate_one(title)).unwrap()).unwrap();
    }
    drop(file);

    let annotations = AnnotationFile::open(&path).unwrap();
    assert_eq!(annotations.len(), titles.len());

    let from_file = run(&annotations);
    let in_process = run(&NounChunkAnnotator);
    assert_eq!(from_file.keyword_counts, in_process.keyword_counts);
    assert_eq!(from_file.hot_keywords, in_process.hot_keywords);
}

#[test]
fn repeated_runs_write_identical_tables() {
    let tmp = TempDir::new().unwrap();
    let mut written = Vec::new();
    for attempt in 0..2 {
        let out = run(&NounChunkAnnotator);
        let dir = tmp.path().join(format!("run{attempt}"));
        std::fs::create_dir_all(&dir).unwrap();
        let files = [
            ("keyword_counts.csv", keyword_counts_to_batch(&out.keyword_counts).unwrap()),
            ("hot_keywords.csv", hot_keywords_to_batch(&out.hot_keywords).unwrap()),
            ("paper_counts.csv", paper_counts_to_batch(&out.paper_counts).unwrap()),
        ];
        let mut contents = Vec::new();
        for (name, batch) in files {
            let path = dir.join(name);
            paperpulse_store::write_table(&path, &[batch]).unwrap();
            contents.push(std::fs::read(&path).unwrap());
        }
        written.push(contents);
    }
    assert_eq!(written[0], written[1]);
}
