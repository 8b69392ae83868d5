//! Stage runners: read input tables, run a pipeline stage, write the result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use arrow::record_batch::RecordBatch;
use paperpulse_core::table::{
    hot_keywords_to_batch, keyword_counts_from_batches, keyword_counts_to_batch,
    paper_counts_to_batch, papers_from_batches, papers_to_batch, raw_papers_from_batches,
};
use paperpulse_core::{PaperRecord, PipelineConfig, clean_papers};
use paperpulse_trend::{
    AnnotatedDoc, AnnotationFile, extract_keyword_counts, paper_count_forecast,
    rank_hot_keywords, run_pipeline,
};

pub struct RunStats {
    pub keyword_rows: usize,
    pub hot_rows: usize,
    pub paper_count_rows: usize,
    pub missing_annotations: usize,
    pub elapsed_secs: f64,
}

fn read(path: &Path) -> anyhow::Result<Vec<RecordBatch>> {
    paperpulse_store::read_table(path).with_context(|| format!("reading {}", path.display()))
}

fn write(path: &Path, batch: RecordBatch) -> anyhow::Result<()> {
    paperpulse_store::write_table(path, &[batch])
        .with_context(|| format!("writing {}", path.display()))
}

fn read_papers(path: &Path) -> anyhow::Result<Vec<PaperRecord>> {
    let batches = read(path)?;
    papers_from_batches(&batches).with_context(|| format!("decoding papers from {}", path.display()))
}

/// Raw listing → cleaned papers table.
pub fn clean(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let batches = read(input)?;
    let raw = raw_papers_from_batches(&batches)
        .with_context(|| format!("decoding raw papers from {}", input.display()))?;
    let papers = clean_papers(&raw);
    write(output, papers_to_batch(&papers)?)?;
    Ok(papers.len())
}

/// Write the tokenized skeleton of every distinct non-empty title, one JSON
/// object per line, for the external tagger to fill in.
pub fn tokens(papers_path: &Path, output: &Path) -> anyhow::Result<usize> {
    let papers = read_papers(papers_path)?;
    let mut titles: Vec<&str> = papers
        .iter()
        .map(|p| p.title.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    titles.sort_unstable();
    titles.dedup();

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut out = BufWriter::new(file);
    for title in &titles {
        serde_json::to_writer(&mut out, &AnnotatedDoc::skeleton(title))?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(titles.len())
}

/// Papers + annotations → keyword counts table.
pub fn keywords(papers_path: &Path, annotations: &Path, output: &Path) -> anyhow::Result<usize> {
    let papers = read_papers(papers_path)?;
    let annotator = AnnotationFile::open(annotations)?;
    let extraction = extract_keyword_counts(&papers, &annotator)?;
    if extraction.missing_annotations > 0 {
        eprintln!(
            "  {} of {} titles had no usable annotation",
            extraction.missing_annotations, extraction.titles
        );
    }
    write(output, keyword_counts_to_batch(&extraction.counts)?)?;
    Ok(extraction.counts.len())
}

/// Keyword counts → hot keywords table.
pub fn hot(counts_path: &Path, output: &Path, config: &PipelineConfig) -> anyhow::Result<usize> {
    let batches = read(counts_path)?;
    let counts = keyword_counts_from_batches(&batches)
        .with_context(|| format!("decoding keyword counts from {}", counts_path.display()))?;
    let hot = rank_hot_keywords(&counts, &config.scoring)?;
    write(output, hot_keywords_to_batch(&hot)?)?;
    Ok(hot.len())
}

/// Papers → observed and forecast paper counts table.
pub fn forecast(papers_path: &Path, output: &Path, config: &PipelineConfig) -> anyhow::Result<usize> {
    let papers = read_papers(papers_path)?;
    let counts = paper_count_forecast(&papers, config)?;
    write(output, paper_counts_to_batch(&counts)?)?;
    Ok(counts.len())
}

/// Output paths of a full run inside `dir`.
pub fn run_outputs(dir: &Path, extension: &str) -> [PathBuf; 3] {
    [
        dir.join(format!("keyword_counts.{extension}")),
        dir.join(format!("hot_keywords.{extension}")),
        dir.join(format!("paper_counts.{extension}")),
    ]
}

/// Both branches end to end; writes the three output tables into `out_dir`.
pub fn run(
    papers_path: &Path,
    annotations: &Path,
    out_dir: &Path,
    extension: &str,
    config: &PipelineConfig,
) -> anyhow::Result<RunStats> {
    let start = Instant::now();

    let papers = read_papers(papers_path)?;
    eprintln!("  Read {} papers from {}", papers.len(), papers_path.display());
    let annotator = AnnotationFile::open(annotations)?;

    let out = run_pipeline(&papers, &annotator, config)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let [counts_path, hot_path, paper_counts_path] = run_outputs(out_dir, extension);
    write(&counts_path, keyword_counts_to_batch(&out.keyword_counts)?)?;
    write(&hot_path, hot_keywords_to_batch(&out.hot_keywords)?)?;
    write(&paper_counts_path, paper_counts_to_batch(&out.paper_counts)?)?;

    Ok(RunStats {
        keyword_rows: out.keyword_counts.len(),
        hot_rows: out.hot_keywords.len(),
        paper_count_rows: out.paper_counts.len(),
        missing_annotations: out.missing_annotations,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperpulse_core::Conference;
    use paperpulse_core::table::hot_keywords_from_batches;
    use paperpulse_trend::Token;
    use tempfile::TempDir;

    fn write_raw_csv(path: &Path) {
        let mut csv = String::from("title,authors,year,conference,doi_link,dblp_link\n");
        for (i, year) in (2020..=2024).enumerate() {
            for _ in 0..=i {
                csv.push_str(&format!("Graph Transformers!,A. Author,{year},KDD,,\n"));
            }
            csv.push_str(&format!("Case Study: Data Mining,B. Author,{year},KDD,,\n"));
        }
        std::fs::write(path, csv).unwrap();
    }

    fn tag(doc: AnnotatedDoc) -> AnnotatedDoc {
        let root = doc.tokens.len() - 1;
        AnnotatedDoc {
            tokens: doc
                .tokens
                .into_iter()
                .enumerate()
                .map(|(i, t)| Token {
                    tag: "NN".into(),
                    pos: "NOUN".into(),
                    dep: (if i == root { "ROOT" } else { "compound" }).into(),
                    head: root,
                    chunk: Some(0),
                    ..t
                })
                .collect(),
            ..doc
        }
    }

    #[test]
    fn clean_tokens_keywords_hot_forecast() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("raw.csv");
        let papers = tmp.path().join("papers.parquet");
        let skeleton = tmp.path().join("skeleton.jsonl");
        let annotations = tmp.path().join("annotations.jsonl");
        let counts = tmp.path().join("counts.csv");
        let hot_out = tmp.path().join("hot.csv");
        let forecast_out = tmp.path().join("paper_counts.csv");
        write_raw_csv(&raw);

        assert_eq!(clean(&raw, &papers).unwrap(), 20);
        assert_eq!(tokens(&papers, &skeleton).unwrap(), 2);

        // Stand in for the external tagger.
        let tagged: Vec<String> = std::fs::read_to_string(&skeleton)
            .unwrap()
            .lines()
            .map(|l| {
                let doc: AnnotatedDoc = serde_json::from_str(l).unwrap();
                serde_json::to_string(&tag(doc)).unwrap()
            })
            .collect();
        std::fs::write(&annotations, tagged.join("\n")).unwrap();

        assert!(keywords(&papers, &annotations, &counts).unwrap() > 0);
        let config = PipelineConfig::default();
        assert!(hot(&counts, &hot_out, &config).unwrap() > 0);

        let ranked = hot_keywords_from_batches(&read(&hot_out).unwrap()).unwrap();
        assert_eq!(ranked[0].conference, Conference::Kdd);
        assert_eq!(ranked[0].keyword, "graph transformers");
        assert!(ranked.iter().all(|h| h.keyword != "case study"));

        // 5 observed years + 1 forecast.
        assert_eq!(forecast(&papers, &forecast_out, &config).unwrap(), 6);
    }

    #[test]
    fn run_writes_three_tables() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("raw.csv");
        let papers = tmp.path().join("papers.csv");
        let annotations = tmp.path().join("annotations.jsonl");
        write_raw_csv(&raw);
        clean(&raw, &papers).unwrap();

        let lines: Vec<String> = ["graph transformers", "case study data mining"]
            .iter()
            .map(|t| serde_json::to_string(&tag(AnnotatedDoc::skeleton(t))).unwrap())
            .collect();
        std::fs::write(&annotations, lines.join("\n")).unwrap();

        let out_dir = tmp.path().join("out");
        let stats = run(&papers, &annotations, &out_dir, "parquet", &PipelineConfig::default())
            .unwrap();
        assert_eq!(stats.missing_annotations, 0);
        assert_eq!(stats.paper_count_rows, 6);
        for path in run_outputs(&out_dir, "parquet") {
            assert!(path.exists(), "{} missing", path.display());
        }
    }
}
