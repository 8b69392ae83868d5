use std::path::PathBuf;

use paperpulse_core::Conference;
use thiserror::Error;

/// Corpus-level and dispatch-level failures. These abort the run; per-title
/// and per-keyword problems are recovered where they occur.
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("no data: {0}")]
    NoData(&'static str),

    #[error("no forecast model for conference {conference} (observed in {year})")]
    UnknownConference { conference: Conference, year: i64 },

    #[error(
        "forecast year {forecast_year} is not after {conference}'s last observed year {last_observed}"
    )]
    ForecastYear {
        conference: Conference,
        forecast_year: i64,
        last_observed: i64,
    },

    #[error("annotator returned {got} results for {expected} titles")]
    AnnotatorContract { expected: usize, got: usize },

    #[error("failed to read annotations from {path}: {source}")]
    AnnotationIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed annotation at {path}:{line}: {source}")]
    AnnotationJson {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}
