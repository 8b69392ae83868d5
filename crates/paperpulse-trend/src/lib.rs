pub mod aggregate;
pub mod annotation;
pub mod blacklist;
pub mod candidates;
pub mod canonical;
pub mod error;
pub mod forecast;
pub mod hot_index;
pub mod pipeline;

pub use aggregate::{PhraseTally, count_papers};
pub use annotation::{AnnotatedDoc, AnnotationError, AnnotationFile, Annotator, Token, tokenize};
pub use candidates::extract_phrases;
pub use canonical::{CanonicalMap, Vocabulary, canonicalize};
pub use error::TrendError;
pub use forecast::{ForecastModel, forecast_paper_counts};
pub use hot_index::rank_hot_keywords;
pub use pipeline::{
    KeywordExtraction, PipelineOutputs, extract_keyword_counts, paper_count_forecast,
    run_pipeline,
};
