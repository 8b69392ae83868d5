use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("unsupported table format for {0} (expected .csv or .parquet)")]
    UnsupportedFormat(std::path::PathBuf),

    #[error("no record batches to write to {0}")]
    Empty(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
