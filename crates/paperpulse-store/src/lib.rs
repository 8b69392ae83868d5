//! Storage layer: named-column tables on disk as CSV or Parquet, in memory as Arrow RecordBatches.

mod error;
mod files;

pub use error::StoreError;
pub use files::{
    TableFormat, read_csv, read_parquet, read_table, row_count, write_csv, write_parquet,
    write_table,
};
