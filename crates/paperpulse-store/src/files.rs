//! File-backed tables. The format is chosen from the file extension.
//!
//! CSV files are read with every column typed `Utf8` so that a header-only or
//! mixed-content column never trips schema inference; the typed decoders in
//! `paperpulse-core` parse numbers from text. Parquet keeps its stored types.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Pick the format from a `.csv` / `.parquet` extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read a table from disk, dispatching on the extension.
pub fn read_table(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let batches = match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Parquet => read_parquet(path)?,
    };
    info!(path = %path.display(), rows = row_count(&batches), "read table");
    Ok(batches)
}

/// Write a table to disk, dispatching on the extension. Replaces any existing file.
pub fn write_table(path: &Path, batches: &[RecordBatch]) -> Result<(), StoreError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => write_csv(path, batches)?,
        TableFormat::Parquet => write_parquet(path, batches)?,
    }
    info!(path = %path.display(), rows = row_count(batches), "wrote table");
    Ok(())
}

/// Read a headed CSV file into all-`Utf8` RecordBatches.
pub fn read_csv(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let mut file = open_existing(path)?;

    // Only the header is needed: every column is read as text.
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(0))?;
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(Schema::new(fields)))
        .with_header(true)
        .build(file)?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let file = open_existing(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

pub fn write_csv(path: &Path, batches: &[RecordBatch]) -> Result<(), StoreError> {
    if batches.is_empty() {
        return Err(StoreError::Empty(path.to_path_buf()));
    }
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    for batch in batches {
        writer.write(batch)?;
    }
    Ok(())
}

pub fn write_parquet(path: &Path, batches: &[RecordBatch]) -> Result<(), StoreError> {
    let Some(first) = batches.first() else {
        return Err(StoreError::Empty(path.to_path_buf()));
    };
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, first.schema(), None)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(())
}

/// Total rows across batches.
pub fn row_count(batches: &[RecordBatch]) -> usize {
    batches.iter().map(|b| b.num_rows()).sum()
}

fn open_existing(path: &Path) -> Result<File, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}
