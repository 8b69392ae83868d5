//! Conversion between typed rows and Arrow RecordBatches.
//!
//! Decoders look columns up by name, so extra columns (e.g. a pandas index
//! column in a CSV export) are ignored. Strings may be `Utf8` or `LargeUtf8`;
//! integer columns may be any Arrow integer type or decimal text, since CSV
//! tables are read all-text by the store.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, LargeStringArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use thiserror::Error;

use crate::records::{
    Conference, ConferenceYearCount, HotKeyword, KeywordCount, PaperRecord, RawPaper,
};
use crate::schema::tables::{self, *};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing '{0}' column")]
    MissingColumn(String),

    #[error("null '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: DataType },

    #[error("invalid {expected} {value:?} in '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

// ── Decoders ──

/// Decode the scraped listing table. `title` and `authors` may be null;
/// `authors`, `doi_link` and `dblp_link` may be absent.
pub fn raw_papers_from_batches(batches: &[RecordBatch]) -> Result<Vec<RawPaper>, TableError> {
    let mut out = Vec::new();
    for batch in batches {
        let titles = column(batch, TITLE)?;
        let years = int_values(batch, YEAR)?;
        let confs = string_values(batch, CONFERENCE)?;
        let authors = optional_string_values(batch, AUTHORS)?;
        let doi_links = optional_string_values(batch, DOI_LINK)?;
        let dblp_links = optional_string_values(batch, DBLP_LINK)?;

        for (row, (year, conf)) in years.into_iter().zip(confs).enumerate() {
            let title = optional_str(titles.as_ref(), TITLE, row)?.unwrap_or_default();
            out.push(RawPaper {
                title: title.to_string(),
                authors: authors.as_ref().and_then(|v| v[row].clone()),
                year,
                conference: Conference::parse(&conf),
                doi_link: doi_links.as_ref().and_then(|v| v[row].clone()),
                dblp_link: dblp_links.as_ref().and_then(|v| v[row].clone()),
            });
        }
    }
    Ok(out)
}

/// Decode the cleaned titles table. A null title decodes as an empty title.
pub fn papers_from_batches(batches: &[RecordBatch]) -> Result<Vec<PaperRecord>, TableError> {
    let mut out = Vec::new();
    for batch in batches {
        let titles = column(batch, TITLE)?;
        let years = int_values(batch, YEAR)?;
        let confs = string_values(batch, CONFERENCE)?;

        for (row, (year, conf)) in years.into_iter().zip(confs).enumerate() {
            let title = optional_str(titles.as_ref(), TITLE, row)?.unwrap_or_default();
            out.push(PaperRecord {
                title: title.to_string(),
                year,
                conference: Conference::parse(&conf),
            });
        }
    }
    Ok(out)
}

pub fn keyword_counts_from_batches(
    batches: &[RecordBatch],
) -> Result<Vec<KeywordCount>, TableError> {
    let mut out = Vec::new();
    for batch in batches {
        let confs = string_values(batch, CONFERENCE)?;
        let years = int_values(batch, YEAR)?;
        let phrases = string_values(batch, FILTERED_PHRASES)?;
        let counts = int_values(batch, COUNT)?;

        for (((conf, year), phrase), count) in confs.into_iter().zip(years).zip(phrases).zip(counts)
        {
            out.push(KeywordCount {
                conference: Conference::parse(&conf),
                year,
                phrase,
                count,
            });
        }
    }
    Ok(out)
}

pub fn hot_keywords_from_batches(batches: &[RecordBatch]) -> Result<Vec<HotKeyword>, TableError> {
    let mut out = Vec::new();
    for batch in batches {
        let confs = string_values(batch, CONFERENCE)?;
        let keywords = string_values(batch, KEYWORD)?;
        let scores = float_values(batch, HOT_INDEX)?;

        for ((conf, keyword), hot_index) in confs.into_iter().zip(keywords).zip(scores) {
            out.push(HotKeyword {
                conference: Conference::parse(&conf),
                keyword,
                hot_index,
            });
        }
    }
    Ok(out)
}

pub fn paper_counts_from_batches(
    batches: &[RecordBatch],
) -> Result<Vec<ConferenceYearCount>, TableError> {
    let mut out = Vec::new();
    for batch in batches {
        let confs = string_values(batch, CONFERENCE)?;
        let years = int_values(batch, YEAR)?;
        let counts = int_values(batch, COUNT)?;

        for ((conf, year), count) in confs.into_iter().zip(years).zip(counts) {
            out.push(ConferenceYearCount {
                conference: Conference::parse(&conf),
                year,
                count,
            });
        }
    }
    Ok(out)
}

// ── Encoders ──

pub fn papers_to_batch(rows: &[PaperRecord]) -> Result<RecordBatch, TableError> {
    let titles = StringArray::from_iter_values(rows.iter().map(|r| r.title.as_str()));
    let years = Int64Array::from_iter_values(rows.iter().map(|r| r.year));
    let confs = StringArray::from_iter_values(rows.iter().map(|r| r.conference.as_str()));

    Ok(RecordBatch::try_new(
        Arc::new(tables::papers_schema()),
        vec![Arc::new(titles), Arc::new(years), Arc::new(confs)],
    )?)
}

pub fn keyword_counts_to_batch(rows: &[KeywordCount]) -> Result<RecordBatch, TableError> {
    let confs = StringArray::from_iter_values(rows.iter().map(|r| r.conference.as_str()));
    let years = Int64Array::from_iter_values(rows.iter().map(|r| r.year));
    let phrases = StringArray::from_iter_values(rows.iter().map(|r| r.phrase.as_str()));
    let counts = Int64Array::from_iter_values(rows.iter().map(|r| r.count));

    Ok(RecordBatch::try_new(
        Arc::new(tables::keyword_counts_schema()),
        vec![
            Arc::new(confs),
            Arc::new(years),
            Arc::new(phrases),
            Arc::new(counts),
        ],
    )?)
}

pub fn hot_keywords_to_batch(rows: &[HotKeyword]) -> Result<RecordBatch, TableError> {
    let confs = StringArray::from_iter_values(rows.iter().map(|r| r.conference.as_str()));
    let keywords = StringArray::from_iter_values(rows.iter().map(|r| r.keyword.as_str()));
    let scores = Float64Array::from_iter_values(rows.iter().map(|r| r.hot_index));

    Ok(RecordBatch::try_new(
        Arc::new(tables::hot_keywords_schema()),
        vec![Arc::new(confs), Arc::new(keywords), Arc::new(scores)],
    )?)
}

pub fn paper_counts_to_batch(rows: &[ConferenceYearCount]) -> Result<RecordBatch, TableError> {
    let confs = StringArray::from_iter_values(rows.iter().map(|r| r.conference.as_str()));
    let years = Int64Array::from_iter_values(rows.iter().map(|r| r.year));
    let counts = Int64Array::from_iter_values(rows.iter().map(|r| r.count));

    Ok(RecordBatch::try_new(
        Arc::new(tables::paper_counts_schema()),
        vec![Arc::new(confs), Arc::new(years), Arc::new(counts)],
    )?)
}

// ── Arrow extraction helpers ──

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, TableError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| TableError::MissingColumn(name.to_string()))
}

fn null_value(column: &str, row: usize) -> TableError {
    TableError::NullValue {
        column: column.to_string(),
        row,
    }
}

fn unsupported(column: &str, col: &dyn Array) -> TableError {
    TableError::UnsupportedType {
        column: column.to_string(),
        data_type: col.data_type().clone(),
    }
}

fn is_string_type(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Utf8 | DataType::LargeUtf8)
}

/// Extract a string value (handles Utf8 and LargeUtf8).
fn optional_str<'a>(
    col: &'a dyn Array,
    name: &str,
    row: usize,
) -> Result<Option<&'a str>, TableError> {
    if col.is_null(row) {
        return Ok(None);
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Ok(Some(arr.value(row)));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(Some(arr.value(row)));
    }
    Err(unsupported(name, col))
}

fn string_values(batch: &RecordBatch, name: &str) -> Result<Vec<String>, TableError> {
    let col = column(batch, name)?;
    (0..col.len())
        .map(|row| {
            optional_str(col.as_ref(), name, row)?
                .map(str::to_string)
                .ok_or_else(|| null_value(name, row))
        })
        .collect()
}

/// Like [`string_values`] but tolerates a missing column and null cells.
fn optional_string_values(
    batch: &RecordBatch,
    name: &str,
) -> Result<Option<Vec<Option<String>>>, TableError> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let values = (0..col.len())
        .map(|row| Ok(optional_str(col.as_ref(), name, row)?.map(str::to_string)))
        .collect::<Result<Vec<_>, TableError>>()?;
    Ok(Some(values))
}

fn int_values(batch: &RecordBatch, name: &str) -> Result<Vec<i64>, TableError> {
    let col = column(batch, name)?;
    let data_type = col.data_type();

    if is_string_type(data_type) {
        return (0..col.len())
            .map(|row| {
                let text = optional_str(col.as_ref(), name, row)?
                    .ok_or_else(|| null_value(name, row))?;
                parse_int(text).ok_or_else(|| TableError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: text.to_string(),
                    expected: "integer",
                })
            })
            .collect();
    }

    if !data_type.is_integer() {
        return Err(unsupported(name, col.as_ref()));
    }

    let widened = cast(col, &DataType::Int64)?;
    let arr = widened
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| unsupported(name, col.as_ref()))?;
    (0..arr.len())
        .map(|row| {
            if arr.is_null(row) {
                Err(null_value(name, row))
            } else {
                Ok(arr.value(row))
            }
        })
        .collect()
}

fn float_values(batch: &RecordBatch, name: &str) -> Result<Vec<f64>, TableError> {
    let col = column(batch, name)?;
    let data_type = col.data_type();

    if is_string_type(data_type) {
        return (0..col.len())
            .map(|row| {
                let text = optional_str(col.as_ref(), name, row)?
                    .ok_or_else(|| null_value(name, row))?;
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| TableError::InvalidValue {
                        column: name.to_string(),
                        row,
                        value: text.to_string(),
                        expected: "number",
                    })
            })
            .collect();
    }

    if !data_type.is_numeric() {
        return Err(unsupported(name, col.as_ref()));
    }

    let widened = cast(col, &DataType::Float64)?;
    let arr = widened
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| unsupported(name, col.as_ref()))?;
    (0..arr.len())
        .map(|row| {
            if arr.is_null(row) {
                Err(null_value(name, row))
            } else {
                Ok(arr.value(row))
            }
        })
        .collect()
}

/// Parse an integer cell, accepting float spellings of whole numbers ("2024.0").
fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let f = text.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}
