//! Terminal display for pipeline tables.
//!
//! Prints a short summary card (rows per conference, year span) followed by
//! the first rows of the table, optionally restricted to one conference.

use std::collections::BTreeMap;

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use paperpulse_core::Conference;
use paperpulse_core::tables::{CONFERENCE, YEAR};

// ── Public API ──

/// Print a table: summary card, then up to `limit` rows.
pub fn print_table(
    batches: &[RecordBatch],
    conference: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let selected = match conference {
        Some(name) => filter_conference(batches, &Conference::parse(name))?,
        None => batches.to_vec(),
    };

    print_summary(&selected)?;

    let total: usize = selected.iter().map(|b| b.num_rows()).sum();
    let shown = take_rows(&selected, limit);
    if shown.is_empty() {
        println!("(no rows)");
        return Ok(());
    }
    println!("{}", pretty_format_batches(&shown)?);
    if total > limit {
        println!("... {} of {} rows shown", limit, total);
    }
    Ok(())
}

// ── Summary card ──

fn print_summary(batches: &[RecordBatch]) -> anyhow::Result<()> {
    let mut per_conference: BTreeMap<String, usize> = BTreeMap::new();
    let mut years: Option<(i64, i64)> = None;

    for batch in batches {
        if let Some(confs) = utf8_column(batch, CONFERENCE)? {
            for i in (0..confs.len()).filter(|&i| !confs.is_null(i)) {
                *per_conference.entry(confs.value(i).to_string()).or_default() += 1;
            }
        }
        if let Some(values) = utf8_column(batch, YEAR)? {
            for year in (0..values.len())
                .filter(|&i| !values.is_null(i))
                .filter_map(|i| values.value(i).trim().parse::<f64>().ok())
                .map(|y| y as i64)
            {
                years = Some(match years {
                    Some((lo, hi)) => (lo.min(year), hi.max(year)),
                    None => (year, year),
                });
            }
        }
    }

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    println!("=== {rows} rows ===");
    if let Some((lo, hi)) = years {
        println!("  {:<26} {lo}..={hi}", "years");
    }
    for (conf, n) in &per_conference {
        println!("  {:<26} {n}", conf);
    }
    println!();
    Ok(())
}

// ── Helpers ──

/// A column cast to `Utf8`, or `None` if the table has no such column.
fn utf8_column(batch: &RecordBatch, name: &str) -> anyhow::Result<Option<StringArray>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let as_text = cast(col, &DataType::Utf8)?;
    Ok(as_text.as_any().downcast_ref::<StringArray>().cloned())
}

fn filter_conference(
    batches: &[RecordBatch],
    conference: &Conference,
) -> anyhow::Result<Vec<RecordBatch>> {
    let mut out = Vec::with_capacity(batches.len());
    for batch in batches {
        let confs = utf8_column(batch, CONFERENCE)?
            .ok_or_else(|| anyhow::anyhow!("table has no '{CONFERENCE}' column"))?;
        let mask: BooleanArray = (0..confs.len())
            .map(|i| Some(!confs.is_null(i) && Conference::parse(confs.value(i)) == *conference))
            .collect();
        out.push(filter_record_batch(batch, &mask)?);
    }
    Ok(out)
}

fn take_rows(batches: &[RecordBatch], limit: usize) -> Vec<RecordBatch> {
    let mut remaining = limit;
    let mut out = Vec::new();
    for batch in batches {
        if remaining == 0 {
            break;
        }
        let n = batch.num_rows().min(remaining);
        if n > 0 {
            out.push(batch.slice(0, n));
            remaining -= n;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperpulse_core::table::paper_counts_to_batch;
    use paperpulse_core::ConferenceYearCount;

    fn sample() -> RecordBatch {
        let rows: Vec<ConferenceYearCount> = [("CVPR", 2023, 10), ("KDD", 2023, 4), ("CVPR", 2024, 12)]
            .into_iter()
            .map(|(c, year, count)| ConferenceYearCount {
                conference: Conference::parse(c),
                year,
                count,
            })
            .collect();
        paper_counts_to_batch(&rows).unwrap()
    }

    #[test]
    fn filters_by_conference_case_insensitively() {
        let filtered = filter_conference(&[sample()], &Conference::parse("cvpr")).unwrap();
        assert_eq!(filtered[0].num_rows(), 2);
    }

    #[test]
    fn take_rows_spans_batches() {
        let batches = vec![sample(), sample()];
        let taken = take_rows(&batches, 4);
        assert_eq!(taken.iter().map(|b| b.num_rows()).sum::<usize>(), 4);
        assert_eq!(taken.len(), 2);
        assert!(take_rows(&batches, 0).is_empty());
    }

    #[test]
    fn integer_columns_read_as_text() {
        let years = utf8_column(&sample(), YEAR).unwrap().unwrap();
        assert_eq!(years.value(2), "2024");
        assert!(utf8_column(&sample(), "missing").unwrap().is_none());
    }

    #[test]
    fn filtering_without_conference_column_errors() {
        let batch = sample().project(&[1, 2]).unwrap();
        assert!(filter_conference(&[batch], &Conference::Kdd).is_err());
    }
}
