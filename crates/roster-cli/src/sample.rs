//! CSV sampling: headers plus the first rows of each column.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use roster_model::{CellValue, Column};
use tracing::debug;

/// Reads the header row and up to `rows` data rows of a CSV file.
pub fn sample_csv(path: &Path, rows: usize) -> Result<Vec<Column>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Opening CSV file {}", path.display()))?;
    let columns = sample_reader(reader, rows)
        .with_context(|| format!("Reading CSV file {}", path.display()))?;
    debug!(
        path = %path.display(),
        columns = columns.len(),
        "sampled columns"
    );
    Ok(columns)
}

/// Samples an open reader. Blank cells are skipped and values are kept as
/// text; rows shorter than the header leave the missing columns untouched.
pub fn sample_reader<R: Read>(mut reader: csv::Reader<R>, rows: usize) -> Result<Vec<Column>> {
    let headers = reader.headers()?.clone();
    let mut columns: Vec<Column> = headers.iter().map(Column::header_only).collect();

    let mut record = csv::StringRecord::new();
    let mut processed = 0usize;
    while processed < rows && reader.read_record(&mut record)? {
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            let value = field.trim();
            if value.is_empty() {
                continue;
            }
            column.examples.push(CellValue::Text(value.to_string()));
        }
        processed += 1;
    }
    Ok(columns)
}
