//! Mapping export and mapped-file output.
//!
//! The mappings file lists one row per source column with the template
//! labels it was detected as and the raw field keys. Applying it to an input
//! file produces a CSV whose headers are the template labels.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use roster_model::{DetectedAs, FieldKind, MappingRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Header row of the mappings file.
pub const MAPPING_HEADERS: [&str; 3] = ["Column Name", "Detected As", "Raw Type"];

#[derive(Debug, Serialize, Deserialize)]
struct MappingRow {
    #[serde(rename = "Column Name")]
    column_name: String,
    #[serde(rename = "Detected As", default)]
    detected_as: String,
    #[serde(rename = "Raw Type", default)]
    raw_type: String,
}

impl From<&MappingRecord> for MappingRow {
    fn from(record: &MappingRecord) -> Self {
        Self {
            column_name: record.column_name.clone(),
            detected_as: record.detected_as.readable(),
            raw_type: record.detected_as.raw(),
        }
    }
}

impl MappingRow {
    /// Parses `Raw Type`, falling back to the readable labels when it is blank.
    fn into_record(self) -> Result<Option<MappingRecord>> {
        let column_name = self.column_name.trim().to_string();
        let source = if self.raw_type.trim().is_empty() {
            &self.detected_as
        } else {
            &self.raw_type
        };
        let fields = source
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<FieldKind>()
                    .with_context(|| format!("mapping for column {column_name}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if column_name.is_empty() || fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(MappingRecord {
            column_name,
            detected_as: DetectedAs::from_fields(fields),
        }))
    }
}

/// Writes the mappings file to any writer. The header row is written even
/// when there are no records.
pub fn write_mappings<W: Write>(records: &[MappingRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(MAPPING_HEADERS)?;
    for record in records {
        writer.serialize(MappingRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_mappings_csv(records: &[MappingRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Creating mappings file {}", path.display()))?;
    write_mappings(records, file)
        .with_context(|| format!("Writing mappings file {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "wrote mappings");
    Ok(())
}

/// Reads a mappings file. Rows without a column name or field are skipped.
pub fn read_mappings<R: Read>(reader: R) -> Result<Vec<MappingRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    if !headers.iter().any(|header| header == MAPPING_HEADERS[0]) {
        return Err(anyhow!(
            "mappings file must have a {:?} column",
            MAPPING_HEADERS[0]
        ));
    }
    let mut records = Vec::new();
    for row in reader.deserialize::<MappingRow>() {
        if let Some(record) = row?.into_record()? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn read_mappings_csv(path: &Path) -> Result<Vec<MappingRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Opening mappings file {}", path.display()))?;
    read_mappings(file).with_context(|| format!("Reading mappings file {}", path.display()))
}

/// Output columns of a mapped file and the source column of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedLayout {
    fields: Vec<(FieldKind, String)>,
    split_names: Option<String>,
}

impl MappedLayout {
    /// Builds the layout from records in order. When several columns claim
    /// one field the first one wins.
    pub fn from_records(records: &[MappingRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for record in records {
            for field in record.detected_as.fields() {
                if seen.insert(field) {
                    fields.push((field, record.column_name.clone()));
                }
            }
        }
        let source_of = |wanted: FieldKind| {
            fields
                .iter()
                .find(|(field, _)| *field == wanted)
                .map(|(_, column)| column.clone())
        };
        let split_names = match (
            source_of(FieldKind::FirstName),
            source_of(FieldKind::LastName),
        ) {
            (Some(first), Some(last)) if first == last => Some(first),
            _ => None,
        };
        Self {
            fields,
            split_names,
        }
    }

    /// Template labels in output order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(field, _)| field.label()).collect()
    }

    pub fn source_for(&self, field: FieldKind) -> Option<&str> {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, column)| column.as_str())
    }

    /// Column holding full names when first and last name share it.
    pub fn split_column(&self) -> Option<&str> {
        self.split_names.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome of writing a mapped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Column whose values were split into first and last name.
    pub split_column: Option<String>,
    /// Mapped source columns absent from the input; their output is blank.
    pub missing_columns: Vec<String>,
}

/// Splits a full name into its first word and the rest.
pub fn split_full_name(value: &str) -> (String, String) {
    let mut words = value.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Keeps ASCII letters, digits, whitespace and periods, then trims.
pub fn strip_name_symbols(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '.')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Copies every input row into the layout's columns. Returns the number of
/// data rows written and the mapped source columns missing from the input.
pub fn map_records<R: Read, W: Write>(
    layout: &MappedLayout,
    reader: &mut csv::Reader<R>,
    writer: &mut csv::Writer<W>,
) -> Result<(usize, Vec<String>)> {
    let headers = reader.headers()?.clone();
    let sources: Vec<Option<usize>> = layout
        .fields
        .iter()
        .map(|(_, column)| {
            headers
                .iter()
                .position(|header| header.trim() == column.trim())
        })
        .collect();
    let mut missing = Vec::new();
    for ((field, column), source) in layout.fields.iter().zip(&sources) {
        if source.is_none() {
            warn!(field = %field, column = %column, "mapped column not in input");
            if !missing.contains(column) {
                missing.push(column.clone());
            }
        }
    }

    writer.write_record(layout.headers())?;
    let mut record = csv::StringRecord::new();
    let mut rows = 0usize;
    let mut output = Vec::with_capacity(layout.fields.len());
    while reader.read_record(&mut record)? {
        output.clear();
        for ((field, column), source) in layout.fields.iter().zip(&sources) {
            let value = source.and_then(|index| record.get(index)).unwrap_or("");
            let value = match field {
                FieldKind::FirstName | FieldKind::LastName => {
                    let value = if layout.split_column() == Some(column.as_str()) {
                        let (first, rest) = split_full_name(value);
                        if *field == FieldKind::FirstName {
                            first
                        } else {
                            rest
                        }
                    } else {
                        value.to_string()
                    };
                    strip_name_symbols(&value)
                }
                _ => value.to_string(),
            };
            output.push(value);
        }
        writer.write_record(&output)?;
        rows += 1;
    }
    writer.flush()?;
    Ok((rows, missing))
}

/// Applies `records` to the CSV at `input` and writes the mapped file.
pub fn map_csv(records: &[MappingRecord], input: &Path, output: &Path) -> Result<MappedSummary> {
    let layout = MappedLayout::from_records(records);
    if layout.is_empty() {
        return Err(anyhow!("no mapped fields to write"));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("Opening CSV file {}", input.display()))?;
    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Creating mapped file {}", output.display()))?;
    let (rows, missing_columns) = map_records(&layout, &mut reader, &mut writer)
        .with_context(|| format!("Writing mapped file {}", output.display()))?;
    if let Some(column) = layout.split_column() {
        info!(column, "split full names into first and last name");
    }
    info!(
        output = %output.display(),
        rows,
        columns = layout.fields.len(),
        "wrote mapped file"
    );
    Ok(MappedSummary {
        output: output.to_path_buf(),
        rows,
        columns: layout.fields.len(),
        split_column: layout.split_column().map(str::to_string),
        missing_columns,
    })
}
