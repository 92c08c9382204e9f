//! Source columns handed over by the spreadsheet reader.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw scalar sampled from a source column.
///
/// Deserialises from any JSON scalar, so `"x"`, `1`, `1.5`, `true` and `null`
/// are all accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Coerces the value to text for pattern matching.
    ///
    /// Whole floats drop the fractional part so that a numeric identifier
    /// read as `1417469156.0` still looks like ten digits. Missing values
    /// become the empty string, which no value predicate accepts.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e18 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            CellValue::Bool(value) => value.to_string(),
            CellValue::Missing => String::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One source spreadsheet column: its header and a sample of its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// A sample of the column, not the full data. May be empty, which only
    /// disables value-pattern checks.
    #[serde(default)]
    pub examples: Vec<CellValue>,
}

impl Column {
    pub fn new<I, V>(name: impl Into<String>, examples: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            examples: examples.into_iter().map(Into::into).collect(),
        }
    }

    /// A column with a header and no sampled values.
    pub fn header_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            examples: Vec::new(),
        }
    }

    /// The sampled values coerced to text.
    pub fn example_texts(&self) -> Vec<String> {
        self.examples.iter().map(CellValue::to_text).collect()
    }

    pub fn has_examples(&self) -> bool {
        !self.examples.is_empty()
    }
}
