//! Detection outcomes and learned-mapping entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RosterError;
use crate::field::FieldKind;

/// Which rule produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// The learned-mapping store already knew the column name.
    KnowledgeBase,
    /// The header equals a curated keyword.
    ExactHeader,
    /// The header contains a curated keyword, or the other way round.
    PartialHeader,
    /// Enough sampled values satisfied the field's value predicate.
    ValuePattern,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::KnowledgeBase => "knowledge-base",
            MatchType::ExactHeader => "exact-header",
            MatchType::PartialHeader => "partial-header",
            MatchType::ValuePattern => "value-pattern",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "knowledge-base" => Ok(MatchType::KnowledgeBase),
            "exact-header" => Ok(MatchType::ExactHeader),
            "partial-header" => Ok(MatchType::PartialHeader),
            "value-pattern" => Ok(MatchType::ValuePattern),
            _ => Err(RosterError::UnknownMatchType(s.to_string())),
        }
    }
}

/// A confidence score, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const MIN: Confidence = Confidence(0.0);
    pub const MAX: Confidence = Confidence(100.0);

    /// Builds a confidence, clamping to `[0, 100]`. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Confidence(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The greater of two confidences.
    pub fn max(self, other: Confidence) -> Confidence {
        if other.0 > self.0 { other } else { self }
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Confidence::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}", self.0)
    }
}

/// A column matched to a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub column_name: String,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Detection {
    pub fn new(column_name: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            column_name: column_name.into(),
            match_type,
            confidence: None,
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A remembered column-name to field association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    /// Lower-cased, trimmed column header.
    pub normalized_name: String,
    pub confidence: Confidence,
    pub match_type: MatchType,
}

/// A detection paired with the field it was made for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: FieldKind,
    pub detection: Detection,
}
