//! Identifier ranking for column-picker views.

use std::cmp::Ordering;

use roster_model::{CellValue, Column, Confidence, FieldKind, MatchType};
use serde::Serialize;

use crate::knowledge::MappingStore;
use crate::npi::{npi_confidence, select_npi_column};

/// Confidence level categories for displaying identifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Display thresholds on the `[0, 100]` confidence scale.
///
/// - Below `low`: no level
/// - `low` to `medium`: [`ConfidenceLevel::Low`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - At or above `high`: [`ConfidenceLevel::High`]
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 90.0,
            medium: 60.0,
            low: 30.0,
        }
    }
}

impl ConfidenceThresholds {
    #[must_use]
    pub fn categorize(&self, confidence: Confidence) -> Option<ConfidenceLevel> {
        let value = confidence.value();
        if value >= self.high {
            Some(ConfidenceLevel::High)
        } else if value >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if value >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// A column annotated for the identifier picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedColumn {
    /// Column header as given.
    pub name: String,
    /// Sampled values, unchanged.
    pub examples: Vec<CellValue>,
    /// Larger of the stored and the computed identifier confidence.
    pub confidence: Confidence,
    /// True for the single column the identifier detector would adopt.
    pub is_identifier_column: bool,
    /// How the column was recognised as the identifier, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
}

/// Annotates columns with identifier confidence and orders them for
/// display.
///
/// Confidence is the larger of the stored identifier confidence and the
/// computed display confidence. The adopted column sorts first, the rest by
/// descending confidence; the sort is stable, so equal columns keep their
/// input order. The store is not modified.
pub fn rank_columns(columns: &[Column], store: &dyn MappingStore) -> Vec<RankedColumn> {
    let selection = select_npi_column(columns, store);

    let mut ranked: Vec<RankedColumn> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let stored = store.find(FieldKind::Npi, &column.name);
            let computed = npi_confidence(column);
            let confidence = stored.map_or(computed, |entry| entry.confidence.max(computed));
            let is_identifier_column = selection.is_some_and(|found| found.index == index);
            let match_type = if stored.is_some() {
                Some(MatchType::KnowledgeBase)
            } else if is_identifier_column {
                selection.map(|found| found.match_type)
            } else {
                None
            };
            RankedColumn {
                name: column.name.clone(),
                examples: column.examples.clone(),
                confidence,
                is_identifier_column,
                match_type,
            }
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &RankedColumn, b: &RankedColumn) -> Ordering {
    b.is_identifier_column
        .cmp(&a.is_identifier_column)
        .then_with(|| b.confidence.value().total_cmp(&a.confidence.value()))
}
