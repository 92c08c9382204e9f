//! Mapping session state for interactive mapping workflows.
//!
//! A session holds the classifier's suggestions for one set of columns and
//! the operator's accepted choices, and turns those choices into records and
//! knowledge-base confirmations.

use std::collections::{BTreeMap, HashSet};

use roster_model::{
    Column, Confidence, DetectedAs, Detection, FieldKind, MappingRecord, MatchType,
};

use crate::engine::Classifier;
use crate::error::MapError;
use crate::knowledge::{MappingStore, StoreMutation};

/// An accepted `field -> column` choice.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedMapping {
    pub column_name: String,
    /// How the mapping was found; `None` for manual choices.
    pub match_type: Option<MatchType>,
    pub confidence: Option<Confidence>,
}

/// State of one mapping pass over a set of columns.
#[derive(Debug, Clone)]
pub struct MappingSession {
    columns: Vec<String>,
    suggestions: BTreeMap<FieldKind, Detection>,
    accepted: BTreeMap<FieldKind, AcceptedMapping>,
    mutations: Vec<StoreMutation>,
}

impl MappingSession {
    /// Starts a session by running every detector over `columns`.
    pub fn from_columns(
        classifier: &Classifier,
        columns: &[Column],
        store: &dyn MappingStore,
    ) -> Self {
        let report = classifier.detect_all(columns, store);
        Self {
            columns: report.columns,
            suggestions: report
                .matches
                .into_iter()
                .map(|found| (found.field, found.detection))
                .collect(),
            accepted: BTreeMap::new(),
            mutations: report.mutations,
        }
    }

    /// Store writes requested by the detectors while building suggestions.
    pub fn detector_mutations(&self) -> &[StoreMutation] {
        &self.mutations
    }

    pub fn suggestion_for(&self, field: FieldKind) -> Option<&Detection> {
        self.suggestions.get(&field)
    }

    pub fn accepted_for(&self, field: FieldKind) -> Option<&AcceptedMapping> {
        self.accepted.get(&field)
    }

    pub fn status(&self, field: FieldKind) -> FieldStatus {
        if self.accepted.contains_key(&field) {
            FieldStatus::Accepted
        } else if self.suggestions.contains_key(&field) {
            FieldStatus::Suggested
        } else {
            FieldStatus::Unmapped
        }
    }

    /// Accepts the suggestion for `field`. Returns false if there is none.
    pub fn accept_suggestion(&mut self, field: FieldKind) -> bool {
        let Some(suggestion) = self.suggestions.get(&field) else {
            return false;
        };
        let accepted = AcceptedMapping {
            column_name: suggestion.column_name.clone(),
            match_type: Some(suggestion.match_type),
            confidence: suggestion.confidence,
        };
        self.accepted.insert(field, accepted);
        true
    }

    /// Maps `field` to a column chosen by the operator.
    pub fn accept_manual(&mut self, field: FieldKind, column: &str) -> Result<(), MapError> {
        let Some(column_name) = self.columns.iter().find(|name| name.as_str() == column) else {
            return Err(MapError::ColumnNotFound(column.to_string()));
        };
        let accepted = AcceptedMapping {
            column_name: column_name.clone(),
            match_type: None,
            confidence: None,
        };
        self.accepted.insert(field, accepted);
        Ok(())
    }

    /// Drops the accepted mapping for `field`. Returns false if there was
    /// none.
    pub fn clear(&mut self, field: FieldKind) -> bool {
        self.accepted.remove(&field).is_some()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns not used by any accepted mapping, in input order.
    pub fn available_columns(&self) -> Vec<&str> {
        let used: HashSet<&str> = self
            .accepted
            .values()
            .map(|accepted| accepted.column_name.as_str())
            .collect();
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|name| !used.contains(name))
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        let accepted = self.accepted.len();
        let suggested = self
            .suggestions
            .keys()
            .filter(|field| !self.accepted.contains_key(field))
            .count();
        SessionSummary {
            total_fields: FieldKind::ALL.len(),
            accepted,
            suggested,
            unmapped: FieldKind::ALL.len() - accepted - suggested,
            total_columns: self.columns.len(),
            available_columns: self.available_columns().len(),
        }
    }

    /// Accepted mappings grouped per column, in input column order.
    pub fn to_records(&self) -> Vec<MappingRecord> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                continue;
            }
            let fields: Vec<FieldKind> = self
                .accepted
                .iter()
                .filter(|(_, accepted)| accepted.column_name == *column)
                .map(|(field, _)| *field)
                .collect();
            if !fields.is_empty() {
                records.push(MappingRecord {
                    column_name: column.clone(),
                    detected_as: DetectedAs::from_fields(fields),
                });
            }
        }
        records
    }

    /// Store writes recording every accepted mapping as confirmed.
    ///
    /// Apply them with [`crate::KnowledgeBase::confirm_all`] so names the
    /// store already knows are not duplicated.
    pub fn confirmations(&self) -> Vec<StoreMutation> {
        self.accepted
            .iter()
            .map(|(field, accepted)| {
                StoreMutation::new(
                    *field,
                    &accepted.column_name,
                    Confidence::MAX,
                    accepted.match_type.unwrap_or(MatchType::ExactHeader),
                )
            })
            .collect()
    }
}

/// Status of a field in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Has an accepted mapping.
    Accepted,
    /// Has a suggestion but not yet accepted.
    Suggested,
    /// No mapping or suggestion.
    Unmapped,
}

/// Summary of session counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub total_fields: usize,
    pub accepted: usize,
    /// Suggestions not yet accepted.
    pub suggested: usize,
    pub unmapped: usize,
    pub total_columns: usize,
    /// Columns not used by any accepted mapping.
    pub available_columns: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    fn session() -> MappingSession {
        let columns = vec![
            Column::new("Sex", vec!["M", "F"]),
            Column::new("Provider City", vec!["Boston"]),
            Column::new("Notes", vec!["n/a"]),
        ];
        MappingSession::from_columns(&Classifier::default(), &columns, &KnowledgeBase::new())
    }

    #[test]
    fn statuses_follow_acceptance() {
        let mut session = session();
        assert_eq!(session.status(FieldKind::Gender), FieldStatus::Suggested);
        assert!(session.accept_suggestion(FieldKind::Gender));
        assert_eq!(session.status(FieldKind::Gender), FieldStatus::Accepted);
        assert!(session.clear(FieldKind::Gender));
        assert!(!session.clear(FieldKind::Gender));
        assert_eq!(session.status(FieldKind::Gender), FieldStatus::Suggested);
        assert_eq!(session.status(FieldKind::Headshot), FieldStatus::Unmapped);
    }

    #[test]
    fn manual_choice_requires_known_column() {
        let mut session = session();
        let err = session
            .accept_manual(FieldKind::AdditionalLanguages, "Spoken")
            .unwrap_err();
        assert!(matches!(err, MapError::ColumnNotFound(name) if name == "Spoken"));
        session.accept_manual(FieldKind::AdditionalLanguages, "Notes").unwrap();
        assert_eq!(session.available_columns(), ["Sex", "Provider City"]);
    }

    #[test]
    fn confirmations_use_full_confidence() {
        let mut session = session();
        session.accept_suggestion(FieldKind::Gender);
        session.accept_manual(FieldKind::AdditionalLanguages, "Notes").unwrap();

        let confirmations = session.confirmations();
        assert_eq!(confirmations.len(), 2);
        assert!(confirmations.iter().all(|m| m.confidence == Confidence::MAX));
        let manual = confirmations
            .iter()
            .find(|m| m.field == FieldKind::AdditionalLanguages)
            .unwrap();
        assert_eq!(manual.match_type, MatchType::ExactHeader);
        assert_eq!(manual.normalized_name, "notes");
    }
}
