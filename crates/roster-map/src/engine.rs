//! Column classifier.

use std::collections::BTreeMap;

use roster_model::{Column, DetectedAs, Detection, FieldKind, FieldMatch, MappingRecord};
use tracing::{debug, info_span};

use crate::knowledge::{MappingStore, StoreMutation};
use crate::lexicon::Lexicon;
use crate::npi::{Classification, detect_npi, npi_confidence};
use crate::ranking::{RankedColumn, rank_columns};
use crate::rules::FieldRules;

/// Engine for mapping source columns onto canonical fields.
///
/// One detector per field. The identifier uses full-scan scoring, every
/// other field the short-circuit rule pipeline of [`FieldRules`]. The
/// learned-mapping store is passed into every call and only read; writes
/// come back as [`StoreMutation`]s.
///
/// # Example
///
/// ```
/// use roster_map::{Classifier, KnowledgeBase};
/// use roster_model::{Column, FieldKind};
///
/// let classifier = Classifier::default();
/// let store = KnowledgeBase::new();
/// let columns = vec![Column::new("Col3", vec!["M", "F", "M"])];
/// let result = classifier.detect(FieldKind::Gender, &columns, &store);
/// assert_eq!(result.column_name(), Some("Col3"));
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Lexicon,
    rules: BTreeMap<FieldKind, FieldRules>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Lexicon::embedded().clone())
    }
}

impl Classifier {
    /// Creates a classifier over the given lookup tables.
    pub fn new(lexicon: Lexicon) -> Self {
        let rules = FieldKind::ALL
            .into_iter()
            .filter(|field| !field.is_identifier())
            .map(|field| (field, FieldRules::for_field(field)))
            .collect();
        Self { lexicon, rules }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Rules used for a non-identifier field.
    pub fn rules_for(&self, field: FieldKind) -> Option<&FieldRules> {
        self.rules.get(&field)
    }

    /// Runs the detector for one field.
    pub fn detect(
        &self,
        field: FieldKind,
        columns: &[Column],
        store: &dyn MappingStore,
    ) -> Classification {
        if field.is_identifier() {
            return detect_npi(columns, store);
        }
        let detection = self
            .rules
            .get(&field)
            .and_then(|rules| rules.evaluate(columns, store, &self.lexicon));
        Classification {
            detection,
            mutations: Vec::new(),
        }
    }

    /// Runs the identifier detector.
    pub fn detect_npi(&self, columns: &[Column], store: &dyn MappingStore) -> Classification {
        detect_npi(columns, store)
    }

    /// Display confidence that a column holds identifiers.
    pub fn npi_confidence(&self, column: &Column) -> roster_model::Confidence {
        npi_confidence(column)
    }

    /// Runs every field's detector in canonical order.
    ///
    /// Conflicts are not resolved: one column may be reported for several
    /// fields.
    pub fn detect_all(&self, columns: &[Column], store: &dyn MappingStore) -> ClassificationReport {
        let span = info_span!("detect_all", columns = columns.len());
        let _guard = span.enter();

        let mut report = ClassificationReport {
            columns: columns.iter().map(|column| column.name.clone()).collect(),
            ..ClassificationReport::default()
        };
        for field in FieldKind::ALL {
            let Classification {
                detection,
                mutations,
            } = self.detect(field, columns, store);
            match detection {
                Some(detection) => report.matches.push(FieldMatch { field, detection }),
                None => report.unmatched.push(field),
            }
            report.mutations.extend(mutations);
        }
        debug!(
            matched = report.matches.len(),
            unmatched = report.unmatched.len(),
            mutations = report.mutations.len(),
            "classification complete"
        );
        report
    }

    /// Ranks columns by identifier confidence.
    pub fn rank(&self, columns: &[Column], store: &dyn MappingStore) -> Vec<RankedColumn> {
        rank_columns(columns, store)
    }
}

/// Result of running every detector over a set of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationReport {
    /// Input column names, in input order.
    pub columns: Vec<String>,
    /// Fields with a detected column, in canonical order.
    pub matches: Vec<FieldMatch>,
    /// Fields no column was detected for.
    pub unmatched: Vec<FieldKind>,
    /// Store writes requested by the detectors.
    pub mutations: Vec<StoreMutation>,
}

impl ClassificationReport {
    pub fn detection_for(&self, field: FieldKind) -> Option<&Detection> {
        self.matches
            .iter()
            .find(|found| found.field == field)
            .map(|found| &found.detection)
    }

    pub fn unmatched_fields(&self) -> &[FieldKind] {
        &self.unmatched
    }

    /// Matched fields grouped per column, in input column order.
    ///
    /// Columns without any match are left out. Duplicate column names are
    /// reported once.
    pub fn mapping_records(&self) -> Vec<MappingRecord> {
        let mut records = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                continue;
            }
            let fields: Vec<FieldKind> = self
                .matches
                .iter()
                .filter(|found| found.detection.column_name == *column)
                .map(|found| found.field)
                .collect();
            if fields.is_empty() {
                continue;
            }
            records.push(MappingRecord {
                column_name: column.clone(),
                detected_as: DetectedAs::from_fields(fields),
            });
        }
        records
    }
}
