//! Generic short-circuit rule pipeline.
//!
//! Every field except the identifier is detected the same way: scan the
//! columns in the order given, and for each column try the field's rules in
//! priority order. The first column that satisfies any rule wins and the
//! remaining columns are never looked at.
//!
//! Rule priority per column:
//!
//! 1. knowledge base
//! 2. header keywords
//! 3. header pattern (state only)
//! 4. value pattern, skipped when the column has no examples

use std::sync::LazyLock;

use regex::Regex;
use roster_model::{Column, Confidence, Detection, FieldKind, MatchType};
use tracing::{debug, trace};

use crate::knowledge::MappingStore;
use crate::lexicon::Lexicon;
use crate::utils::{normalize_name, split_on_comma_semicolon_whitespace, split_tokens};

/// Confidence reported for an exact header match.
pub const EXACT_HEADER_CONFIDENCE: f64 = 100.0;
/// Confidence reported for a partial header match.
pub const PARTIAL_HEADER_CONFIDENCE: f64 = 70.0;

/// `state`, `st` or `st.` as whole words.
static STATE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bstate\b|\bst\b\.?").expect("Invalid state header regex"));

/// Predicate applied to each sampled value of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePredicate {
    /// The value is a gender token.
    Gender,
    /// Some comma/semicolon/whitespace token is a credential suffix.
    ProfessionalSuffix,
    /// URL, image file name or image-related keyword.
    Headshot,
    /// Some comma/semicolon/plus token is a language.
    Languages,
    /// Two-letter US state or DC code.
    UsState,
    /// Starts with the practice cloud id prefix, case-insensitively.
    PracticeCloudId,
    /// Some comma/semicolon piece names a patient population.
    PatientsAccepted,
}

impl ValuePredicate {
    pub fn matches(&self, value: &str, lexicon: &Lexicon) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match self {
            ValuePredicate::Gender => lexicon.is_gender_token(value),
            ValuePredicate::ProfessionalSuffix => split_on_comma_semicolon_whitespace(value)
                .any(|token| lexicon.is_suffix_token(token)),
            ValuePredicate::Headshot => looks_like_image(value, lexicon),
            ValuePredicate::Languages => {
                split_tokens(value, &[',', ';', '+']).any(|token| lexicon.is_language_token(token))
            }
            ValuePredicate::UsState => lexicon.is_us_state(value),
            ValuePredicate::PracticeCloudId => value
                .to_lowercase()
                .starts_with(lexicon.practice_cloud_id_prefix()),
            ValuePredicate::PatientsAccepted => split_tokens(value, &[',', ';']).any(|part| {
                let part = part.to_lowercase();
                lexicon
                    .patients_accepted_tokens()
                    .iter()
                    .any(|token| part.contains(token.as_str()))
            }),
        }
    }
}

fn looks_like_image(value: &str, lexicon: &Lexicon) -> bool {
    let lower = value.to_lowercase();
    lexicon
        .url_prefixes()
        .iter()
        .any(|prefix| lower.starts_with(prefix.as_str()))
        || lexicon
            .image_extensions()
            .iter()
            .any(|extension| lower.ends_with(extension.as_str()))
        || lexicon
            .image_keywords()
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
}

/// One rule of a field's pipeline.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The store's category for the field knows the column name.
    KnowledgeBase,
    /// The header equals or bidirectionally contains a lexicon keyword.
    HeaderKeywords,
    /// The header matches a regular expression.
    HeaderPattern(Regex),
    /// At least `threshold` of the examples satisfy `predicate`.
    ValuePattern {
        predicate: ValuePredicate,
        threshold: f64,
    },
}

/// The ordered rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: FieldKind,
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new(field: FieldKind, rules: Vec<Rule>) -> Self {
        Self { field, rules }
    }

    /// The standard pipeline for `field`.
    pub fn for_field(field: FieldKind) -> Self {
        let mut rules = vec![Rule::KnowledgeBase, Rule::HeaderKeywords];
        if field == FieldKind::State {
            rules.push(Rule::HeaderPattern(STATE_HEADER_REGEX.clone()));
        }
        if let Some((predicate, threshold)) = value_rule(field) {
            rules.push(Rule::ValuePattern {
                predicate,
                threshold,
            });
        }
        Self::new(field, rules)
    }

    pub fn field(&self) -> FieldKind {
        self.field
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the first column, in input order, that satisfies any rule.
    pub fn evaluate(
        &self,
        columns: &[Column],
        store: &dyn MappingStore,
        lexicon: &Lexicon,
    ) -> Option<Detection> {
        for column in columns {
            for rule in &self.rules {
                if let Some(detection) = self.apply_rule(rule, column, store, lexicon) {
                    debug!(
                        field = %self.field,
                        column = %column.name,
                        match_type = %detection.match_type,
                        "field detected"
                    );
                    return Some(detection);
                }
            }
        }
        trace!(field = %self.field, columns = columns.len(), "no column matched");
        None
    }

    fn apply_rule(
        &self,
        rule: &Rule,
        column: &Column,
        store: &dyn MappingStore,
        lexicon: &Lexicon,
    ) -> Option<Detection> {
        match rule {
            Rule::KnowledgeBase => store.find(self.field, &column.name).map(|entry| {
                Detection::new(&column.name, MatchType::KnowledgeBase)
                    .with_confidence(entry.confidence)
            }),
            Rule::HeaderKeywords => {
                header_keyword_match(&column.name, lexicon.header_keywords(self.field))
                    .map(|match_type| header_detection(&column.name, match_type))
            }
            Rule::HeaderPattern(pattern) => {
                let header = normalize_name(&column.name);
                if header.is_empty() || !pattern.is_match(&header) {
                    return None;
                }
                let exact = lexicon
                    .header_keywords(self.field)
                    .iter()
                    .any(|keyword| *keyword == header);
                let match_type = if exact {
                    MatchType::ExactHeader
                } else {
                    MatchType::PartialHeader
                };
                Some(header_detection(&column.name, match_type))
            }
            Rule::ValuePattern {
                predicate,
                threshold,
            } => {
                let ratio = match_ratio(column, *predicate, lexicon)?;
                (ratio >= *threshold).then(|| {
                    Detection::new(&column.name, MatchType::ValuePattern)
                        .with_confidence(Confidence::new(ratio * 100.0))
                })
            }
        }
    }
}

/// Value rule and threshold of each field that has one.
pub fn value_rule(field: FieldKind) -> Option<(ValuePredicate, f64)> {
    match field {
        FieldKind::Gender => Some((ValuePredicate::Gender, 0.5)),
        FieldKind::ProfessionalSuffix => Some((ValuePredicate::ProfessionalSuffix, 0.4)),
        FieldKind::Headshot => Some((ValuePredicate::Headshot, 0.5)),
        FieldKind::AdditionalLanguages => Some((ValuePredicate::Languages, 0.4)),
        FieldKind::State => Some((ValuePredicate::UsState, 0.5)),
        FieldKind::PracticeCloudId => Some((ValuePredicate::PracticeCloudId, 0.5)),
        FieldKind::PatientsAccepted => Some((ValuePredicate::PatientsAccepted, 0.4)),
        _ => None,
    }
}

/// Compares a header with the field's keywords.
///
/// Returns `ExactHeader` when the normalised header equals a keyword and
/// `PartialHeader` when one contains the other. An empty header never
/// matches.
pub fn header_keyword_match(header: &str, keywords: &[String]) -> Option<MatchType> {
    let header = normalize_name(header);
    if header.is_empty() {
        return None;
    }
    if keywords.iter().any(|keyword| *keyword == header) {
        return Some(MatchType::ExactHeader);
    }
    keywords
        .iter()
        .any(|keyword| header.contains(keyword.as_str()) || keyword.contains(header.as_str()))
        .then_some(MatchType::PartialHeader)
}

/// Fraction of a column's examples satisfying `predicate`, or `None` when
/// the column has no examples.
pub fn match_ratio(column: &Column, predicate: ValuePredicate, lexicon: &Lexicon) -> Option<f64> {
    if !column.has_examples() {
        return None;
    }
    let total = column.examples.len();
    let hits = column
        .examples
        .iter()
        .filter(|value| predicate.matches(&value.to_text(), lexicon))
        .count();
    Some(hits as f64 / total as f64)
}

fn header_detection(column_name: &str, match_type: MatchType) -> Detection {
    let confidence = match match_type {
        MatchType::ExactHeader => EXACT_HEADER_CONFIDENCE,
        _ => PARTIAL_HEADER_CONFIDENCE,
    };
    Detection::new(column_name, match_type).with_confidence(Confidence::new(confidence))
}
