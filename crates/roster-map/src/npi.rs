//! Identifier (NPI) detection and confidence.
//!
//! The identifier's only strong signal is a ten-digit shape that many
//! unrelated numeric columns share, so instead of stopping at the first
//! plausible column every column is scored and the best one is adopted.

use roster_model::{Column, Confidence, Detection, FieldKind, MatchType};
use tracing::debug;

use crate::knowledge::{MappingStore, StoreMutation};
use crate::utils::{is_all_digits, is_digits_spaces_dashes, is_ten_digits, normalize_name};

const HEADER_BONUS: f64 = 30.0;
const TEN_DIGIT_WEIGHT: f64 = 70.0;
const FORMATTED_WEIGHT: f64 = 50.0;
const WRONG_LENGTH_PENALTY: f64 = 20.0;
const OTHER_PENALTY: f64 = 40.0;

/// Outcome of a detector run: the match, if any, and the store writes the
/// caller should apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub detection: Option<Detection>,
    pub mutations: Vec<StoreMutation>,
}

impl Classification {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn column_name(&self) -> Option<&str> {
        self.detection
            .as_ref()
            .map(|detection| detection.column_name.as_str())
    }
}

/// The column adopted as identifier and how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpiSelection {
    /// Position of the column in the input.
    pub index: usize,
    pub match_type: MatchType,
    /// Stored confidence for knowledge hits, total pattern score otherwise.
    pub score: f64,
}

/// Points one example contributes and whether it keeps the column perfect.
fn score_example(text: &str) -> (u32, bool) {
    let text = text.trim();
    if is_ten_digits(text) {
        return (3, true);
    }
    if is_digits_spaces_dashes(text) {
        let digits = text.chars().filter(char::is_ascii_digit).count();
        if digits == 10 {
            return (2, true);
        }
    }
    if is_all_digits(text) {
        return (1, false);
    }
    (0, false)
}

/// Picks the identifier column without touching the store.
///
/// The first column known to the store wins outright. Otherwise columns are
/// scored in order; a column whose every example is a ten-digit or
/// formatted ten-digit value is adopted immediately, else the strictly
/// highest total wins, ties keeping the earlier column. Columns without
/// examples are never scored, and a best total of zero adopts nothing.
pub fn select_npi_column(columns: &[Column], store: &dyn MappingStore) -> Option<NpiSelection> {
    for (index, column) in columns.iter().enumerate() {
        if let Some(entry) = store.find(FieldKind::Npi, &column.name) {
            debug!(column = %column.name, "identifier known to knowledge base");
            return Some(NpiSelection {
                index,
                match_type: MatchType::KnowledgeBase,
                score: entry.confidence.value(),
            });
        }
    }

    let mut best: Option<(usize, u32)> = None;
    for (index, column) in columns.iter().enumerate() {
        if !column.has_examples() {
            continue;
        }
        let mut score = 0u32;
        let mut perfect = true;
        for example in &column.examples {
            let (points, keeps_perfect) = score_example(&example.to_text());
            score += points;
            perfect &= keeps_perfect;
        }
        debug!(column = %column.name, score, perfect, "identifier candidate scored");

        if perfect && score as usize >= 2 * column.examples.len() {
            return Some(NpiSelection {
                index,
                match_type: MatchType::ValuePattern,
                score: f64::from(score),
            });
        }
        if score > best.map_or(0, |(_, top)| top) {
            best = Some((index, score));
        }
    }

    best.map(|(index, score)| NpiSelection {
        index,
        match_type: MatchType::ValuePattern,
        score: f64::from(score),
    })
}

/// Detects the identifier column.
///
/// A column adopted by scoring is also returned as a store mutation, unless
/// the identifier category already holds an entry under that name.
pub fn detect_npi(columns: &[Column], store: &dyn MappingStore) -> Classification {
    let Some(selection) = select_npi_column(columns, store) else {
        return Classification::none();
    };
    let column = &columns[selection.index];

    let mut mutations = Vec::new();
    let confidence = match selection.match_type {
        MatchType::KnowledgeBase => Confidence::new(selection.score),
        _ => {
            if store.find(FieldKind::Npi, &column.name).is_none() {
                mutations.push(StoreMutation::new(
                    FieldKind::Npi,
                    &column.name,
                    Confidence::new(selection.score),
                    MatchType::ValuePattern,
                ));
            }
            npi_confidence(column)
        }
    };

    Classification {
        detection: Some(
            Detection::new(&column.name, selection.match_type).with_confidence(confidence),
        ),
        mutations,
    }
}

/// Display confidence that `column` holds identifiers, in `[0, 100]`.
///
/// Used for ranking only; [`detect_npi`] does not consult it.
pub fn npi_confidence(column: &Column) -> Confidence {
    let mut raw = 0.0;
    if normalize_name(&column.name).contains("npi") {
        raw += HEADER_BONUS;
    }
    let count = column.examples.len() as f64;
    for example in &column.examples {
        let text = example.to_text();
        let text = text.trim();
        raw += if is_ten_digits(text) {
            TEN_DIGIT_WEIGHT / count
        } else if is_digits_spaces_dashes(text) && text.chars().count() >= 10 {
            FORMATTED_WEIGHT / count
        } else if is_all_digits(text) {
            -WRONG_LENGTH_PENALTY / count
        } else {
            -OTHER_PENALTY / count
        };
    }
    Confidence::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    #[test]
    fn example_tiers() {
        assert_eq!(score_example("1234567890"), (3, true));
        assert_eq!(score_example("123-456-7890"), (2, true));
        assert_eq!(score_example("123 456 7890"), (2, true));
        assert_eq!(score_example("12345"), (1, false));
        assert_eq!(score_example("12-34"), (0, false));
        assert_eq!(score_example("NPI1234567"), (0, false));
        assert_eq!(score_example(""), (0, false));
    }

    #[test]
    fn highest_score_wins_when_nothing_is_perfect() {
        let store = KnowledgeBase::new();
        let columns = vec![
            Column::new("Phone", vec!["5551234567890", "abc"]),
            Column::new("Provider", vec!["1234567890", "n/a", "9876543210"]),
        ];
        let selection = select_npi_column(&columns, &store).unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(selection.score, 6.0);
    }

    #[test]
    fn ties_keep_first_column() {
        let store = KnowledgeBase::new();
        let columns = vec![
            Column::new("A", vec!["12345", "x"]),
            Column::new("B", vec!["x", "67890"]),
        ];
        let selection = select_npi_column(&columns, &store).unwrap();
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn zero_scores_adopt_nothing() {
        let store = KnowledgeBase::new();
        let columns = vec![Column::new("Notes", vec!["hello", "world"])];
        assert!(select_npi_column(&columns, &store).is_none());
    }

    #[test]
    fn header_only_columns_are_not_adopted() {
        let store = KnowledgeBase::new();
        let columns = vec![Column::header_only("Empty"), Column::new("Id", vec!["42"])];
        let selection = select_npi_column(&columns, &store).unwrap();
        assert_eq!(selection.index, 1);
    }

    #[test]
    fn confidence_formatted_values() {
        let column = Column::new("Identifier", vec!["123-456-7890", "1234567890"]);
        // 50/2 + 70/2
        assert_eq!(npi_confidence(&column).value(), 60.0);
    }

    #[test]
    fn confidence_header_only() {
        assert_eq!(npi_confidence(&Column::header_only("Provider NPI")).value(), 30.0);
        assert_eq!(npi_confidence(&Column::header_only("Other")).value(), 0.0);
    }
}
