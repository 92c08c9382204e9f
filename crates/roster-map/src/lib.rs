//! Column classification for provider roster spreadsheets.
//!
//! Given column headers with a few sample values, the [`Classifier`] decides
//! which column holds each canonical roster field. Learned header mappings
//! live in a [`MappingStore`]; detectors read it and hand back writes as
//! [`StoreMutation`]s. [`KnowledgeRepository`] persists stores between runs
//! and [`MappingSession`] tracks an operator's accept/override pass.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod knowledge;
pub mod lexicon;
pub mod npi;
pub mod ranking;
pub mod repository;
pub mod rules;
pub mod state;
pub mod utils;

pub use engine::{ClassificationReport, Classifier};
pub use error::MapError;
pub use knowledge::{KnowledgeBase, MappingStore, StoreMutation};
pub use lexicon::{EMBEDDED_LEXICON, Lexicon};
pub use npi::{Classification, NpiSelection, detect_npi, npi_confidence, select_npi_column};
pub use ranking::{ConfidenceLevel, ConfidenceThresholds, RankedColumn, rank_columns};
pub use repository::{KnowledgeMetadata, KnowledgeRepository, StoredKnowledgeBase};
pub use rules::{FieldRules, Rule, ValuePredicate};
pub use state::{AcceptedMapping, FieldStatus, MappingSession, SessionSummary};
