//! Error types for classifier setup and mapping sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from lexicon loading and mapping sessions.
///
/// Classification itself never fails: a column that matches nothing is
/// reported as `None`, not as an error.
#[derive(Debug, Error)]
pub enum MapError {
    /// The lexicon document is not valid TOML or has the wrong shape.
    #[error("failed to parse lexicon: {source}")]
    LexiconParse {
        #[source]
        source: toml::de::Error,
    },
    /// The lexicon names a field that is not canonical.
    #[error("lexicon section names unknown field: {0}")]
    UnknownLexiconField(String),
    /// A lexicon file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Column not found in the source columns.
    #[error("column not found: {0}")]
    ColumnNotFound(String),
}
