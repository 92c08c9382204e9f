#![deny(unsafe_code)]

pub mod column;
pub mod detection;
pub mod error;
pub mod field;
pub mod mapping;

pub use column::{CellValue, Column};
pub use detection::{Confidence, Detection, FieldMatch, MatchType, StoreEntry};
pub use error::{Result, RosterError};
pub use field::FieldKind;
pub use mapping::{DetectedAs, MappingRecord};
