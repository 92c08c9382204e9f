use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("unknown canonical field: {0}")]
    UnknownField(String),
    #[error("unknown match type: {0}")]
    UnknownMatchType(String),
}

pub type Result<T> = std::result::Result<T, RosterError>;
