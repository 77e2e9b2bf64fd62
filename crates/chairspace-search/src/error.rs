//! Error types for chairspace-search operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
