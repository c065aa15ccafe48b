//! Error types for docbay

use thiserror::Error;

/// Result type alias for docbay operations
pub type Result<T> = std::result::Result<T, DocbayError>;

/// Main error type for docbay
#[derive(Error, Debug)]
pub enum DocbayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid user role: {0}")]
    InvalidRole(String),

    #[error("Invalid ingestion status: {0}")]
    InvalidStatus(String),

    #[error("Invalid document status: {0}")]
    InvalidDocumentStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
