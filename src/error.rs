//! Error types for Kamerbron.

use thiserror::Error;

/// Library-level error type for Kamerbron operations.
#[derive(Error, Debug)]
pub enum KamerbronError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Could not load document {path}: {reason}")]
    DocumentLoad { path: String, reason: String },

    #[error("Could not extract page {page}: {reason}")]
    PageExtraction { page: u32, reason: String },

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("No answer produced: the generated response was empty")]
    NoAnswerProduced,

    #[error("Page not found: {document} p.{page}")]
    PageNotFound { document: String, page: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Kamerbron operations.
pub type Result<T> = std::result::Result<T, KamerbronError>;
