//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the legal search engine, partitioned into
//! recoverable per-document conditions and fatal per-build conditions.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from corpus loading, embedding, indexing, API
//! - **Output**: Structured error types with context for logging and API responses
//! - **Error Categories**: Corpus, Embedding, Index, Store, Configuration, API
//!
//! ## Propagation Policy
//! Per-file and per-record errors during corpus loading are recovered locally
//! (skipped with a logged warning). Whole-build errors (embedding failure,
//! dimension mismatch) are fatal to that build attempt and propagated. Queries
//! against a store that has never built a snapshot surface `StoreNotReady`
//! rather than an empty result set.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the legal search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Dataset directory missing or unreadable; yields an empty corpus
    #[error("Corpus unavailable at '{path}': {details}")]
    CorpusUnavailable { path: String, details: String },

    /// A single corpus file could not be parsed or matched no known shape
    #[error("Malformed document in {file}: {details}")]
    MalformedDocument { file: String, details: String },

    /// The embedding capability failed; fatal to the build attempt
    #[error("Embedding generation failed: {details}")]
    EmbeddingFailure { details: String },

    /// Embedding vectors returned with inconsistent width; fatal
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A query was issued before any snapshot was successfully built
    #[error("Vector store not initialized")]
    StoreNotReady,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Request validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Check whether the error is recoverable within a corpus load
    /// (skip-and-log) or fatal to the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::CorpusUnavailable { .. } | SearchError::MalformedDocument { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::CorpusUnavailable { .. } | SearchError::MalformedDocument { .. } => {
                "corpus"
            }
            SearchError::EmbeddingFailure { .. } => "embedding",
            SearchError::DimensionMismatch { .. } => "index",
            SearchError::StoreNotReady => "store",
            SearchError::Config { .. } => "configuration",
            SearchError::ValidationFailed { .. } => "api",
            SearchError::Io(_) | SearchError::Json(_) | SearchError::Internal { .. } => "generic",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::EmbeddingFailure {
            details: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        SearchError::Config {
            message: err.to_string(),
        }
    }
}
