//! Error types for the typeahead-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Each variant maps to a machine-readable
//! [`SearchError::code`] that the request boundary puts on the wire.

use serde::{Deserialize, Serialize};

/// Errors that can occur while searching or driving a query session.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The forced-failure sentinel query was submitted.
    #[error("forced error: {0}")]
    Forced(String),

    /// The operation was superseded by a newer request.
    ///
    /// Never surfaced to users; the orchestrator absorbs it.
    #[error("operation cancelled")]
    Cancelled,

    /// Ranking failed unexpectedly (the engine panicked).
    #[error("search computation failed: {0}")]
    Computation(String),

    /// Invalid session or endpoint configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The corpus could not be loaded or parsed.
    #[error("corpus error: {0}")]
    Corpus(String),
}

impl SearchError {
    /// Stable error code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Forced(_) | Self::Computation(_) => "INTERNAL_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Corpus(_) => "CORPUS_ERROR",
        }
    }

    /// Returns `true` for supersession, which callers must swallow.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Error body returned across the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code, e.g. `INTERNAL_ERROR`.
    pub code: String,
}

impl From<&SearchError> for ErrorResponse {
    /// Forced failures carry their message verbatim; everything else uses
    /// the display string.
    fn from(err: &SearchError) -> Self {
        let error = match err {
            SearchError::Forced(message) => message.clone(),
            other => other.to_string(),
        };
        Self {
            error,
            code: err.code().to_string(),
        }
    }
}

/// Convenience type alias for typeahead-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
