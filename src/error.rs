//! Error types for the typeahead host.

use typeahead_search::SearchError;

/// Top-level error type for the host crate.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Search engine or session error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

impl HostError {
    /// Stable machine-readable code, as used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Search(e) => e.code(),
            Self::Config(_) | Self::TomlDe(_) | Self::TomlSer(_) => "CONFIG_ERROR",
            Self::Json(_) => "BAD_REQUEST",
            Self::Io(_) | Self::Channel(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostError>;
