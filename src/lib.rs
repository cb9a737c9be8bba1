//! Typeahead: headless host for the in-memory typeahead search engine.
//!
//! This crate wraps [`typeahead_search`] for use from other processes:
//! Config file → corpus → request boundary / interactive session → stdio
//!
//! # Architecture
//!
//! - **Config**: TOML file with `[session]` and `[endpoint]` sections
//! - **Endpoint**: parses url-encoded query strings, clamps pagination,
//!   applies the forced-error sentinel and artificial latency
//! - **Host**: newline-delimited JSON commands on stdin; responses and
//!   session state events on stdout

pub mod config;
pub mod endpoint;
pub mod error;
pub mod host;

pub use config::{EndpointConfig, TypeaheadConfig};
pub use endpoint::{SearchEndpoint, SearchRequest, SearchResponse};
pub use error::{HostError, Result};
pub use host::SearchHost;

use typeahead_search::Corpus;

/// Corpus bundled with the binary, used when no `corpus_path` is configured.
pub const SAMPLE_CORPUS: &str = include_str!("../corpus/sample.json");

/// Load the configured corpus, or the bundled sample.
///
/// # Errors
///
/// Returns an error if the corpus file cannot be read or parsed.
pub fn load_corpus(config: &TypeaheadConfig) -> Result<Corpus> {
    let corpus = match &config.corpus_path {
        Some(path) => Corpus::from_path(path)?,
        None => {
            tracing::info!("no corpus_path configured; using bundled sample corpus");
            Corpus::from_json_str(SAMPLE_CORPUS)?
        }
    };
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn sample_corpus_parses() {
        let corpus = load_corpus(&TypeaheadConfig::default()).unwrap();
        assert_eq!(corpus.len(), 20);
    }

    #[test]
    fn configured_corpus_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"[{"id":"a","title":"Only","snippet":"one"}]"#).unwrap();
        let config = TypeaheadConfig {
            corpus_path: Some(path),
            ..Default::default()
        };
        assert_eq!(load_corpus(&config).unwrap().len(), 1);
    }

    #[test]
    fn missing_corpus_is_corpus_error() {
        let config = TypeaheadConfig {
            corpus_path: Some("/nonexistent/docs.json".into()),
            ..Default::default()
        };
        assert_eq!(load_corpus(&config).unwrap_err().code(), "CORPUS_ERROR");
    }
}
