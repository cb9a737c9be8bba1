//! Immutable document corpus handle.
//!
//! A [`Corpus`] is loaded once at startup and then shared read-only between
//! the engine, backends and sessions. Cloning is cheap (reference counted).

use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::types::Document;

/// Shared, read-only collection of documents.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Arc<[Document]>,
}

impl Corpus {
    /// Wrap an owned list of documents.
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: documents.into(),
        }
    }

    /// Parse a JSON array of `{ id, title, snippet }` objects.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Corpus`] if the JSON is malformed or a document
    /// id appears twice.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let documents: Vec<Document> =
            serde_json::from_str(json).map_err(|e| SearchError::Corpus(e.to_string()))?;
        ensure_unique_ids(&documents)?;
        Ok(Self::new(documents))
    }

    /// Read and parse a JSON corpus file.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Corpus`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Corpus(format!("{}: {e}", path.display())))?;
        let corpus = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), documents = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn ensure_unique_ids(documents: &[Document]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(documents.len());
    for doc in documents {
        if !seen.insert(doc.id.as_str()) {
            return Err(SearchError::Corpus(format!("duplicate document id {:?}", doc.id)));
        }
    }
    Ok(())
}
