//! Core types for documents and paginated search results.

use serde::{Deserialize, Serialize};

/// Largest page size accepted at the request boundary.
pub const MAX_PER_PAGE: usize = 50;

/// Page size used when none is requested.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A single searchable document. Immutable once loaded into a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier.
    pub id: String,
    /// Short title; matches here weigh more than snippet matches.
    pub title: String,
    /// Body text shown under the title.
    pub snippet: String,
}

/// Pagination and timing metadata for one result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    /// The trimmed query that produced this page.
    pub query: String,
    /// 1-based page number, clamped into `[1, max(total_pages, 1)]`.
    pub page: usize,
    pub per_page: usize,
    /// Number of matching documents across all pages.
    pub total: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    /// Wall-clock time spent producing the page, in milliseconds.
    pub duration_ms: f64,
}

/// One page of ranked documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub meta: SearchMeta,
    pub items: Vec<Document>,
}

impl SearchResult {
    /// An empty first page for a blank query.
    pub fn empty(per_page: usize, duration_ms: f64) -> Self {
        Self {
            meta: SearchMeta {
                query: String::new(),
                page: 1,
                per_page,
                total: 0,
                total_pages: 0,
                has_next_page: false,
                has_prev_page: false,
                duration_ms,
            },
            items: Vec::new(),
        }
    }
}

/// Parameters for a single engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub page: usize,
    pub per_page: usize,
    pub fuzzy: bool,
}

impl SearchParams {
    /// Build params, flooring `page` and `per_page` at 1 and capping
    /// `per_page` at [`MAX_PER_PAGE`].
    pub fn new(query: impl Into<String>, page: usize, per_page: usize, fuzzy: bool) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            fuzzy,
        }
    }
}

/// Transient ranking record for one matched document.
#[derive(Debug, Clone)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub score: f64,
    /// Position of the document in the corpus; final tiebreak.
    pub original_index: usize,
}

/// A document prepared for display, with query tokens marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub highlighted_title: String,
    pub highlighted_snippet: String,
}
