//! Session state and its published snapshot.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::engine::highlight::highlight;
use crate::scheduler::TaskHandle;
use crate::types::{HighlightedDocument, SearchResult};

/// Where a session currently is.
///
/// ```text
///            SetQuery              DebounceElapsed (query non-empty, cache miss)
///   Idle ─────────────► Debouncing ──────────────────────► Loading
///    ▲                      │                               │   │
///    │   effective query    │ cache hit                 ok  │   │ failure
///    └──── becomes empty ◄──┤                               ▼   ▼
///                           └──────────────────────────► Loaded Error
/// ```
///
/// A pending debounce takes precedence over every other phase, then an
/// in-flight request, then a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Debouncing,
    Loading,
    Loaded,
    Error,
}

/// One fetched page of the active query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub page: usize,
    pub result: Arc<SearchResult>,
}

/// Mutable session state, guarded by the orchestrator's mutex.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub raw_query: String,
    /// Trimmed query the pages belong to.
    pub effective_query: String,
    /// Ascending by page number, no duplicates.
    pub pages: Vec<PageRecord>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped whenever earlier in-flight work must be ignored.
    pub generation: u64,
    /// Bumped on every raw input change; tags debounce timers.
    pub input_seq: u64,
    pub debounce: Option<TaskHandle>,
    pub in_flight: Option<CancellationToken>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        if self.debounce.is_some() {
            Phase::Debouncing
        } else if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.effective_query.is_empty() {
            Phase::Idle
        } else {
            Phase::Loaded
        }
    }

    pub fn has_more(&self) -> bool {
        self.pages
            .last()
            .is_some_and(|record| record.result.meta.has_next_page)
    }

    /// Insert `result` as `page` unless that page is already present.
    pub fn merge_page(&mut self, page: usize, result: Arc<SearchResult>) {
        match self.pages.binary_search_by_key(&page, |record| record.page) {
            Ok(_) => {}
            Err(at) => self.pages.insert(at, PageRecord { page, result }),
        }
    }

    /// Cancel any pending debounce timer.
    pub fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
    }

    /// Cancel the in-flight backend call, if any.
    pub fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let items = if self.effective_query.is_empty() {
            Vec::new()
        } else {
            self.pages
                .iter()
                .flat_map(|record| record.result.items.iter())
                .map(|document| HighlightedDocument {
                    highlighted_title: highlight(&document.title, &self.effective_query),
                    highlighted_snippet: highlight(&document.snippet, &self.effective_query),
                    document: document.clone(),
                })
                .collect()
        };
        Snapshot {
            raw_query: self.raw_query.clone(),
            effective_query: self.effective_query.clone(),
            phase: self.phase(),
            pages: self.pages.clone(),
            items,
            loading: self.loading,
            error: self.error.clone(),
            has_more: self.has_more(),
            lifted: !self.effective_query.is_empty(),
            generation: self.generation,
        }
    }
}

/// Read-only view of a session, as handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub raw_query: String,
    pub effective_query: String,
    pub phase: Phase,
    pub pages: Vec<PageRecord>,
    /// Items of every loaded page, in order, with query matches marked.
    pub items: Vec<HighlightedDocument>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    /// Whether a non-empty query is active.
    pub lifted: bool,
    pub generation: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        SessionState::default().snapshot()
    }
}
