//! Trait definition for pluggable search backends.
//!
//! The orchestrator reaches the ranking engine only through
//! [`SearchBackend`], so hosts can insert latency, remote calls or failure
//! injection without touching session logic. [`LocalBackend`] runs the
//! in-process engine behind a simulated, cancellable delay.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::corpus::Corpus;
use crate::engine::run_search;
use crate::error::{Result, SearchError};
use crate::types::{SearchParams, SearchResult};

/// A pluggable source of result pages.
///
/// Implementations must observe `cancel` at every suspension point and
/// return [`SearchError::Cancelled`] once it fires, without side effects.
/// All implementations must be `Send + Sync` so calls can run on any task.
pub trait SearchBackend: Send + Sync + 'static {
    /// Produce one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] when superseded, or any other
    /// [`SearchError`] when the page cannot be produced.
    fn search(
        &self,
        params: SearchParams,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<SearchResult>> + Send;
}

/// In-process backend over a fixed corpus.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    corpus: Corpus,
    first_page_delay: Duration,
    next_page_delay: Duration,
}

impl LocalBackend {
    /// Backend with no simulated latency.
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            first_page_delay: Duration::ZERO,
            next_page_delay: Duration::ZERO,
        }
    }

    /// Backend with the per-page delays from `config`.
    pub fn from_config(corpus: Corpus, config: &SessionConfig) -> Self {
        Self::new(corpus).with_delays(config.page_delay(1), config.page_delay(2))
    }

    pub fn with_delays(mut self, first_page: Duration, next_page: Duration) -> Self {
        self.first_page_delay = first_page;
        self.next_page_delay = next_page;
        self
    }

    fn delay_for(&self, page: usize) -> Duration {
        if page <= 1 {
            self.first_page_delay
        } else {
            self.next_page_delay
        }
    }
}

impl SearchBackend for LocalBackend {
    async fn search(&self, params: SearchParams, cancel: CancellationToken) -> Result<SearchResult> {
        cancellable_delay(self.delay_for(params.page), &cancel).await?;
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        guarded_search(&self.corpus, &params)
    }
}

/// Sleep for `delay`, returning [`SearchError::Cancelled`] if `cancel`
/// fires first.
pub async fn cancellable_delay(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Run the engine, converting a panic into [`SearchError::Computation`].
pub fn guarded_search(corpus: &Corpus, params: &SearchParams) -> Result<SearchResult> {
    catch_engine_panic(|| run_search(corpus, params))
}

/// Run `compute`, converting a panic into [`SearchError::Computation`]
/// carrying the panic message.
pub fn catch_engine_panic<T>(compute: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(compute)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "engine panicked".to_string());
        tracing::error!(error = %message, "search engine panicked");
        SearchError::Computation(message)
    })
}
