//! Query orchestrator: debounced, cancellable, cached incremental search.
//!
//! A [`QueryOrchestrator`] owns one interactive search session. Raw input
//! arrives through [`Event::SetQuery`]; after a quiet period the input
//! becomes the *effective query* and page 1 is requested. Further pages are
//! appended through [`Event::LoadMore`].
//!
//! ## Guarantees
//!
//! - Only the newest request can change the session. Every request is
//!   tagged with a generation and a cancellation token; a completion whose
//!   token was cancelled or whose generation is stale is discarded.
//! - Pages are cached per `(query, page, fuzzy)` for the configured TTL. A
//!   cache hit resolves synchronously without touching the backend.
//! - Changing the query drops cached pages of unrelated queries; expired
//!   entries are swept periodically for the session's lifetime.
//!
//! State lives behind a single mutex that is never held across an await.
//! Observers read a [`Snapshot`] or subscribe to a watch channel of them.

mod event;
mod state;

pub use event::Event;
pub use state::{PageRecord, Phase, Snapshot};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::backend::{LocalBackend, SearchBackend};
use crate::cache::{CacheKey, PageCache};
use crate::config::SessionConfig;
use crate::corpus::Corpus;
use crate::error::{Result, SearchError};
use crate::scheduler::{Scheduler, TaskHandle, TokioScheduler};
use crate::types::{SearchParams, SearchResult};

use state::SessionState;

/// Handle to one search session. Clones share the session.
pub struct QueryOrchestrator<B, S = TokioScheduler>
where
    B: SearchBackend,
    S: Scheduler,
{
    inner: Arc<Inner<B, S>>,
}

struct Inner<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    backend: Arc<B>,
    scheduler: S,
    config: SessionConfig,
    cache: PageCache,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<Snapshot>,
    sweeper: TaskHandle,
}

impl QueryOrchestrator<LocalBackend, TokioScheduler> {
    /// Session over an in-process corpus on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid or no tokio
    /// runtime is running.
    pub fn local(corpus: Corpus, config: SessionConfig) -> Result<Self> {
        let backend = LocalBackend::from_config(corpus, &config);
        Self::new(backend, TokioScheduler::current()?, config)
    }
}

impl<B, S> QueryOrchestrator<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    /// Create a session and start its periodic cache sweep.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(backend: B, scheduler: S, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<B, S>>| {
            let weak = weak.clone();
            let sweeper = scheduler.schedule_every(
                config.sweep_interval(),
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(Event::SweepCache);
                    }
                }),
            );
            let (snapshots, _) = watch::channel(Snapshot::default());
            Inner {
                backend: Arc::new(backend),
                cache: PageCache::new(config.cache_capacity, config.cache_ttl()),
                scheduler,
                config,
                state: Mutex::new(SessionState::default()),
                snapshots,
                sweeper,
            }
        });
        tracing::info!(
            per_page = inner.config.per_page,
            fuzzy = inner.config.fuzzy,
            debounce_ms = inner.config.debounce_ms,
            "search session started"
        );
        Ok(Self { inner })
    }

    /// Start the session at `query` instead of empty, as when a page is
    /// rendered with its first results already in hand.
    ///
    /// With `initial`, that result becomes page 1 and is cached without a
    /// backend call. Without it, page 1 is requested.
    pub fn with_initial(self, query: impl Into<String>, initial: Option<SearchResult>) -> Self {
        self.inner.seed(query.into(), initial);
        self
    }

    /// Apply one event. Returns `false` if the event was ignored (a stale
    /// debounce tick, or a load-more that is not currently possible).
    pub fn dispatch(&self, event: Event) -> bool {
        self.inner.dispatch(event)
    }

    pub fn set_query(&self, text: impl Into<String>) -> bool {
        self.dispatch(Event::SetQuery(text.into()))
    }

    pub fn load_more(&self) -> bool {
        self.dispatch(Event::LoadMore)
    }

    pub fn reset(&self) -> bool {
        self.dispatch(Event::Reset)
    }

    /// Current state of the session.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    /// Receive a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &PageCache {
        &self.inner.cache
    }
}

impl<B, S> Inner<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(self: &Arc<Self>, event: Event) -> bool {
        tracing::trace!(event = event.name(), "dispatch");
        if event == Event::SweepCache {
            let removed = self.cache.sweep();
            if removed > 0 {
                tracing::debug!(removed, "swept expired cache entries");
            }
            return true;
        }

        let mut state = self.lock();
        let accepted = match event {
            Event::SetQuery(text) => {
                self.on_input(&mut state, text);
                true
            }
            Event::DebounceElapsed { seq } => {
                if seq != state.input_seq {
                    false
                } else {
                    state.cancel_debounce();
                    self.apply_query(&mut state);
                    true
                }
            }
            Event::LoadMore => self.on_load_more(&mut state),
            Event::Reset => {
                self.on_reset(&mut state);
                true
            }
            Event::SweepCache => true,
        };
        if accepted {
            self.publish(&state);
        }
        accepted
    }

    fn seed(self: &Arc<Self>, query: String, initial: Option<SearchResult>) {
        let mut state = self.lock();
        state.cancel_debounce();
        state.cancel_in_flight();
        state.input_seq += 1;
        state.generation += 1;
        state.effective_query = query.trim().to_string();
        state.raw_query = query;
        state.pages.clear();
        state.error = None;
        state.loading = false;

        if !state.effective_query.is_empty() {
            match initial {
                Some(result) => {
                    let key = CacheKey::new(&state.effective_query, 1, self.config.fuzzy);
                    let total = result.meta.total;
                    let result = Arc::new(result);
                    self.cache.insert(key, Arc::clone(&result));
                    state.merge_page(1, result);
                    tracing::debug!(total, "session seeded with first page");
                }
                None => self.request_page(&mut state, 1),
            }
        }
        self.publish(&state);
    }

    fn on_input(self: &Arc<Self>, state: &mut SessionState, text: String) {
        state.raw_query = text;
        state.input_seq += 1;
        state.cancel_debounce();

        let debounce = self.config.debounce();
        if debounce.is_zero() {
            self.apply_query(state);
            return;
        }
        let seq = state.input_seq;
        let weak = Arc::downgrade(self);
        state.debounce = Some(self.scheduler.schedule_after(
            debounce,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(Event::DebounceElapsed { seq });
                }
            }),
        ));
    }

    /// Promote the raw input to the effective query.
    fn apply_query(self: &Arc<Self>, state: &mut SessionState) {
        let next = state.raw_query.trim().to_string();
        if next == state.effective_query {
            return;
        }
        state.cancel_in_flight();
        state.generation += 1;
        state.effective_query = next;
        state.pages.clear();
        state.error = None;
        state.loading = false;

        if state.effective_query.is_empty() {
            tracing::debug!(generation = state.generation, "query cleared");
            return;
        }
        let dropped = self.cache.retain_prefix(&state.effective_query);
        if dropped > 0 {
            tracing::debug!(dropped, "dropped cache entries of abandoned queries");
        }
        self.request_page(state, 1);
    }

    fn on_load_more(self: &Arc<Self>, state: &mut SessionState) -> bool {
        if state.effective_query.is_empty() || state.loading {
            return false;
        }
        let next = match state.pages.last() {
            Some(last) if last.result.meta.has_next_page => last.page + 1,
            _ => return false,
        };
        self.request_page(state, next);
        true
    }

    fn on_reset(&self, state: &mut SessionState) {
        state.cancel_debounce();
        state.cancel_in_flight();
        state.input_seq += 1;
        state.generation += 1;
        state.raw_query.clear();
        state.effective_query.clear();
        state.pages.clear();
        state.error = None;
        state.loading = false;
        tracing::debug!(generation = state.generation, "session reset");
    }

    fn request_page(self: &Arc<Self>, state: &mut SessionState, page: usize) {
        let key = CacheKey::new(&state.effective_query, page, self.config.fuzzy);
        if let Some(result) = self.cache.get(&key) {
            tracing::debug!(page, "page served from cache");
            state.merge_page(page, result);
            return;
        }
        tracing::debug!(page, "cache miss, querying backend");

        state.cancel_in_flight();
        state.generation += 1;
        state.loading = true;
        state.error = None;

        let token = CancellationToken::new();
        state.in_flight = Some(token.clone());
        let generation = state.generation;
        let params = SearchParams::new(
            state.effective_query.clone(),
            page,
            self.config.per_page,
            self.config.fuzzy,
        );
        let backend = Arc::clone(&self.backend);
        let weak = Arc::downgrade(self);
        self.scheduler.spawn(Box::pin(async move {
            let outcome = backend.search(params, token.clone()).await;
            if let Some(inner) = weak.upgrade() {
                inner.complete(key, page, generation, &token, outcome);
            }
        }));
    }

    fn complete(
        &self,
        key: CacheKey,
        page: usize,
        generation: u64,
        token: &CancellationToken,
        outcome: Result<SearchResult>,
    ) {
        let mut state = self.lock();
        if token.is_cancelled() || generation != state.generation {
            tracing::debug!(
                page,
                generation,
                current = state.generation,
                "discarding stale result"
            );
            return;
        }
        state.in_flight = None;
        state.loading = false;
        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                self.cache.insert(key, Arc::clone(&result));
                state.merge_page(page, result);
            }
            Err(SearchError::Cancelled) => {}
            Err(e) => {
                tracing::warn!(page, code = e.code(), error = %e, "search request failed");
                state.error = Some(e.to_string());
            }
        }
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }
}

impl<B, S> Drop for Inner<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    fn drop(&mut self) {
        self.sweeper.cancel();
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel_debounce();
        state.cancel_in_flight();
    }
}

impl<B, S> Clone for QueryOrchestrator<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, S> fmt::Debug for QueryOrchestrator<B, S>
where
    B: SearchBackend,
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}
