//! Inputs accepted by the query orchestrator.

/// Everything that can change a session. Fed through
/// [`QueryOrchestrator::dispatch`](super::QueryOrchestrator::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The raw input text changed.
    SetQuery(String),
    /// A debounce timer armed for input number `seq` fired.
    DebounceElapsed { seq: u64 },
    /// Append the page after the last loaded one.
    LoadMore,
    /// Evict expired cache entries.
    SweepCache,
    /// Drop the query, results and any pending work.
    Reset,
}

impl Event {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetQuery(_) => "set_query",
            Self::DebounceElapsed { .. } => "debounce_elapsed",
            Self::LoadMore => "load_more",
            Self::SweepCache => "sweep_cache",
            Self::Reset => "reset",
        }
    }
}
