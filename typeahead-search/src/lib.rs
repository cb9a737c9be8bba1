//! # typeahead-search
//!
//! In-memory typeahead search over a fixed corpus of short documents.
//!
//! This crate provides a ranking engine and an interactive query session on
//! top of it. Hosts feed keystrokes in and read ranked, paginated,
//! highlighted results out; overlapping or stale requests never reach the
//! caller.
//!
//! ## Design
//!
//! - [`run_search`] is pure: it tokenises the query, scores every document
//!   (title hits weigh 4, snippet hits 1, optional fuzzy matching by bounded
//!   edit distance), ranks deterministically and slices one page
//! - [`QueryOrchestrator`] debounces input, cancels superseded requests,
//!   caches pages with a TTL and appends pages on demand
//! - Backends and timers sit behind the [`SearchBackend`] and [`Scheduler`]
//!   traits, so latency and failures can be simulated in tests
//!
//! ## Security
//!
//! - No network listeners; this is a library
//! - Queries are logged only at debug/trace level
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> typeahead_search::Result<()> {
//! use typeahead_search::{Corpus, QueryOrchestrator, SessionConfig};
//!
//! let corpus = Corpus::from_json_str(r#"[{"id":"1","title":"Rust","snippet":"systems"}]"#)?;
//! let session = QueryOrchestrator::local(corpus, SessionConfig::default())?;
//! session.set_query("rust");
//! let mut updates = session.subscribe();
//! let _ = updates.changed().await;
//! println!("{:?}", session.snapshot().items);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod text;
pub mod types;

pub use backend::{LocalBackend, SearchBackend};
pub use config::SessionConfig;
pub use corpus::Corpus;
pub use engine::highlight::{highlight, highlight_with};
pub use engine::run_search;
pub use error::{ErrorResponse, Result, SearchError};
pub use orchestrator::{Event, PageRecord, Phase, QueryOrchestrator, Snapshot};
pub use scheduler::{Scheduler, TaskHandle, TokioScheduler};
pub use types::{Document, HighlightedDocument, SearchMeta, SearchParams, SearchResult};
