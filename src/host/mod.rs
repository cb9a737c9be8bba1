//! Headless host: routes protocol commands to the search endpoint and the
//! interactive session.

pub mod contract;
pub mod stdio;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use typeahead_search::backend::guarded_search;
use typeahead_search::{Corpus, LocalBackend, QueryOrchestrator, SearchParams, Snapshot};

use crate::config::TypeaheadConfig;
use crate::endpoint::{SearchEndpoint, SearchRequest, SearchResponse};
use crate::error::Result;
use contract::{Command, CommandEnvelope, ResponseEnvelope};

/// Shared state behind the protocol: one endpoint, one session.
#[derive(Debug, Clone)]
pub struct SearchHost {
    endpoint: SearchEndpoint,
    session: QueryOrchestrator<LocalBackend>,
    shutdown: CancellationToken,
}

impl SearchHost {
    /// Build a host over `corpus` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no runtime is
    /// running.
    pub fn new(corpus: Corpus, config: &TypeaheadConfig) -> Result<Self> {
        config.validate()?;
        let session = QueryOrchestrator::local(corpus.clone(), config.session.clone())?;
        Ok(Self {
            endpoint: SearchEndpoint::new(corpus, config.endpoint.clone()),
            session,
            shutdown: CancellationToken::new(),
        })
    }

    /// Start the session at `query`, with its first page computed up front
    /// so clients see results without waiting for the backend delay.
    ///
    /// # Errors
    ///
    /// Returns an error if ranking the first page fails.
    pub fn with_initial_query(mut self, query: &str) -> Result<Self> {
        let query = query.trim();
        let initial = if query.is_empty() {
            None
        } else {
            let config = self.session.config();
            let params = SearchParams::new(query, 1, config.per_page, config.fuzzy);
            Some(guarded_search(self.endpoint.corpus(), &params)?)
        };
        self.session = self.session.with_initial(query, initial);
        Ok(self)
    }

    pub fn session(&self) -> &QueryOrchestrator<LocalBackend> {
        &self.session
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.session.subscribe()
    }

    /// Cancel outstanding one-shot searches.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Handle one command and build its response.
    pub async fn handle(&self, envelope: CommandEnvelope) -> ResponseEnvelope {
        let CommandEnvelope { id, command } = envelope;
        tracing::debug!(id = %id, cmd = command.as_str(), "handling command");
        match command {
            Command::Search { params } => {
                let request = SearchRequest::from_query_string(&params);
                let cancel = self.shutdown.child_token();
                match self.endpoint.respond(&request, &cancel).await {
                    SearchResponse::Ok(result) => to_response(id, &result),
                    SearchResponse::Error(body) => ResponseEnvelope::error(id, body),
                }
            }
            Command::SetQuery { text } => {
                self.session.set_query(text);
                self.snapshot_response(id)
            }
            Command::LoadMore => {
                let accepted = self.session.load_more();
                to_response(id, &serde_json::json!({ "accepted": accepted }))
            }
            Command::Reset => {
                self.session.reset();
                self.snapshot_response(id)
            }
            Command::Snapshot => self.snapshot_response(id),
            Command::Stop => {
                self.shutdown();
                to_response(id, &serde_json::json!({ "stopping": true }))
            }
        }
    }

    fn snapshot_response(&self, id: String) -> ResponseEnvelope {
        to_response(id, &self.session.snapshot())
    }
}

fn to_response<T: serde::Serialize>(id: String, value: &T) -> ResponseEnvelope {
    match serde_json::to_value(value) {
        Ok(json) => ResponseEnvelope::ok(id, json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize command result");
            ResponseEnvelope::error(
                id,
                typeahead_search::ErrorResponse {
                    error: format!("failed to serialize result: {e}"),
                    code: "INTERNAL_ERROR".to_owned(),
                },
            )
        }
    }
}
