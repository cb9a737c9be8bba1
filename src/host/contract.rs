//! Command, response and event envelopes of the stdio protocol.
//!
//! Every line on stdin is one [`CommandEnvelope`]; every line on stdout is
//! either a [`ResponseEnvelope`] answering a command by `id`, or an
//! [`EventEnvelope`] pushed by the host.

use serde::{Deserialize, Serialize};
use typeahead_search::{ErrorResponse, Snapshot};

/// Commands understood by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// One-shot search through the request boundary. `params` is a
    /// url-encoded query string, e.g. `q=rust&page=2&fuzzy=1`.
    Search {
        #[serde(default)]
        params: String,
    },
    /// Feed raw input into the interactive session.
    SetQuery { text: String },
    /// Append the next page to the interactive session.
    LoadMore,
    /// Clear the interactive session.
    Reset,
    /// Return the current session snapshot.
    Snapshot,
    /// Shut the host down.
    Stop,
}

impl Command {
    /// Wire name of the command.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::SetQuery { .. } => "set_query",
            Self::LoadMore => "load_more",
            Self::Reset => "reset",
            Self::Snapshot => "snapshot",
            Self::Stop => "stop",
        }
    }
}

/// A command from the frontend, tagged with a caller-chosen id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: String,
    #[serde(flatten)]
    pub command: Command,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(id: impl Into<String>, command: Command) -> Self {
        Self {
            id: id.into(),
            command,
        }
    }
}

/// Answer to one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(id: impl Into<String>, error: ErrorResponse) -> Self {
        Self {
            id: id.into(),
            ok: false,
            result: None,
            error: Some(error),
        }
    }

    /// Error response for a line that could not be parsed.
    #[must_use]
    pub fn bad_request(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::error(
            id,
            ErrorResponse {
                error: message.into(),
                code: "BAD_REQUEST".to_owned(),
            },
        )
    }
}

/// Unsolicited message from the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// The interactive session changed.
    State(Snapshot),
}
