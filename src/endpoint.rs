//! One-shot search request boundary.
//!
//! Parses url-encoded query strings into a [`SearchRequest`], clamps
//! pagination, honours the `error` sentinel query, applies a random
//! artificial latency, and produces either a [`SearchResult`] or an
//! [`ErrorResponse`] body with an HTTP-style status.

use std::borrow::Cow;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use typeahead_search::backend::{cancellable_delay, guarded_search};
use typeahead_search::types::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use typeahead_search::{Corpus, ErrorResponse, SearchError, SearchParams, SearchResult};

use crate::config::EndpointConfig;

/// Query that always fails, for exercising error paths end to end.
pub const FORCED_ERROR_QUERY: &str = "error";

/// Message of the forced failure.
pub const FORCED_ERROR_MESSAGE: &str = "Forced error for query testing";

/// A parsed search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Trimmed query text.
    pub q: String,
    /// Requested page, at least 1.
    pub page: usize,
    /// Page size, between 1 and 50.
    pub per_page: usize,
    pub fuzzy: bool,
    /// Skip the artificial latency.
    pub skip_delay: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            fuzzy: false,
            skip_delay: false,
        }
    }
}

impl SearchRequest {
    /// Parse a url-encoded query string such as `q=rust&page=2&fuzzy=1`.
    ///
    /// Never fails: unknown keys are ignored, unparsable numbers fall back
    /// to their defaults and out-of-range numbers are clamped. Only the
    /// first occurrence of a repeated key counts.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Build a request from decoded key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
    {
        let mut q = None;
        let mut page = None;
        let mut per_page = None;
        let mut fuzzy = None;
        let mut skip_delay = None;
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "q" => &mut q,
                "page" => &mut page,
                "perPage" => &mut per_page,
                "fuzzy" => &mut fuzzy,
                "skipDelay" => &mut skip_delay,
                _ => continue,
            };
            slot.get_or_insert(value.into_owned());
        }

        let page = parse_int(page.as_deref()).unwrap_or(1).max(1);
        let per_page = parse_int(per_page.as_deref())
            .unwrap_or(DEFAULT_PER_PAGE as i64)
            .clamp(1, MAX_PER_PAGE as i64);
        Self {
            q: q.as_deref().map(str::trim).unwrap_or_default().to_string(),
            page: usize::try_from(page).unwrap_or(usize::MAX),
            per_page: per_page as usize,
            fuzzy: parse_bool(fuzzy.as_deref()),
            skip_delay: parse_bool(skip_delay.as_deref()),
        }
    }

    /// Whether this is the forced-failure sentinel.
    pub fn is_forced_error(&self) -> bool {
        self.q.to_lowercase() == FORCED_ERROR_QUERY
    }

    pub fn params(&self) -> SearchParams {
        SearchParams::new(self.q.clone(), self.page, self.per_page, self.fuzzy)
    }
}

/// Leading-integer parse: optional sign then digits, trailing junk
/// ignored. Digit runs too long for `i64` saturate. Zero and missing
/// values count as absent.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<i64>().unwrap_or(i64::MAX) * sign;
    (value != 0).then_some(value)
}

/// `1`, `true`, `on` and `yes` (any case) enable a flag.
fn parse_bool(raw: Option<&str>) -> bool {
    raw.map(str::trim).is_some_and(|value| {
        ["1", "true", "on", "yes"]
            .iter()
            .any(|accepted| value.eq_ignore_ascii_case(accepted))
    })
}

/// Outcome of one request, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Ok(SearchResult),
    Error(ErrorResponse),
}

impl SearchResponse {
    /// HTTP-style status: 200 for results, 500 for failures.
    pub fn status(&self) -> u16 {
        match self {
            Self::Ok(_) => 200,
            Self::Error(_) => 500,
        }
    }
}

/// Stateless search handler over a shared corpus.
#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    corpus: Corpus,
    config: EndpointConfig,
}

impl SearchEndpoint {
    pub fn new(corpus: Corpus, config: EndpointConfig) -> Self {
        Self { corpus, config }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Serve one request.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Forced`] for the sentinel query (before any
    /// delay), [`SearchError::Cancelled`] if `cancel` fires during the
    /// delay, and [`SearchError::Computation`] if ranking panics.
    pub async fn handle(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        if request.is_forced_error() {
            tracing::debug!("forced error query");
            return Err(SearchError::Forced(FORCED_ERROR_MESSAGE.to_string()));
        }
        if !request.skip_delay {
            cancellable_delay(self.jitter(), cancel).await?;
        }

        let mut result = guarded_search(&self.corpus, &request.params())?;
        result.meta.duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            total = result.meta.total,
            page = result.meta.page,
            duration_ms = result.meta.duration_ms,
            "search request served"
        );
        Ok(result)
    }

    /// Serve one request and render the outcome as a wire body.
    pub async fn respond(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> SearchResponse {
        match self.handle(request, cancel).await {
            Ok(result) => SearchResponse::Ok(result),
            Err(err) => {
                if !err.is_cancelled() {
                    tracing::warn!(code = err.code(), error = %err, "search request failed");
                }
                SearchResponse::Error(ErrorResponse::from(&err))
            }
        }
    }

    fn jitter(&self) -> Duration {
        let min = self.config.min_delay();
        let max = self.config.max_delay().max(min);
        rand::thread_rng().gen_range(min..=max)
    }
}
