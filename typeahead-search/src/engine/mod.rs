//! Ranking engine: tokenise, score, rank, paginate.
//!
//! [`run_search`] is a pure function of the corpus and parameters. It holds
//! no shared mutable state, so concurrent calls are safe and identical
//! inputs always produce identical item order.

pub mod collation;
pub mod highlight;
pub mod ranking;
pub mod scoring;

use std::time::Instant;

use crate::corpus::Corpus;
use crate::text::{normalize, tokenize};
use crate::types::{Document, SearchMeta, SearchParams, SearchResult};

use ranking::{paginate, rank};

/// Run one search over `corpus` and return the requested page.
///
/// A blank query short-circuits to an empty first page without scoring.
/// Out-of-range pages are clamped; a `per_page` of zero acts as one.
pub fn run_search(corpus: &Corpus, params: &SearchParams) -> SearchResult {
    let started = Instant::now();
    let per_page = params.per_page.max(1);
    let query = params.query.trim();

    if query.is_empty() {
        return SearchResult::empty(per_page, elapsed_ms(started));
    }

    let tokens = tokenize(&normalize(query));
    let page = collation::with_russian(|collator| {
        let ranked = rank(corpus.documents(), &tokens, params.fuzzy, collator);
        let ordered: Vec<&Document> = ranked.iter().map(|s| s.document).collect();
        paginate(&ordered, params.page, per_page)
    });

    tracing::trace!(
        query,
        tokens = tokens.len(),
        total = page.total,
        page = page.page,
        "ranked query"
    );

    SearchResult {
        meta: SearchMeta {
            query: query.to_string(),
            page: page.page,
            per_page,
            total: page.total,
            total_pages: page.total_pages,
            has_next_page: page.has_next_page(),
            has_prev_page: page.has_prev_page(),
            duration_ms: elapsed_ms(started),
        },
        items: page.items.into_iter().cloned().collect(),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
