//! Deterministic ranking and page slicing.
//!
//! Ordering is a strict total order: score descending, then collated title
//! ascending, then corpus position ascending. Repeated calls with the same
//! input therefore produce identical output.

use std::cmp::Ordering;

use crate::types::{Document, ScoredDocument};

use super::collation::TitleCollator;
use super::scoring::score;

/// Score every document, drop non-matches, and sort.
pub fn rank<'a>(
    corpus: &'a [Document],
    tokens: &[String],
    fuzzy: bool,
    collator: &TitleCollator,
) -> Vec<ScoredDocument<'a>> {
    let mut scored: Vec<ScoredDocument<'a>> = corpus
        .iter()
        .enumerate()
        .filter_map(|(original_index, document)| {
            let score = score(tokens, document, fuzzy);
            (score > 0.0).then_some(ScoredDocument {
                document,
                score,
                original_index,
            })
        })
        .collect();

    scored.sort_by(|a, b| compare(collator, a, b));
    scored
}

fn compare(collator: &TitleCollator, a: &ScoredDocument<'_>, b: &ScoredDocument<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| collator.compare(&a.document.title, &b.document.title))
        .then_with(|| a.original_index.cmp(&b.original_index))
}

/// One page cut from a ranked list.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Requested page clamped into `[1, max(total_pages, 1)]`.
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}

/// Slice page `page` of size `per_page` out of `ordered`.
///
/// A `per_page` of zero is treated as one.
pub fn paginate<T: Clone>(ordered: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = ordered.len();
    let total_pages = if total == 0 { 0 } else { total.div_ceil(per_page) };
    let page = page.clamp(1, total_pages.max(1));

    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);

    Page {
        items: ordered[start..end].to_vec(),
        page,
        total,
        total_pages,
    }
}
