//! Integration tests for the ranking engine.
//!
//! These exercise tokenise → score → rank → paginate through the public
//! API only, over small in-memory corpora.

use typeahead_search::{highlight, run_search, Corpus, Document, SearchParams};

fn doc(id: &str, title: &str, snippet: &str) -> Document {
    Document {
        id: id.into(),
        title: title.into(),
        snippet: snippet.into(),
    }
}

fn ids(corpus: &Corpus, params: &SearchParams) -> Vec<String> {
    run_search(corpus, params)
        .items
        .into_iter()
        .map(|d| d.id)
        .collect()
}

fn library() -> Corpus {
    Corpus::new(vec![
        doc("1", "Fresh bread", "Baked every morning"),
        doc("2", "Rust in production", "Fresh look at ownership"),
        doc("3", "Frescoes of Italy", "Wall painting techniques"),
        doc("4", "Rust for beginners", "A gentle start"),
        doc("5", "Rust internals", "Compiler deep dive"),
        doc("6", "Gardening", "Rust spots on leaves"),
    ])
}

#[test]
fn identical_inputs_give_identical_order() {
    let corpus = library();
    let params = SearchParams::new("rust", 1, 10, true);
    let first = ids(&corpus, &params);
    for _ in 0..5 {
        assert_eq!(ids(&corpus, &params), first);
    }
}

#[test]
fn blank_query_has_no_results() {
    let result = run_search(&library(), &SearchParams::new("   ", 3, 10, true));
    assert_eq!(result.meta.total, 0);
    assert_eq!(result.meta.total_pages, 0);
    assert_eq!(result.meta.page, 1);
    assert!(result.items.is_empty());
    assert!(!result.meta.has_next_page);
}

#[test]
fn title_hits_outrank_snippet_hits() {
    let order = ids(&library(), &SearchParams::new("rust", 1, 10, false));
    // Three title hits ordered by title, then the snippet-only hit.
    assert_eq!(order, vec!["4", "2", "5", "6"]);
}

#[test]
fn equal_scores_break_ties_by_title_then_position() {
    let corpus = Corpus::new(vec![
        doc("a", "Beta", "x"),
        doc("b", "alpha", "x"),
        doc("c", "Alpha", "x"),
        doc("d", "alpha", "x"),
    ]);
    let order = ids(&corpus, &SearchParams::new("x", 1, 10, false));
    assert_eq!(order, vec!["b", "d", "c", "a"]);
}

#[test]
fn four_matches_split_over_two_pages_of_three() {
    let corpus = library();
    let first = run_search(&corpus, &SearchParams::new("rust", 1, 3, false));
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.meta.total, 4);
    assert_eq!(first.meta.total_pages, 2);
    assert!(first.meta.has_next_page);
    assert!(!first.meta.has_prev_page);

    let second = run_search(&corpus, &SearchParams::new("rust", 2, 3, false));
    assert_eq!(second.items.len(), 1);
    assert!(!second.meta.has_next_page);
    assert!(second.meta.has_prev_page);
}

#[test]
fn page_beyond_end_is_clamped() {
    let result = run_search(&library(), &SearchParams::new("rust", 99, 3, false));
    assert_eq!(result.meta.page, 2);
    assert_eq!(result.items.len(), 1);
}

#[test]
fn item_count_matches_page_arithmetic() {
    let corpus = library();
    for per_page in 1..=5 {
        let total = run_search(&corpus, &SearchParams::new("rust", 1, per_page, false))
            .meta
            .total;
        let pages = total.div_ceil(per_page);
        for page in 1..=pages {
            let result = run_search(&corpus, &SearchParams::new("rust", page, per_page, false));
            let expected = per_page.min(total - (page - 1) * per_page);
            assert_eq!(result.items.len(), expected, "per_page={per_page} page={page}");
        }
    }
}

#[test]
fn typo_needs_fuzzy_mode() {
    let corpus = library();
    assert!(run_search(&corpus, &SearchParams::new("fresk", 1, 10, false))
        .items
        .is_empty());

    let fuzzy = ids(&corpus, &SearchParams::new("fresk", 1, 10, true));
    // "fresh" in a title (0.8 * 4) beats "fresh" in a snippet (0.8 * 1).
    assert_eq!(fuzzy, vec!["1", "2"]);
}

#[test]
fn short_tokens_never_match_fuzzily() {
    let corpus = Corpus::new(vec![doc("1", "Cat", "animal")]);
    assert!(run_search(&corpus, &SearchParams::new("ct", 1, 10, true))
        .items
        .is_empty());
}

#[test]
fn cyrillic_queries_are_case_insensitive() {
    let corpus = Corpus::new(vec![
        doc("1", "Фрески Новгорода", "Древнерусская живопись"),
        doc("2", "Хлеб", "Свежий"),
    ]);
    assert_eq!(ids(&corpus, &SearchParams::new("ФРЕСКИ", 1, 10, false)), vec!["1"]);
}

#[test]
fn highlight_marks_result_titles() {
    let corpus = library();
    let result = run_search(&corpus, &SearchParams::new("rust production", 1, 10, false));
    let title = &result.items[0].title;
    assert_eq!(title, "Rust in production");
    assert_eq!(
        highlight(title, "rust production"),
        "<mark>Rust</mark> in <mark>production</mark>"
    );
}
