//! Title collation for Russian-locale ordering.
//!
//! Backed by the ICU4X collator with the `ru` tailoring and default
//! (tertiary, non-ignorable) strength: whitespace and punctuation carry
//! low primary weights, `ё` differs from `е` only at the secondary level,
//! and lower case sorts before upper case at the tertiary level.

use std::cmp::Ordering;
use std::fmt;

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::locale;

thread_local! {
    static RUSSIAN: TitleCollator = TitleCollator::russian();
}

/// Compares document titles in Russian collation order.
pub struct TitleCollator {
    collator: Option<CollatorBorrowed<'static>>,
}

impl TitleCollator {
    /// Build a collator for the `ru` locale from compiled-in data.
    ///
    /// If the collation data cannot be loaded, titles fall back to code
    /// point order.
    pub fn russian() -> Self {
        let collator = match Collator::try_new(locale!("ru").into(), CollatorOptions::default())
        {
            Ok(collator) => Some(collator),
            Err(e) => {
                tracing::warn!(error = %e, "ru collation data unavailable; using code point order");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl fmt::Debug for TitleCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleCollator")
            .field("icu", &self.collator.is_some())
            .finish()
    }
}

/// Run `f` with this thread's Russian collator.
pub fn with_russian<R>(f: impl FnOnce(&TitleCollator) -> R) -> R {
    RUSSIAN.with(f)
}

/// Compare two titles in collation order.
pub fn collate(a: &str, b: &str) -> Ordering {
    with_russian(|collator| collator.compare(a, b))
}
