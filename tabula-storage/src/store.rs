//! Async store contract consumed by data controllers and forms.

use async_trait::async_trait;
use tabula_core::{Entity, Predicate, SortOrder, StoreError};

/// Server-side source of entities.
///
/// Implementations translate the predicate and sort list into their own query
/// language. `page` uses offset `page_index * page_size`.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Number of entities matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// One window of matching entities, sorted by `sort`.
    async fn page(
        &self,
        page_index: u64,
        page_size: u64,
        predicate: &Predicate,
        sort: &[SortOrder],
    ) -> Result<Vec<E>, StoreError>;

    /// Create or update. An entity without identity is created and returned
    /// with its assigned identity.
    async fn save(&self, entity: E) -> Result<E, StoreError>;
}

/// Total pages for `total` rows at `page_size` per page.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Row offset of a page.
pub fn page_offset(page_index: u64, page_size: u64) -> u64 {
    page_index.saturating_mul(page_size)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_page_count_covers_every_row(total in 0u64..10_000, size in 1u64..200) {
            let pages = page_count(total, size);
            prop_assert!(pages * size >= total);
            if total > 0 {
                prop_assert!((pages - 1) * size < total);
            } else {
                prop_assert_eq!(pages, 0);
            }
        }

        #[test]
        fn prop_last_page_offset_is_in_range(total in 1u64..10_000, size in 1u64..200) {
            let last = page_count(total, size) - 1;
            let offset = page_offset(last, size);
            prop_assert!(offset < total);
            prop_assert!(total - offset <= size);
        }

        #[test]
        fn prop_page_offset_saturates(index in any::<u64>(), size in any::<u64>()) {
            let offset = page_offset(index, size);
            prop_assert_eq!(offset, index.checked_mul(size).unwrap_or(u64::MAX));
        }
    }
}
