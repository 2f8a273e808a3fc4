//! In-memory storage backend.
//!
//! Both stores keep their records in HashMaps wrapped in `Arc<RwLock<_>>`.
//! Clones share the same data. Nothing is persisted and storage expiry is not
//! simulated.
//!
//! # Example
//!
//! ```rust
//! use quotes::storage::inmemory::{InMemoryQuoteStore, InMemoryTopicQuoteStore};
//! use quotes::QuoteRepository;
//!
//! let repository = QuoteRepository::new(InMemoryQuoteStore::new(), InMemoryTopicQuoteStore::new());
//! ```

mod quotes;
mod topic_quotes;

pub use quotes::InMemoryQuoteStore;
pub use topic_quotes::InMemoryTopicQuoteStore;

use quotes_core::storage::{IndexCursor, IndexQuery, Page};

/// Orders `items` by index position, drops those up to and including the
/// cursor and cuts the page at the limit.
///
/// Items found in the same millisecond are ordered by id, in scan direction.
fn paginate<T>(
    items: Vec<T>,
    query: &IndexQuery,
    position: impl Fn(&T) -> IndexCursor,
) -> Page<T> {
    let mut positioned: Vec<(IndexCursor, T)> = items
        .into_iter()
        .map(|item| (position(&item), item))
        .filter(|(key, _)| query.admits(key))
        .collect();
    positioned.sort_by(|(a, _), (b, _)| query.order.compare(a, b));

    let has_more = positioned.len() > query.limit;
    positioned.truncate(query.limit);

    let next_cursor = if has_more {
        positioned.last().map(|(key, _)| key.clone())
    } else {
        None
    };
    let items = positioned.into_iter().map(|(_, item)| item).collect();
    Page::new(items, next_cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use quotes_core::storage::SortOrder;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, minute, 0).unwrap()
    }

    fn key(minute: u32, id: &str) -> IndexCursor {
        IndexCursor::new(at(minute), id)
    }

    fn by_key(item: &IndexCursor) -> IndexCursor {
        item.clone()
    }

    #[test]
    fn test_paginate_orders_and_limits() {
        let items = vec![key(1, "a"), key(3, "a"), key(2, "a"), key(4, "a")];
        let page = paginate(items, &IndexQuery::latest(2), by_key);

        assert_eq!(page.items, vec![key(4, "a"), key(3, "a")]);
        assert_eq!(page.next_cursor, Some(key(3, "a")));
    }

    #[test]
    fn test_paginate_follows_cursor() {
        let items = vec![key(1, "a"), key(3, "a"), key(2, "a"), key(4, "a")];
        let query = IndexQuery::latest(2).with_cursor(Some(key(3, "a")));
        let page = paginate(items, &query, by_key);

        assert_eq!(page.items, vec![key(2, "a"), key(1, "a")]);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_paginate_splits_equal_timestamps_across_pages() {
        let items = vec![key(5, "a"), key(5, "c"), key(5, "b")];

        let first = paginate(items.clone(), &IndexQuery::latest(2), by_key);
        assert_eq!(first.items, vec![key(5, "c"), key(5, "b")]);
        assert_eq!(first.next_cursor, Some(key(5, "b")));

        let query = IndexQuery::latest(2).with_cursor(first.next_cursor);
        let second = paginate(items, &query, by_key);
        assert_eq!(second.items, vec![key(5, "a")]);
        assert_eq!(second.next_cursor, None);
    }

    #[test]
    fn test_paginate_ascending() {
        let items = vec![key(3, "a"), key(1, "a"), key(2, "a")];
        let query = IndexQuery::latest(10).with_order(SortOrder::Ascending);
        let page = paginate(items, &query, by_key);

        assert_eq!(page.items, vec![key(1, "a"), key(2, "a"), key(3, "a")]);
    }

    #[test]
    fn test_paginate_zero_limit() {
        let page = paginate(vec![key(1, "a")], &IndexQuery::latest(0), by_key);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
