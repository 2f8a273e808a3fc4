use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quote::{locale_key, Quote, TopicQuote};

/// Secondary indexes of the quote store. Both are ordered by `lastFoundAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteIndex {
    Locale { country: String, lang: String },
    Author { author_id: String },
}

impl QuoteIndex {
    pub fn locale(country: impl Into<String>, lang: impl Into<String>) -> Self {
        QuoteIndex::Locale {
            country: country.into(),
            lang: lang.into(),
        }
    }

    pub fn author(author_id: impl Into<String>) -> Self {
        QuoteIndex::Author {
            author_id: author_id.into(),
        }
    }

    /// The partition value the index is keyed by.
    pub fn partition(&self) -> String {
        match self {
            QuoteIndex::Locale { country, lang } => locale_key(country, lang),
            QuoteIndex::Author { author_id } => author_id.clone(),
        }
    }
}

/// Position in a recency index: the `lastFoundAt` of the last item read and
/// the id of its quote.
///
/// Quotes found in the same millisecond are told apart by the id, so a page
/// boundary never falls between them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCursor {
    #[serde(with = "crate::serde::timestamp")]
    pub last_found_at: DateTime<Utc>,
    pub id: String,
}

impl IndexCursor {
    pub fn new(last_found_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            last_found_at,
            id: id.into(),
        }
    }
}

impl From<&Quote> for IndexCursor {
    fn from(quote: &Quote) -> Self {
        IndexCursor::new(quote.last_found_at, &quote.id)
    }
}

impl From<&TopicQuote> for IndexCursor {
    fn from(item: &TopicQuote) -> Self {
        IndexCursor::new(item.last_found_at, &item.quote_id)
    }
}

/// Direction of an index scan over `lastFoundAt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Orders two index positions in scan order.
    pub fn compare<K: Ord>(&self, a: &K, b: &K) -> Ordering {
        match self {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        }
    }
}

/// A page request against a recency index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Exclusive start position: items strictly past it in scan order are returned.
    pub cursor: Option<IndexCursor>,
    pub limit: usize,
    pub order: SortOrder,
}

impl IndexQuery {
    /// Newest first, from the top of the index.
    pub fn latest(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
            order: SortOrder::Descending,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<IndexCursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether an index position lies past the cursor.
    pub fn admits(&self, position: &IndexCursor) -> bool {
        match &self.cursor {
            None => true,
            Some(cursor) => self.order.compare(cursor, position) == Ordering::Less,
        }
    }
}

/// One page of index results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page, when more items may exist.
    pub next_cursor: Option<IndexCursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<IndexCursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_partition_values() {
        assert_eq!(QuoteIndex::locale("MD", "ro").partition(), "md_ro");
        assert_eq!(QuoteIndex::author("a1").partition(), "a1");
    }

    fn position(hour: u32, id: &str) -> IndexCursor {
        IndexCursor::new(at(hour), id)
    }

    #[test]
    fn test_descending_cursor_is_exclusive() {
        let query = IndexQuery::latest(10).with_cursor(Some(position(10, "b")));

        assert!(query.admits(&position(9, "z")));
        assert!(query.admits(&position(10, "a")));
        assert!(!query.admits(&position(10, "b")));
        assert!(!query.admits(&position(10, "c")));
        assert!(!query.admits(&position(11, "a")));
    }

    #[test]
    fn test_ascending_cursor_is_exclusive() {
        let query = IndexQuery::latest(10)
            .with_order(SortOrder::Ascending)
            .with_cursor(Some(position(10, "b")));

        assert!(query.admits(&position(11, "a")));
        assert!(query.admits(&position(10, "c")));
        assert!(!query.admits(&position(10, "b")));
        assert!(!query.admits(&position(10, "a")));
    }

    #[test]
    fn test_cursor_serializes_as_camel_case() {
        let cursor = position(10, "mdro1");
        let json = serde_json::to_value(&cursor).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "lastFoundAt": "2024-06-15T10:00:00.000Z", "id": "mdro1" })
        );
    }

    #[test]
    fn test_sort_order_compare() {
        let mut keys = vec![at(3), at(1), at(2)];
        keys.sort_by(|a, b| SortOrder::Descending.compare(a, b));
        assert_eq!(keys, vec![at(3), at(2), at(1)]);

        keys.sort_by(|a, b| SortOrder::Ascending.compare(a, b));
        assert_eq!(keys, vec![at(1), at(2), at(3)]);
    }

    #[test]
    fn test_default_page_is_empty() {
        let page: Page<u8> = Page::default();
        assert!(page.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
