//! DynamoDB key generation functions.
//!
//! Pure functions for the single-table layout:
//!
//! | Item       | PK                 | SK               | GSI1PK                       | GSI1SK        | GSI2PK                | GSI2SK        |
//! |------------|--------------------|------------------|------------------------------|---------------|-----------------------|---------------|
//! | Quote      | `QUOTE#<id>`       | `QUOTE#<id>`     | `LOCALE#<country>_<lang>`    | `lastFoundAt` | `AUTHOR#<author_id>`  | `lastFoundAt` |
//! | TopicQuote | `TOPIC#<topic_id>` | `QUOTE#<quote_id>` | `TOPIC#<topic_id>`         | `lastFoundAt` |                       |               |

use chrono::{DateTime, Utc};
use quotes_core::quote::locale_key;
use quotes_core::serde::format_timestamp;
use quotes_core::storage::QuoteIndex;

// ============================================================================
// Attribute and index names
// ============================================================================

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1: &str = "GSI1";
pub const GSI1_PK: &str = "GSI1PK";
pub const GSI1_SK: &str = "GSI1SK";
pub const GSI2: &str = "GSI2";
pub const GSI2_PK: &str = "GSI2PK";
pub const GSI2_SK: &str = "GSI2SK";

// ============================================================================
// Key prefixes
// ============================================================================

pub const QUOTE_PREFIX: &str = "QUOTE#";
pub const LOCALE_PREFIX: &str = "LOCALE#";
pub const AUTHOR_PREFIX: &str = "AUTHOR#";
pub const TOPIC_PREFIX: &str = "TOPIC#";

// ============================================================================
// Quote keys
// ============================================================================

/// Pattern: `QUOTE#<quote_id>`
pub fn quote_pk(quote_id: &str) -> String {
    format!("{QUOTE_PREFIX}{quote_id}")
}

/// Pattern: `QUOTE#<quote_id>` (same as PK for single-item access)
pub fn quote_sk(quote_id: &str) -> String {
    format!("{QUOTE_PREFIX}{quote_id}")
}

/// By-locale partition. Pattern: `LOCALE#<country>_<lang>`
pub fn quote_gsi1_pk(country: &str, lang: &str) -> String {
    format!("{LOCALE_PREFIX}{}", locale_key(country, lang))
}

/// By-author partition. Pattern: `AUTHOR#<author_id>`
pub fn quote_gsi2_pk(author_id: &str) -> String {
    format!("{AUTHOR_PREFIX}{author_id}")
}

/// Sort key shared by every recency index: the canonical `lastFoundAt` string.
pub fn recency_sk(last_found_at: &DateTime<Utc>) -> String {
    format_timestamp(last_found_at)
}

// ============================================================================
// TopicQuote keys
// ============================================================================

/// Pattern: `TOPIC#<topic_id>`
pub fn topic_quote_pk(topic_id: &str) -> String {
    format!("{TOPIC_PREFIX}{topic_id}")
}

/// Pattern: `QUOTE#<quote_id>`
pub fn topic_quote_sk(quote_id: &str) -> String {
    format!("{QUOTE_PREFIX}{quote_id}")
}

/// By-topic partition. Pattern: `TOPIC#<topic_id>`
pub fn topic_quote_gsi1_pk(topic_id: &str) -> String {
    format!("{TOPIC_PREFIX}{topic_id}")
}

// ============================================================================
// Index selection
// ============================================================================

/// Kind of item an index partition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedItem {
    Quote,
    TopicQuote { topic_id: String },
}

/// A recency index partition: the index, its key attributes and the partition value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPartition {
    pub index_name: &'static str,
    pub pk_attribute: &'static str,
    pub sk_attribute: &'static str,
    pub pk_value: String,
    pub item: IndexedItem,
}

impl IndexPartition {
    /// Table `(PK, SK)` of the partition's entry for a quote.
    pub fn item_key(&self, quote_id: &str) -> (String, String) {
        match &self.item {
            IndexedItem::Quote => (quote_pk(quote_id), quote_sk(quote_id)),
            IndexedItem::TopicQuote { topic_id } => {
                (topic_quote_pk(topic_id), topic_quote_sk(quote_id))
            }
        }
    }
}

/// Resolves a quote index to its GSI partition.
pub fn quote_index_partition(index: &QuoteIndex) -> IndexPartition {
    match index {
        QuoteIndex::Locale { country, lang } => IndexPartition {
            index_name: GSI1,
            pk_attribute: GSI1_PK,
            sk_attribute: GSI1_SK,
            pk_value: quote_gsi1_pk(country, lang),
            item: IndexedItem::Quote,
        },
        QuoteIndex::Author { author_id } => IndexPartition {
            index_name: GSI2,
            pk_attribute: GSI2_PK,
            sk_attribute: GSI2_SK,
            pk_value: quote_gsi2_pk(author_id),
            item: IndexedItem::Quote,
        },
    }
}

/// The by-topic recency partition.
pub fn topic_index_partition(topic_id: &str) -> IndexPartition {
    IndexPartition {
        index_name: GSI1,
        pk_attribute: GSI1_PK,
        sk_attribute: GSI1_SK,
        pk_value: topic_quote_gsi1_pk(topic_id),
        item: IndexedItem::TopicQuote {
            topic_id: topic_id.to_string(),
        },
    }
}
