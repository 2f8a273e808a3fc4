//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! Nested values (`author`, `source`, `topics`) are stored as JSON strings.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use quotes_core::quote::{PartialQuote, Quote, QuoteField, TopicQuote, TopicRelation};
use quotes_core::serde::{format_timestamp, parse_timestamp};
use quotes_core::storage::RepositoryError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::keys;

pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Entity type constants
// ============================================================================

pub const ENTITY_TYPE: &str = "entityType";
pub const ENTITY_TYPE_QUOTE: &str = "QUOTE";
pub const ENTITY_TYPE_TOPIC_QUOTE: &str = "TOPIC_QUOTE";

// ============================================================================
// TopicQuote attribute names
// ============================================================================

pub const TOPIC_ID: &str = "topicId";
pub const QUOTE_ID: &str = "quoteId";
pub const RELATION: &str = "relation";

// ============================================================================
// Quote conversions
// ============================================================================

/// Convert a Quote to a DynamoDB item, index keys included.
pub fn quote_to_item(quote: &Quote) -> Result<Item, RepositoryError> {
    let mut item = HashMap::new();
    let recency = keys::recency_sk(&quote.last_found_at);

    // Keys
    item.insert(keys::PK.to_string(), s(keys::quote_pk(&quote.id)));
    item.insert(keys::SK.to_string(), s(keys::quote_sk(&quote.id)));
    item.insert(
        keys::GSI1_PK.to_string(),
        s(keys::quote_gsi1_pk(&quote.country, &quote.lang)),
    );
    item.insert(keys::GSI1_SK.to_string(), s(recency.clone()));
    item.insert(
        keys::GSI2_PK.to_string(),
        s(keys::quote_gsi2_pk(&quote.author.id)),
    );
    item.insert(keys::GSI2_SK.to_string(), s(recency));

    item.insert(ENTITY_TYPE.to_string(), s(ENTITY_TYPE_QUOTE));

    // Data
    item.insert(attr(QuoteField::Id), s(&quote.id));
    item.insert(attr(QuoteField::Author), s(to_json(&quote.author)?));
    item.insert(attr(QuoteField::Country), s(&quote.country));
    item.insert(attr(QuoteField::Lang), s(&quote.lang));
    item.insert(attr(QuoteField::Source), s(to_json(&quote.source)?));
    item.insert(attr(QuoteField::Text), s(&quote.text));
    if !quote.topics.is_empty() {
        item.insert(attr(QuoteField::Topics), s(to_json(&quote.topics)?));
    }
    if let Some(count_views) = quote.count_views {
        item.insert(attr(QuoteField::CountViews), n(count_views));
    }
    item.insert(
        attr(QuoteField::CreatedAt),
        s(format_timestamp(&quote.created_at)),
    );
    item.insert(
        attr(QuoteField::LastFoundAt),
        s(format_timestamp(&quote.last_found_at)),
    );
    item.insert(attr(QuoteField::ExpiresAt), n(quote.expires_at));

    Ok(item)
}

/// Convert a DynamoDB item to a Quote. Every required attribute must be present.
pub fn item_to_quote(item: &Item) -> Result<Quote, RepositoryError> {
    let partial = item_to_partial_quote(item)?;
    Quote::try_from(partial).map_err(|field| {
        RepositoryError::InvalidData(format!("Missing or invalid field: {}", field))
    })
}

/// Convert a (possibly projected) DynamoDB item to a PartialQuote.
pub fn item_to_partial_quote(item: &Item) -> Result<PartialQuote, RepositoryError> {
    Ok(PartialQuote {
        id: get_string(item, QuoteField::Id.as_str())?,
        author: get_optional_json(item, QuoteField::Author.as_str())?,
        country: get_optional_string(item, QuoteField::Country.as_str()),
        lang: get_optional_string(item, QuoteField::Lang.as_str()),
        source: get_optional_json(item, QuoteField::Source.as_str())?,
        text: get_optional_string(item, QuoteField::Text.as_str()),
        topics: get_optional_json(item, QuoteField::Topics.as_str())?,
        count_views: get_optional_number(item, QuoteField::CountViews.as_str())?,
        created_at: get_optional_datetime(item, QuoteField::CreatedAt.as_str())?,
        last_found_at: get_optional_datetime(item, QuoteField::LastFoundAt.as_str())?,
        expires_at: get_optional_number(item, QuoteField::ExpiresAt.as_str())?,
    })
}

// ============================================================================
// TopicQuote conversions
// ============================================================================

/// Convert a TopicQuote to a DynamoDB item.
pub fn topic_quote_to_item(topic_quote: &TopicQuote) -> Item {
    let mut item = HashMap::new();

    // Keys
    item.insert(
        keys::PK.to_string(),
        s(keys::topic_quote_pk(&topic_quote.topic_id)),
    );
    item.insert(
        keys::SK.to_string(),
        s(keys::topic_quote_sk(&topic_quote.quote_id)),
    );
    item.insert(
        keys::GSI1_PK.to_string(),
        s(keys::topic_quote_gsi1_pk(&topic_quote.topic_id)),
    );
    item.insert(
        keys::GSI1_SK.to_string(),
        s(keys::recency_sk(&topic_quote.last_found_at)),
    );

    item.insert(ENTITY_TYPE.to_string(), s(ENTITY_TYPE_TOPIC_QUOTE));

    // Data
    item.insert(TOPIC_ID.to_string(), s(&topic_quote.topic_id));
    item.insert(QUOTE_ID.to_string(), s(&topic_quote.quote_id));
    item.insert(
        attr(QuoteField::LastFoundAt),
        s(format_timestamp(&topic_quote.last_found_at)),
    );
    item.insert(attr(QuoteField::ExpiresAt), n(topic_quote.expires_at));
    item.insert(RELATION.to_string(), s(topic_quote.relation.as_str()));

    item
}

/// Convert a DynamoDB item to a TopicQuote. A missing relation reads as primary.
pub fn item_to_topic_quote(item: &Item) -> Result<TopicQuote, RepositoryError> {
    let relation = match get_optional_string(item, RELATION) {
        Some(value) => value
            .parse::<TopicRelation>()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?,
        None => TopicRelation::default(),
    };

    Ok(TopicQuote {
        topic_id: get_string(item, TOPIC_ID)?,
        quote_id: get_string(item, QUOTE_ID)?,
        last_found_at: get_datetime(item, QuoteField::LastFoundAt.as_str())?,
        expires_at: get_number(item, QuoteField::ExpiresAt.as_str())?,
        relation,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn attr(field: QuoteField) -> String {
    field.as_str().to_string()
}

pub fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

pub fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(RepositoryError::from)
}

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required numeric attribute.
fn get_number<T: std::str::FromStr>(item: &Item, key: &str) -> Result<T, RepositoryError> {
    get_optional_number(item, key)?
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional numeric attribute. Present but unparsable is an error.
fn get_optional_number<T: std::str::FromStr>(
    item: &Item,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    match item.get(key).and_then(|v| v.as_n().ok()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RepositoryError::InvalidData(format!("Invalid number {}: {}", key, raw))),
        None => Ok(None),
    }
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    get_optional_datetime(item, key)?
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

fn get_optional_datetime(item: &Item, key: &str) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    get_optional_string(item, key)
        .map(|raw| {
            parse_timestamp(&raw).map_err(|e| {
                RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e))
            })
        })
        .transpose()
}

/// Get an optional attribute holding a JSON document.
fn get_optional_json<T: DeserializeOwned>(
    item: &Item,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    get_optional_string(item, key)
        .map(|raw| serde_json::from_str(&raw).map_err(RepositoryError::from))
        .transpose()
}
