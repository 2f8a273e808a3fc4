//! Request types for quote operations.
//!
//! Pure data with builders. Update payloads arrive loosely typed and are only
//! turned into [`QuoteChanges`] by [`super::validate_update`].

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operations::quote_id;
use super::types::{Quote, QuoteAuthor, QuoteField, QuoteSource, Topic, TopicRelation};
use crate::serde::{format_timestamp, truncate_timestamp};
use crate::storage::IndexCursor;

/// Days a quote lives after it was last found, unless configured otherwise.
pub const DEFAULT_TTL_DAYS: i64 = 180;

/// Limit applied by list queries when the caller does not pick one.
pub const DEFAULT_LIMIT: usize = 20;

/// Request payload for a new quote. The id and timestamps are derived on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub author: QuoteAuthor,
    pub country: String,
    pub lang: String,
    pub source: QuoteSource,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_views: Option<u64>,
}

impl NewQuote {
    pub fn new(
        author: QuoteAuthor,
        country: impl Into<String>,
        lang: impl Into<String>,
        source: QuoteSource,
        text: impl Into<String>,
    ) -> Self {
        Self {
            author,
            country: country.into(),
            lang: lang.into(),
            source,
            text: text.into(),
            topics: Vec::new(),
            count_views: None,
        }
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    pub fn with_topics(mut self, topics: impl IntoIterator<Item = Topic>) -> Self {
        self.topics.extend(topics);
        self
    }

    pub fn with_count_views(mut self, count_views: u64) -> Self {
        self.count_views = Some(count_views);
        self
    }

    /// Builds the quote as found at `now`, expiring `ttl` later.
    ///
    /// Country and language are lowercased and the text trimmed before the id is derived.
    pub fn into_quote(self, now: DateTime<Utc>, ttl: Duration) -> Quote {
        let now = truncate_timestamp(now);
        let country = self.country.trim().to_lowercase();
        let lang = self.lang.trim().to_lowercase();
        let text = self.text.trim().to_string();
        let id = quote_id(&country, &lang, &self.author.id, &text);

        Quote {
            id,
            author: self.author,
            country,
            lang,
            source: self.source,
            text,
            topics: self.topics,
            count_views: self.count_views,
            created_at: now,
            last_found_at: now,
            expires_at: (now + ttl).timestamp(),
        }
    }

    pub fn into_quote_now(self, ttl: Duration) -> Quote {
        self.into_quote(Utc::now(), ttl)
    }
}

/// Partial update payload as received from callers.
///
/// `set` assigns attribute values, `delete` removes attributes. Nothing here is
/// checked; see [`super::validate_update`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<BTreeMap<QuoteField, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<QuoteField>>,
}

impl QuoteUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            set: None,
            delete: None,
        }
    }

    /// Assigns an arbitrary attribute. Immutable fields are rejected at validation.
    pub fn set_field(mut self, field: QuoteField, value: impl Into<Value>) -> Self {
        self.set
            .get_or_insert_with(BTreeMap::new)
            .insert(field, value.into());
        self
    }

    pub fn set_count_views(self, count_views: u64) -> Self {
        self.set_field(QuoteField::CountViews, count_views)
    }

    pub fn set_last_found_at(self, last_found_at: DateTime<Utc>) -> Self {
        let formatted = format_timestamp(&truncate_timestamp(last_found_at));
        self.set_field(QuoteField::LastFoundAt, formatted)
    }

    pub fn set_expires_at(self, expires_at: i64) -> Self {
        self.set_field(QuoteField::ExpiresAt, expires_at)
    }

    pub fn remove(mut self, field: QuoteField) -> Self {
        self.delete.get_or_insert_with(Vec::new).push(field);
        self
    }
}

/// A validated update: typed assignments for the mutable fields plus removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteChanges {
    pub count_views: Option<u64>,
    pub last_found_at: Option<DateTime<Utc>>,
    pub expires_at: Option<i64>,
    pub remove: Vec<QuoteField>,
}

impl QuoteChanges {
    /// True when applying the changes would leave a record untouched.
    pub fn is_empty(&self) -> bool {
        self.count_views.is_none()
            && self.last_found_at.is_none()
            && self.expires_at.is_none()
            && self.remove.is_empty()
    }

    /// Fields assigned by this change set, in storage order.
    pub fn set_fields(&self) -> Vec<QuoteField> {
        let mut fields = Vec::new();
        if self.count_views.is_some() {
            fields.push(QuoteField::CountViews);
        }
        if self.last_found_at.is_some() {
            fields.push(QuoteField::LastFoundAt);
        }
        if self.expires_at.is_some() {
            fields.push(QuoteField::ExpiresAt);
        }
        fields
    }
}

/// Parameters for the latest quotes of a locale.
///
/// `cursor` is exclusive: only quotes past it in recency order are returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestQuotesParams {
    pub country: String,
    pub lang: String,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<IndexCursor>,
}

impl LatestQuotesParams {
    pub fn new(country: impl Into<String>, lang: impl Into<String>, limit: usize) -> Self {
        Self {
            country: country.into(),
            lang: lang.into(),
            limit,
            cursor: None,
        }
    }

    /// Resumes after the given index position, usually the last quote of the previous page.
    pub fn after(mut self, cursor: impl Into<IndexCursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Parameters for the latest quotes of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestByAuthorParams {
    pub author_id: String,
    pub country: String,
    pub lang: String,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<IndexCursor>,
}

impl LatestByAuthorParams {
    pub fn new(
        author_id: impl Into<String>,
        country: impl Into<String>,
        lang: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            country: country.into(),
            lang: lang.into(),
            limit,
            cursor: None,
        }
    }

    /// Resumes after the given index position, usually the last quote of the previous page.
    pub fn after(mut self, cursor: impl Into<IndexCursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Parameters for the latest quotes referencing a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestByTopicParams {
    pub topic_id: String,
    pub country: String,
    pub lang: String,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<IndexCursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<TopicRelation>,
}

impl LatestByTopicParams {
    pub fn new(
        topic_id: impl Into<String>,
        country: impl Into<String>,
        lang: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            country: country.into(),
            lang: lang.into(),
            limit,
            cursor: None,
            relation: None,
        }
    }

    /// Resumes after the given index position, usually the last quote of the previous page.
    pub fn after(mut self, cursor: impl Into<IndexCursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_relation(mut self, relation: TopicRelation) -> Self {
        self.relation = Some(relation);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountParams {
    pub country: String,
    pub lang: String,
}

impl CountParams {
    pub fn new(country: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountByAuthorParams {
    pub author_id: String,
    pub country: String,
    pub lang: String,
}

impl CountByAuthorParams {
    pub fn new(
        author_id: impl Into<String>,
        country: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            country: country.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountByTopicParams {
    pub topic_id: String,
    pub country: String,
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<TopicRelation>,
}

impl CountByTopicParams {
    pub fn new(
        topic_id: impl Into<String>,
        country: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            country: country.into(),
            lang: lang.into(),
            relation: None,
        }
    }

    pub fn with_relation(mut self, relation: TopicRelation) -> Self {
        self.relation = Some(relation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_quote() -> NewQuote {
        NewQuote::new(
            QuoteAuthor::new("qtopic1", "Vlad Filat"),
            "MD",
            "ro",
            QuoteSource::new("protv.md", "/stiri", "news1", "Titlu"),
            "  Stire importanta ",
        )
    }

    #[test]
    fn test_into_quote_derives_id_and_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
            + Duration::nanoseconds(1_500_000);
        let quote = new_quote()
            .with_topic(Topic::new("qtopic1", "Vlad Filat"))
            .into_quote(now, Duration::days(DEFAULT_TTL_DAYS));

        assert_eq!(quote.country, "md");
        assert_eq!(quote.text, "Stire importanta");
        assert!(quote.id.starts_with("mdro"));
        assert_eq!(quote.id, quote_id("md", "ro", "qtopic1", "Stire importanta"));
        assert_eq!(quote.created_at, quote.last_found_at);
        assert_eq!(quote.last_found_at.timestamp_subsec_millis(), 1);
        assert_eq!(
            quote.expires_at,
            quote.last_found_at.timestamp() + DEFAULT_TTL_DAYS * 24 * 60 * 60
        );
        assert_eq!(quote.topics.len(), 1);
    }

    #[test]
    fn test_update_builder_collects_set_and_delete() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let update = QuoteUpdate::new("q1")
            .set_last_found_at(at)
            .set_expires_at(100)
            .remove(QuoteField::CountViews);

        let set = update.set.as_ref().unwrap();
        assert_eq!(set[&QuoteField::LastFoundAt], "2024-06-15T10:30:00.000Z");
        assert_eq!(set[&QuoteField::ExpiresAt], 100);
        assert_eq!(update.delete, Some(vec![QuoteField::CountViews]));
    }

    #[test]
    fn test_update_deserializes_from_json() {
        let json = r#"{"id":"q1","set":{"countViews":4},"delete":["countViews"]}"#;
        let update: QuoteUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.set.unwrap()[&QuoteField::CountViews], 4);
        assert_eq!(update.delete, Some(vec![QuoteField::CountViews]));
    }

    #[test]
    fn test_changes_emptiness() {
        assert!(QuoteChanges::default().is_empty());

        let changes = QuoteChanges {
            expires_at: Some(10),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        assert_eq!(changes.set_fields(), vec![QuoteField::ExpiresAt]);
    }

    #[test]
    fn test_topic_params_builder() {
        let params = LatestByTopicParams::new("t1", "md", "ro", 5)
            .with_relation(TopicRelation::Mention);
        assert_eq!(params.relation, Some(TopicRelation::Mention));
        assert_eq!(params.cursor, None);
    }

    #[test]
    fn test_params_resume_after_quote() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let quote = new_quote().into_quote(now, Duration::days(DEFAULT_TTL_DAYS));
        let params = LatestQuotesParams::new("md", "ro", 5).after(&quote);

        assert_eq!(
            params.cursor,
            Some(IndexCursor::new(quote.last_found_at, &quote.id))
        );
    }
}
