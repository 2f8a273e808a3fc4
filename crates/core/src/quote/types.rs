use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// The person or organization a quote is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteAuthor {
    pub id: String,
    pub name: String,
}

impl QuoteAuthor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Where a quote was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSource {
    pub host: String,
    pub path: String,
    /// Identifier of the source document (e.g. a news item id).
    pub id: String,
    pub title: String,
}

impl QuoteSource {
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Kind of entity a topic represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicType {
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "PLACE")]
    Place,
    #[serde(rename = "PRODUCT")]
    Product,
    #[serde(rename = "EVENT")]
    Event,
    #[serde(rename = "WORK")]
    Work,
}

impl TopicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicType::Person => "PERSON",
            TopicType::Organization => "ORG",
            TopicType::Place => "PLACE",
            TopicType::Product => "PRODUCT",
            TopicType::Event => "EVENT",
            TopicType::Work => "WORK",
        }
    }
}

impl FromStr for TopicType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERSON" => Ok(TopicType::Person),
            "ORG" => Ok(TopicType::Organization),
            "PLACE" => Ok(TopicType::Place),
            "PRODUCT" => Ok(TopicType::Product),
            "EVENT" => Ok(TopicType::Event),
            "WORK" => Ok(TopicType::Work),
            _ => Err(ValidationError::UnknownTopicType(s.to_string())),
        }
    }
}

/// How a topic relates to the quote that references it.
///
/// A topic without an explicit relation is the quote's primary subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicRelation {
    #[default]
    Primary,
    Mention,
}

impl TopicRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicRelation::Primary => "PRIMARY",
            TopicRelation::Mention => "MENTION",
        }
    }
}

impl fmt::Display for TopicRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRIMARY" => Ok(TopicRelation::Primary),
            "MENTION" => Ok(TopicRelation::Mention),
            _ => Err(ValidationError::UnknownRelation(s.to_string())),
        }
    }
}

/// A topic referenced by a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbr: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TopicType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<TopicRelation>,
}

impl Topic {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: None,
            abbr: None,
            kind: None,
            rel: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_abbr(mut self, abbr: impl Into<String>) -> Self {
        self.abbr = Some(abbr.into());
        self
    }

    pub fn with_type(mut self, kind: TopicType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_rel(mut self, rel: TopicRelation) -> Self {
        self.rel = Some(rel);
        self
    }

    /// The effective relation, defaulting to [`TopicRelation::Primary`].
    pub fn relation(&self) -> TopicRelation {
        self.rel.unwrap_or_default()
    }
}

/// A quote attributed to an author, found in a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Content-derived identifier, see [`super::quote_id`].
    pub id: String,
    pub author: QuoteAuthor,
    pub country: String,
    pub lang: String,
    pub source: QuoteSource,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_views: Option<u64>,
    #[serde(with = "crate::serde::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last time the quote was seen in a source. Drives recency ordering.
    #[serde(with = "crate::serde::timestamp")]
    pub last_found_at: DateTime<Utc>,
    /// Expiry as epoch seconds.
    pub expires_at: i64,
}

impl Quote {
    /// Index partition for the quote's locale.
    pub fn locale_key(&self) -> String {
        super::locale_key(&self.country, &self.lang)
    }

    /// Copies the requested attributes into a [`PartialQuote`]. The id is always kept.
    pub fn project(&self, fields: &[QuoteField]) -> PartialQuote {
        let mut partial = PartialQuote::identity(self.id.clone());
        for field in fields {
            match field {
                QuoteField::Id => {}
                QuoteField::Author => partial.author = Some(self.author.clone()),
                QuoteField::Country => partial.country = Some(self.country.clone()),
                QuoteField::Lang => partial.lang = Some(self.lang.clone()),
                QuoteField::Source => partial.source = Some(self.source.clone()),
                QuoteField::Text => partial.text = Some(self.text.clone()),
                QuoteField::Topics => partial.topics = Some(self.topics.clone()),
                QuoteField::CountViews => partial.count_views = self.count_views,
                QuoteField::CreatedAt => partial.created_at = Some(self.created_at),
                QuoteField::LastFoundAt => partial.last_found_at = Some(self.last_found_at),
                QuoteField::ExpiresAt => partial.expires_at = Some(self.expires_at),
            }
        }
        partial
    }
}

/// Attribute names of a [`Quote`], as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteField {
    Id,
    Author,
    Country,
    Lang,
    Source,
    Text,
    Topics,
    CountViews,
    CreatedAt,
    LastFoundAt,
    ExpiresAt,
}

impl QuoteField {
    pub const ALL: [QuoteField; 11] = [
        QuoteField::Id,
        QuoteField::Author,
        QuoteField::Country,
        QuoteField::Lang,
        QuoteField::Source,
        QuoteField::Text,
        QuoteField::Topics,
        QuoteField::CountViews,
        QuoteField::CreatedAt,
        QuoteField::LastFoundAt,
        QuoteField::ExpiresAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteField::Id => "id",
            QuoteField::Author => "author",
            QuoteField::Country => "country",
            QuoteField::Lang => "lang",
            QuoteField::Source => "source",
            QuoteField::Text => "text",
            QuoteField::Topics => "topics",
            QuoteField::CountViews => "countViews",
            QuoteField::CreatedAt => "createdAt",
            QuoteField::LastFoundAt => "lastFoundAt",
            QuoteField::ExpiresAt => "expiresAt",
        }
    }

    /// Fields an update may assign.
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            QuoteField::CountViews | QuoteField::LastFoundAt | QuoteField::ExpiresAt
        )
    }

    /// Fields an update may remove.
    pub fn is_removable(&self) -> bool {
        matches!(self, QuoteField::CountViews)
    }
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

/// A quote read with a field projection. Only `id` is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialQuote {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<QuoteAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<QuoteSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_views: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serde::optional_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serde::optional_timestamp"
    )]
    pub last_found_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl PartialQuote {
    /// A projection holding only the id.
    pub fn identity(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Names of the attributes present, `id` first.
    pub fn present_fields(&self) -> Vec<QuoteField> {
        let mut fields = vec![QuoteField::Id];
        let checks = [
            (QuoteField::Author, self.author.is_some()),
            (QuoteField::Country, self.country.is_some()),
            (QuoteField::Lang, self.lang.is_some()),
            (QuoteField::Source, self.source.is_some()),
            (QuoteField::Text, self.text.is_some()),
            (QuoteField::Topics, self.topics.is_some()),
            (QuoteField::CountViews, self.count_views.is_some()),
            (QuoteField::CreatedAt, self.created_at.is_some()),
            (QuoteField::LastFoundAt, self.last_found_at.is_some()),
            (QuoteField::ExpiresAt, self.expires_at.is_some()),
        ];
        fields.extend(
            checks
                .into_iter()
                .filter(|(_, present)| *present)
                .map(|(field, _)| field),
        );
        fields
    }
}

impl From<Quote> for PartialQuote {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            author: Some(quote.author),
            country: Some(quote.country),
            lang: Some(quote.lang),
            source: Some(quote.source),
            text: Some(quote.text),
            topics: Some(quote.topics),
            count_views: quote.count_views,
            created_at: Some(quote.created_at),
            last_found_at: Some(quote.last_found_at),
            expires_at: Some(quote.expires_at),
        }
    }
}

impl TryFrom<PartialQuote> for Quote {
    type Error = QuoteField;

    /// Fails with the first required field that is missing.
    fn try_from(partial: PartialQuote) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: partial.id,
            author: partial.author.ok_or(QuoteField::Author)?,
            country: partial.country.ok_or(QuoteField::Country)?,
            lang: partial.lang.ok_or(QuoteField::Lang)?,
            source: partial.source.ok_or(QuoteField::Source)?,
            text: partial.text.ok_or(QuoteField::Text)?,
            topics: partial.topics.unwrap_or_default(),
            count_views: partial.count_views,
            created_at: partial.created_at.ok_or(QuoteField::CreatedAt)?,
            last_found_at: partial.last_found_at.ok_or(QuoteField::LastFoundAt)?,
            expires_at: partial.expires_at.ok_or(QuoteField::ExpiresAt)?,
        })
    }
}

/// Denormalized membership of a quote in a topic's recency index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicQuote {
    pub topic_id: String,
    pub quote_id: String,
    #[serde(with = "crate::serde::timestamp")]
    pub last_found_at: DateTime<Utc>,
    pub expires_at: i64,
    pub relation: TopicRelation,
}
