//! Pure functions over quotes: identity, index keys, fan-out and updates.

use sha2::{Digest, Sha256};

use super::requests::QuoteChanges;
use super::types::{Quote, QuoteField, TopicQuote};

/// Number of hash characters kept in a quote id.
const ID_HASH_LEN: usize = 32;

/// Collapses whitespace runs and lowercases, so cosmetic edits map to the same id.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Derives a quote id from its content.
///
/// The id is the locale followed by a truncated SHA-256 of the author id and the
/// normalized text.
///
/// ```
/// use quotes_core::quote::quote_id;
///
/// let a = quote_id("md", "ro", "author1", "Hello  World");
/// let b = quote_id("md", "ro", "author1", "hello world");
/// assert_eq!(a, b);
/// assert!(a.starts_with("mdro"));
/// assert_eq!(a.len(), 4 + 32);
/// ```
pub fn quote_id(country: &str, lang: &str, author_id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(author_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(normalize_text(text).as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!(
        "{}{}{}",
        country.to_lowercase(),
        lang.to_lowercase(),
        &digest[..ID_HASH_LEN]
    )
}

/// Partition value of the by-locale index.
pub fn locale_key(country: &str, lang: &str) -> String {
    format!("{}_{}", country.to_lowercase(), lang.to_lowercase())
}

/// One fan-out record per topic, in topic order.
pub fn topic_quotes_for(quote: &Quote) -> Vec<TopicQuote> {
    quote
        .topics
        .iter()
        .map(|topic| TopicQuote {
            topic_id: topic.id.clone(),
            quote_id: quote.id.clone(),
            last_found_at: quote.last_found_at,
            expires_at: quote.expires_at,
            relation: topic.relation(),
        })
        .collect()
}

/// Returns the quote with `changes` applied. Removals run after assignments.
pub fn apply_update(quote: &Quote, changes: &QuoteChanges) -> Quote {
    let mut updated = quote.clone();

    if let Some(count_views) = changes.count_views {
        updated.count_views = Some(count_views);
    }
    if let Some(last_found_at) = changes.last_found_at {
        updated.last_found_at = last_found_at;
    }
    if let Some(expires_at) = changes.expires_at {
        updated.expires_at = expires_at;
    }

    for field in &changes.remove {
        if *field == QuoteField::CountViews {
            updated.count_views = None;
        }
    }

    updated
}

/// Whether the fan-out records of the updated quote must be rewritten.
pub fn needs_fan_out(changes: &QuoteChanges, updated: &Quote) -> bool {
    changes.last_found_at.is_some() && !updated.topics.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{QuoteAuthor, QuoteSource, Topic, TopicRelation};
    use chrono::{TimeZone, Utc};

    fn quote_with_topics(topics: Vec<Topic>) -> Quote {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        Quote {
            id: quote_id("md", "ro", "a1", "text"),
            author: QuoteAuthor::new("a1", "Author"),
            country: "md".to_string(),
            lang: "ro".to_string(),
            source: QuoteSource::new("host", "/", "s1", "Title"),
            text: "text".to_string(),
            topics,
            count_views: Some(1),
            created_at: at,
            last_found_at: at,
            expires_at: 1_000,
        }
    }

    #[test]
    fn test_quote_id_depends_on_author_and_locale() {
        let base = quote_id("md", "ro", "a1", "text");
        assert_ne!(base, quote_id("md", "ro", "a2", "text"));
        assert_ne!(base, quote_id("ro", "ro", "a1", "text"));
        assert_eq!(base, quote_id("MD", "RO", "a1", " TEXT "));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  A\tquick \n\n Fox "), "a quick fox");
    }

    #[test]
    fn test_locale_key() {
        assert_eq!(locale_key("MD", "ro"), "md_ro");
    }

    #[test]
    fn test_topic_quotes_copy_recency_and_relation() {
        let quote = quote_with_topics(vec![
            Topic::new("t1", "One"),
            Topic::new("t2", "Two").with_rel(TopicRelation::Mention),
        ]);
        let records = topic_quotes_for(&quote);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].topic_id, "t1");
        assert_eq!(records[0].relation, TopicRelation::Primary);
        assert_eq!(records[1].relation, TopicRelation::Mention);
        assert!(records
            .iter()
            .all(|r| r.quote_id == quote.id
                && r.last_found_at == quote.last_found_at
                && r.expires_at == quote.expires_at));
    }

    #[test]
    fn test_topic_quotes_empty_without_topics() {
        assert!(topic_quotes_for(&quote_with_topics(vec![])).is_empty());
    }

    #[test]
    fn test_apply_update_sets_and_removes() {
        let quote = quote_with_topics(vec![]);
        let later = quote.last_found_at + chrono::Duration::hours(1);
        let changes = QuoteChanges {
            last_found_at: Some(later),
            expires_at: Some(2_000),
            remove: vec![QuoteField::CountViews],
            ..Default::default()
        };

        let updated = apply_update(&quote, &changes);
        assert_eq!(updated.last_found_at, later);
        assert_eq!(updated.expires_at, 2_000);
        assert_eq!(updated.count_views, None);
        assert_eq!(updated.text, quote.text);
        assert_eq!(updated.created_at, quote.created_at);
    }

    #[test]
    fn test_needs_fan_out() {
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let touch = QuoteChanges {
            last_found_at: Some(later),
            ..Default::default()
        };
        let views = QuoteChanges {
            count_views: Some(9),
            ..Default::default()
        };

        let with_topics = quote_with_topics(vec![Topic::new("t1", "One")]);
        assert!(needs_fan_out(&touch, &with_topics));
        assert!(!needs_fan_out(&views, &with_topics));
        assert!(!needs_fan_out(&touch, &quote_with_topics(vec![])));
    }
}
