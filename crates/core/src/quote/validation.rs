use std::collections::HashSet;

use serde_json::Value;

use super::error::ValidationError;
use super::operations::quote_id;
use super::requests::{QuoteChanges, QuoteUpdate};
use super::types::{Quote, QuoteField};
use crate::serde::{parse_timestamp, truncate_timestamp};

/// Maximum quote text length, in characters.
pub const MAX_TEXT_LEN: usize = 1000;

fn is_locale_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())
}

/// Validates a quote before creation.
pub fn validate_quote(quote: &Quote) -> Result<(), ValidationError> {
    let text = quote.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TextTooLong { max: MAX_TEXT_LEN });
    }
    if !is_locale_code(&quote.country) {
        return Err(ValidationError::InvalidCountry(quote.country.clone()));
    }
    if !is_locale_code(&quote.lang) {
        return Err(ValidationError::InvalidLang(quote.lang.clone()));
    }
    if quote.author.id.trim().is_empty() || quote.author.name.trim().is_empty() {
        return Err(ValidationError::InvalidAuthor);
    }
    if quote.source.host.trim().is_empty() || quote.source.id.trim().is_empty() {
        return Err(ValidationError::InvalidSource);
    }

    let mut seen = HashSet::new();
    for topic in &quote.topics {
        if topic.id.trim().is_empty() || topic.name.trim().is_empty() {
            return Err(ValidationError::InvalidTopic(topic.id.clone()));
        }
        if !seen.insert(topic.id.as_str()) {
            return Err(ValidationError::DuplicateTopic(topic.id.clone()));
        }
    }

    let expected = quote_id(&quote.country, &quote.lang, &quote.author.id, &quote.text);
    if quote.id != expected {
        return Err(ValidationError::IdMismatch {
            expected,
            actual: quote.id.clone(),
        });
    }

    Ok(())
}

fn invalid_value(field: QuoteField, reason: &str) -> ValidationError {
    ValidationError::InvalidFieldValue {
        field: field.as_str().to_string(),
        reason: reason.to_string(),
    }
}

/// Checks an update payload against the mutable-field whitelists and types its values.
pub fn validate_update(update: &QuoteUpdate) -> Result<QuoteChanges, ValidationError> {
    if update.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if update.set.is_none() && update.delete.is_none() {
        return Err(ValidationError::EmptyUpdate);
    }

    let mut changes = QuoteChanges::default();

    for (field, value) in update.set.iter().flatten() {
        if !field.is_settable() {
            return Err(ValidationError::FieldNotAllowed(field.as_str().to_string()));
        }
        match field {
            QuoteField::CountViews => {
                let count = value
                    .as_u64()
                    .ok_or_else(|| invalid_value(*field, "expected a non-negative integer"))?;
                changes.count_views = Some(count);
            }
            QuoteField::LastFoundAt => {
                let ts = value
                    .as_str()
                    .and_then(|s| parse_timestamp(s).ok())
                    .ok_or_else(|| invalid_value(*field, "expected an RFC 3339 timestamp"))?;
                changes.last_found_at = Some(truncate_timestamp(ts));
            }
            QuoteField::ExpiresAt => {
                let epoch = match value {
                    Value::Number(n) => n.as_i64(),
                    _ => None,
                }
                .ok_or_else(|| invalid_value(*field, "expected epoch seconds"))?;
                changes.expires_at = Some(epoch);
            }
            _ => return Err(ValidationError::FieldNotAllowed(field.as_str().to_string())),
        }
    }

    for field in update.delete.iter().flatten() {
        if !field.is_removable() {
            return Err(ValidationError::FieldNotAllowed(field.as_str().to_string()));
        }
        if changes.set_fields().contains(field) {
            return Err(ValidationError::ConflictingField(field.as_str().to_string()));
        }
        if !changes.remove.contains(field) {
            changes.remove.push(*field);
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{NewQuote, QuoteAuthor, QuoteSource, Topic};
    use chrono::{Duration, TimeZone, Utc};

    fn valid_quote() -> Quote {
        NewQuote::new(
            QuoteAuthor::new("a1", "Author"),
            "md",
            "ro",
            QuoteSource::new("protv.md", "/", "news1", "Title"),
            "Some words",
        )
        .with_topic(Topic::new("t1", "Topic"))
        .into_quote(
            Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap(),
            Duration::days(1),
        )
    }

    #[test]
    fn test_valid_quote_passes() {
        assert_eq!(validate_quote(&valid_quote()), Ok(()));
    }

    #[test]
    fn test_quote_rejections() {
        let mut quote = valid_quote();
        quote.text = "   ".to_string();
        assert_eq!(validate_quote(&quote), Err(ValidationError::EmptyText));

        let mut quote = valid_quote();
        quote.country = "MDA".to_string();
        assert_eq!(
            validate_quote(&quote),
            Err(ValidationError::InvalidCountry("MDA".to_string()))
        );

        let mut quote = valid_quote();
        quote.topics.push(Topic::new("t1", "Again"));
        assert_eq!(
            validate_quote(&quote),
            Err(ValidationError::DuplicateTopic("t1".to_string()))
        );

        let mut quote = valid_quote();
        quote.author.name = String::new();
        assert_eq!(validate_quote(&quote), Err(ValidationError::InvalidAuthor));
    }

    #[test]
    fn test_text_length_limit() {
        let long = "a".repeat(MAX_TEXT_LEN + 1);
        let mut quote = valid_quote();
        quote.id = quote_id("md", "ro", "a1", &long);
        quote.text = long;
        assert_eq!(
            validate_quote(&quote),
            Err(ValidationError::TextTooLong { max: MAX_TEXT_LEN })
        );
    }

    #[test]
    fn test_tampered_id_is_rejected() {
        let mut quote = valid_quote();
        quote.id = "mdroforged".to_string();
        assert!(matches!(
            validate_quote(&quote),
            Err(ValidationError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_update_requires_set_or_delete() {
        let err = validate_update(&QuoteUpdate::new("q1")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyUpdate);
        assert!(err.to_string().contains("at least one of [set, delete]"));
    }

    #[test]
    fn test_update_rejects_immutable_fields() {
        for field in [
            QuoteField::Country,
            QuoteField::Lang,
            QuoteField::Text,
            QuoteField::Author,
            QuoteField::Source,
        ] {
            let update = QuoteUpdate::new("q1").set_field(field, "x");
            let err = validate_update(&update).unwrap_err();
            assert_eq!(err.to_string(), format!("\"{}\" is not allowed", field));
        }
    }

    #[test]
    fn test_update_rejects_non_removable_fields() {
        let update = QuoteUpdate::new("q1").remove(QuoteField::LastFoundAt);
        assert_eq!(
            validate_update(&update),
            Err(ValidationError::FieldNotAllowed("lastFoundAt".to_string()))
        );
    }

    #[test]
    fn test_update_types_values() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let update = QuoteUpdate::new("q1")
            .set_last_found_at(at)
            .set_count_views(12)
            .set_expires_at(99);

        let changes = validate_update(&update).unwrap();
        assert_eq!(changes.last_found_at, Some(at));
        assert_eq!(changes.count_views, Some(12));
        assert_eq!(changes.expires_at, Some(99));
        assert!(changes.remove.is_empty());
    }

    #[test]
    fn test_update_rejects_wrong_value_types() {
        let update = QuoteUpdate::new("q1").set_field(QuoteField::CountViews, -1);
        assert!(matches!(
            validate_update(&update),
            Err(ValidationError::InvalidFieldValue { .. })
        ));

        let update = QuoteUpdate::new("q1").set_field(QuoteField::LastFoundAt, "soon");
        assert!(matches!(
            validate_update(&update),
            Err(ValidationError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_update_rejects_set_and_delete_of_same_field() {
        let update = QuoteUpdate::new("q1")
            .set_count_views(1)
            .remove(QuoteField::CountViews);
        assert_eq!(
            validate_update(&update),
            Err(ValidationError::ConflictingField("countViews".to_string()))
        );
    }

    #[test]
    fn test_empty_set_is_accepted() {
        let update = QuoteUpdate {
            id: "q1".to_string(),
            set: Some(Default::default()),
            delete: None,
        };
        assert!(validate_update(&update).unwrap().is_empty());
    }
}
