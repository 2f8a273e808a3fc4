//! Builders for DynamoDB expressions.
//!
//! Every attribute is referenced through a `#name` placeholder since several
//! quote attributes (`text`, `source`) are reserved words.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use quotes_core::quote::{QuoteChanges, QuoteField, TopicRelation};
use quotes_core::serde::format_timestamp;
use quotes_core::storage::IndexCursor;

use super::conversions::{n, s, Item, RELATION};
use super::keys::{self, IndexPartition};

/// An expression string together with its placeholder bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl Expression {
    pub fn names(&self) -> Option<HashMap<String, String>> {
        (!self.names.is_empty()).then(|| self.names.clone())
    }

    pub fn values(&self) -> Option<HashMap<String, AttributeValue>> {
        (!self.values.is_empty()).then(|| self.values.clone())
    }
}

/// Projection over the requested fields. The id is always included.
pub fn projection(fields: &[QuoteField]) -> Expression {
    let mut selected = vec![QuoteField::Id];
    for field in fields {
        if !selected.contains(field) {
            selected.push(*field);
        }
    }

    let mut names = HashMap::new();
    let placeholders: Vec<String> = selected
        .iter()
        .map(|field| {
            let placeholder = format!("#{}", field.as_str());
            names.insert(placeholder.clone(), field.as_str().to_string());
            placeholder
        })
        .collect();

    Expression {
        expression: placeholders.join(", "),
        names,
        values: HashMap::new(),
    }
}

/// `SET ... REMOVE ...` for a validated change set.
///
/// Setting `lastFoundAt` also moves the quote within both recency indexes.
/// Returns `None` when there is nothing to change.
pub fn update(changes: &QuoteChanges) -> Option<Expression> {
    if changes.is_empty() {
        return None;
    }

    let mut names = HashMap::new();
    let mut values = HashMap::new();
    let mut set = Vec::new();

    let mut assign = |name: &str, value_key: &str, value: AttributeValue| {
        names.insert(format!("#{name}"), name.to_string());
        values.insert(format!(":{value_key}"), value);
        set.push(format!("#{name} = :{value_key}"));
    };

    if let Some(count_views) = changes.count_views {
        assign(QuoteField::CountViews.as_str(), "countViews", n(count_views));
    }
    if let Some(last_found_at) = &changes.last_found_at {
        let recency = s(format_timestamp(last_found_at));
        assign(QuoteField::LastFoundAt.as_str(), "lastFoundAt", recency.clone());
        assign(keys::GSI1_SK, "lastFoundAt", recency.clone());
        assign(keys::GSI2_SK, "lastFoundAt", recency);
    }
    if let Some(expires_at) = changes.expires_at {
        assign(QuoteField::ExpiresAt.as_str(), "expiresAt", n(expires_at));
    }

    let remove: Vec<String> = changes
        .remove
        .iter()
        .map(|field| {
            let placeholder = format!("#{}", field.as_str());
            names.insert(placeholder.clone(), field.as_str().to_string());
            placeholder
        })
        .collect();

    let mut clauses = Vec::new();
    if !set.is_empty() {
        clauses.push(format!("SET {}", set.join(", ")));
    }
    if !remove.is_empty() {
        clauses.push(format!("REMOVE {}", remove.join(", ")));
    }

    Some(Expression {
        expression: clauses.join(" "),
        names,
        values,
    })
}

/// Key condition selecting an index partition.
pub fn key_condition(partition: &IndexPartition) -> Expression {
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    names.insert("#pk".to_string(), partition.pk_attribute.to_string());
    values.insert(":pk".to_string(), s(&partition.pk_value));

    Expression {
        expression: "#pk = :pk".to_string(),
        names,
        values,
    }
}

/// `ExclusiveStartKey` resuming an index read right after the cursor's entry.
///
/// An index position is the index key plus the table key of the item.
pub fn exclusive_start_key(partition: &IndexPartition, cursor: &IndexCursor) -> Item {
    let (pk, sk) = partition.item_key(&cursor.id);

    let mut key = HashMap::new();
    key.insert(keys::PK.to_string(), s(pk));
    key.insert(keys::SK.to_string(), s(sk));
    key.insert(partition.pk_attribute.to_string(), s(&partition.pk_value));
    key.insert(
        partition.sk_attribute.to_string(),
        s(keys::recency_sk(&cursor.last_found_at)),
    );
    key
}

/// Filter on the denormalized relation. Records written without one count as primary.
pub fn relation_filter(relation: TopicRelation) -> Expression {
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    names.insert("#relation".to_string(), RELATION.to_string());
    values.insert(":relation".to_string(), s(relation.as_str()));

    let expression = match relation {
        TopicRelation::Primary => {
            "(attribute_not_exists(#relation) OR #relation = :relation)".to_string()
        }
        TopicRelation::Mention => "#relation = :relation".to_string(),
    };

    Expression {
        expression,
        names,
        values,
    }
}

/// Merges two expressions' bindings. The expression strings are left to the caller.
pub fn merge_bindings(a: &Expression, b: &Expression) -> Expression {
    let mut merged = a.clone();
    merged.names.extend(b.names.clone());
    merged.values.extend(b.values.clone());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quotes_core::storage::QuoteIndex;

    #[test]
    fn test_projection_always_includes_id() {
        let expr = projection(&[QuoteField::Text, QuoteField::Author, QuoteField::Text]);

        assert_eq!(expr.expression, "#id, #text, #author");
        assert_eq!(expr.names["#text"], "text");
        assert_eq!(expr.names.len(), 3);
        assert!(expr.values().is_none());
    }

    #[test]
    fn test_update_sets_recency_keys_with_last_found_at() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let changes = QuoteChanges {
            last_found_at: Some(at),
            ..Default::default()
        };
        let expr = update(&changes).unwrap();

        assert_eq!(
            expr.expression,
            "SET #lastFoundAt = :lastFoundAt, #GSI1SK = :lastFoundAt, #GSI2SK = :lastFoundAt"
        );
        assert_eq!(expr.names["#GSI1SK"], "GSI1SK");
        assert_eq!(expr.values[":lastFoundAt"], s("2024-06-15T10:00:00.000Z"));
        assert_eq!(expr.values.len(), 1);
    }

    #[test]
    fn test_update_with_set_and_remove() {
        let changes = QuoteChanges {
            expires_at: Some(10),
            remove: vec![QuoteField::CountViews],
            ..Default::default()
        };
        let expr = update(&changes).unwrap();

        assert_eq!(expr.expression, "SET #expiresAt = :expiresAt REMOVE #countViews");
        assert_eq!(expr.values[":expiresAt"], n(10));
    }

    #[test]
    fn test_update_remove_only() {
        let changes = QuoteChanges {
            remove: vec![QuoteField::CountViews],
            ..Default::default()
        };
        let expr = update(&changes).unwrap();

        assert_eq!(expr.expression, "REMOVE #countViews");
        assert!(expr.values().is_none());
    }

    #[test]
    fn test_empty_update_has_no_expression() {
        assert!(update(&QuoteChanges::default()).is_none());
    }

    #[test]
    fn test_key_condition_selects_partition() {
        let partition = keys::topic_index_partition("t1");
        let condition = key_condition(&partition);

        assert_eq!(condition.expression, "#pk = :pk");
        assert_eq!(condition.names["#pk"], "GSI1PK");
        assert_eq!(condition.values[":pk"], s("TOPIC#t1"));
    }

    #[test]
    fn test_exclusive_start_key_for_topic_index() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let key = exclusive_start_key(
            &keys::topic_index_partition("t1"),
            &IndexCursor::new(at, "mdro1"),
        );

        assert_eq!(key.len(), 4);
        assert_eq!(key["PK"], s("TOPIC#t1"));
        assert_eq!(key["SK"], s("QUOTE#mdro1"));
        assert_eq!(key["GSI1PK"], s("TOPIC#t1"));
        assert_eq!(key["GSI1SK"], s("2024-06-15T10:00:00.000Z"));
    }

    #[test]
    fn test_exclusive_start_key_for_author_index() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let key = exclusive_start_key(
            &keys::quote_index_partition(&QuoteIndex::author("a1")),
            &IndexCursor::new(at, "mdro1"),
        );

        assert_eq!(key["PK"], s("QUOTE#mdro1"));
        assert_eq!(key["SK"], s("QUOTE#mdro1"));
        assert_eq!(key["GSI2PK"], s("AUTHOR#a1"));
        assert_eq!(key["GSI2SK"], s("2024-06-15T10:00:00.000Z"));
    }

    #[test]
    fn test_relation_filter() {
        let mention = relation_filter(TopicRelation::Mention);
        assert_eq!(mention.expression, "#relation = :relation");
        assert_eq!(mention.values[":relation"], s("MENTION"));

        let primary = relation_filter(TopicRelation::Primary);
        assert!(primary.expression.contains("attribute_not_exists(#relation)"));
    }

    #[test]
    fn test_merge_bindings() {
        let partition = keys::topic_index_partition("t1");
        let merged = merge_bindings(
            &key_condition(&partition),
            &relation_filter(TopicRelation::Mention),
        );

        assert!(merged.names.contains_key("#pk"));
        assert!(merged.names.contains_key("#relation"));
        assert_eq!(merged.values.len(), 2);
    }
}
