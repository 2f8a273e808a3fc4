//! Paged reads over the recency indexes.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client;
use quotes_core::storage::{IndexQuery, Result, SortOrder};

use super::conversions::Item;
use super::error::map_query_error;
use super::expressions::{self, Expression};
use super::keys::IndexPartition;

/// Raw items read from one index partition.
#[derive(Debug, Default)]
pub struct IndexScan {
    pub items: Vec<Item>,
    /// The partition was read to its end.
    pub exhausted: bool,
}

fn page_limit(remaining: usize) -> i32 {
    i32::try_from(remaining).unwrap_or(i32::MAX)
}

/// Reads up to `query.limit` items past the cursor.
///
/// The cursor becomes the `ExclusiveStartKey`, so items sharing its
/// `lastFoundAt` are not skipped. The engine applies `Limit` before the
/// filter, so a filtered read keeps paging until the limit is met or the
/// partition runs out.
pub async fn scan(
    client: &Client,
    table_name: &str,
    partition: &IndexPartition,
    query: &IndexQuery,
    filter: Option<&Expression>,
) -> Result<IndexScan> {
    if query.limit == 0 {
        return Ok(IndexScan::default());
    }

    let key = expressions::key_condition(partition);
    let bindings = match filter {
        Some(filter) => expressions::merge_bindings(&key, filter),
        None => key.clone(),
    };

    let mut items: Vec<Item> = Vec::new();
    let mut start_key: Option<HashMap<String, AttributeValue>> = query
        .cursor
        .as_ref()
        .map(|cursor| expressions::exclusive_start_key(partition, cursor));

    loop {
        let response = client
            .query()
            .table_name(table_name)
            .index_name(partition.index_name)
            .key_condition_expression(&key.expression)
            .set_filter_expression(filter.map(|f| f.expression.clone()))
            .set_expression_attribute_names(bindings.names())
            .set_expression_attribute_values(bindings.values())
            .scan_index_forward(query.order == SortOrder::Ascending)
            .limit(page_limit(query.limit - items.len()))
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
            .map_err(map_query_error)?;

        items.extend(response.items.unwrap_or_default());

        match response.last_evaluated_key {
            Some(last_key) if items.len() < query.limit => start_key = Some(last_key),
            last_key => {
                items.truncate(query.limit);
                tracing::trace!(
                    index = partition.index_name,
                    partition = %partition.pk_value,
                    items = items.len(),
                    "Index scan finished"
                );
                return Ok(IndexScan {
                    items,
                    exhausted: last_key.is_none(),
                });
            }
        }
    }
}

/// Counts the items of an index partition, following pagination to the end.
pub async fn count(
    client: &Client,
    table_name: &str,
    partition: &IndexPartition,
    filter: Option<&Expression>,
) -> Result<usize> {
    let key = expressions::key_condition(partition);
    let bindings = match filter {
        Some(filter) => expressions::merge_bindings(&key, filter),
        None => key.clone(),
    };

    let mut total = 0usize;
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;

    loop {
        let response = client
            .query()
            .table_name(table_name)
            .index_name(partition.index_name)
            .key_condition_expression(&key.expression)
            .set_filter_expression(filter.map(|f| f.expression.clone()))
            .set_expression_attribute_names(bindings.names())
            .set_expression_attribute_values(bindings.values())
            .select(Select::Count)
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
            .map_err(map_query_error)?;

        total += usize::try_from(response.count()).unwrap_or_default();

        match response.last_evaluated_key {
            Some(last_key) => start_key = Some(last_key),
            None => return Ok(total),
        }
    }
}
