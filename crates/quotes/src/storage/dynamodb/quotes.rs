use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{KeysAndAttributes, ReturnValue};
use aws_sdk_dynamodb::Client;

use quotes_core::quote::{PartialQuote, Quote, QuoteChanges, QuoteField};
use quotes_core::storage::{
    IndexCursor, IndexQuery, Page, QuoteIndex, QuoteStore, RepositoryError, Result,
};

use super::conversions::{item_to_partial_quote, item_to_quote, quote_to_item, s, Item};
use super::error::{
    map_batch_get_item_error, map_delete_item_error, map_get_item_error, map_provisioning_error,
    map_put_item_error, map_update_item_error,
};
use super::expressions::{self, Expression};
use super::{index, keys, provision};

/// BatchGetItem accepts at most this many keys per request.
const BATCH_GET_LIMIT: usize = 100;
const BATCH_GET_RETRIES: u32 = 5;
const BATCH_GET_BACKOFF: Duration = Duration::from_millis(50);

/// Quote records in the shared table.
#[derive(Debug, Clone)]
pub struct DynamoDbQuoteStore {
    client: Client,
    table_name: String,
}

impl DynamoDbQuoteStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, id: &str, projection: Option<&Expression>) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(id)))
            .set_projection_expression(projection.map(|p| p.expression.clone()))
            .set_expression_attribute_names(projection.and_then(Expression::names))
            .send()
            .await
            .map_err(map_get_item_error)?;

        Ok(result.item)
    }

    /// Fetches the items for `ids` in chunks, retrying unprocessed keys.
    async fn batch_get(&self, ids: &[String], projection: Option<&Expression>) -> Result<Vec<Item>> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = ids.iter().filter(|id| seen.insert(*id)).collect();

        let mut items = Vec::with_capacity(unique.len());
        for chunk in unique.chunks(BATCH_GET_LIMIT) {
            let mut request = KeysAndAttributes::builder()
                .set_keys(Some(chunk.iter().map(|id| primary_key(id)).collect()))
                .set_projection_expression(projection.map(|p| p.expression.clone()))
                .set_expression_attribute_names(projection.and_then(Expression::names))
                .build()
                .map_err(|e| map_provisioning_error("KeysAndAttributes", e))?;

            let mut attempt = 0;
            loop {
                let response = self
                    .client
                    .batch_get_item()
                    .request_items(&self.table_name, request)
                    .send()
                    .await
                    .map_err(map_batch_get_item_error)?;

                if let Some(mut responses) = response.responses {
                    items.extend(responses.remove(&self.table_name).unwrap_or_default());
                }

                let unprocessed = response
                    .unprocessed_keys
                    .and_then(|mut keys| keys.remove(&self.table_name))
                    .filter(|keys| !keys.keys().is_empty());

                match unprocessed {
                    None => break,
                    Some(_) if attempt >= BATCH_GET_RETRIES => {
                        return Err(RepositoryError::Unavailable(
                            "BatchGetItem left keys unprocessed after retries".to_string(),
                        ));
                    }
                    Some(remaining) => {
                        attempt += 1;
                        tracing::debug!(
                            attempt,
                            remaining = remaining.keys().len(),
                            "Retrying unprocessed keys"
                        );
                        tokio::time::sleep(BATCH_GET_BACKOFF * 2u32.pow(attempt)).await;
                        request = remaining;
                    }
                }
            }
        }

        Ok(items)
    }
}

fn primary_key(id: &str) -> HashMap<String, aws_sdk_dynamodb::types::AttributeValue> {
    HashMap::from([
        (keys::PK.to_string(), s(keys::quote_pk(id))),
        (keys::SK.to_string(), s(keys::quote_sk(id))),
    ])
}

#[async_trait]
impl QuoteStore for DynamoDbQuoteStore {
    async fn create(&self, quote: &Quote) -> Result<()> {
        let item = quote_to_item(quote)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &quote.id))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Quote>> {
        match self.get_item(id, None).await? {
            Some(item) => Ok(Some(item_to_quote(&item)?)),
            None => Ok(None),
        }
    }

    async fn get_projected(&self, id: &str, fields: &[QuoteField]) -> Result<Option<PartialQuote>> {
        let projection = expressions::projection(fields);
        match self.get_item(id, Some(&projection)).await? {
            Some(item) => Ok(Some(item_to_partial_quote(&item)?)),
            None => Ok(None),
        }
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Quote>> {
        self.batch_get(ids, None)
            .await?
            .iter()
            .map(item_to_quote)
            .collect()
    }

    async fn get_many_projected(
        &self,
        ids: &[String],
        fields: &[QuoteField],
    ) -> Result<Vec<PartialQuote>> {
        let projection = expressions::projection(fields);
        self.batch_get(ids, Some(&projection))
            .await?
            .iter()
            .map(item_to_partial_quote)
            .collect()
    }

    async fn update(&self, id: &str, changes: &QuoteChanges) -> Result<Quote> {
        let Some(expression) = expressions::update(changes) else {
            return self
                .get(id)
                .await?
                .ok_or_else(|| RepositoryError::quote_not_found(id));
        };

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(id)))
            .update_expression(&expression.expression)
            .condition_expression("attribute_exists(PK)")
            .set_expression_attribute_names(expression.names())
            .set_expression_attribute_values(expression.values())
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_update_item_error(e, id))?;

        let attributes = result.attributes.ok_or_else(|| {
            RepositoryError::InvalidData(format!("UpdateItem returned no attributes for {}", id))
        })?;
        item_to_quote(&attributes)
    }

    async fn delete(&self, id: &str) -> Result<Option<Quote>> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(primary_key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        match result.attributes {
            Some(item) if !item.is_empty() => Ok(Some(item_to_quote(&item)?)),
            _ => Ok(None),
        }
    }

    async fn query(&self, index: &QuoteIndex, query: &IndexQuery) -> Result<Page<Quote>> {
        let partition = keys::quote_index_partition(index);
        let scan = index::scan(&self.client, &self.table_name, &partition, query, None).await?;

        let quotes = scan
            .items
            .iter()
            .map(item_to_quote)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = if scan.exhausted {
            None
        } else {
            quotes.last().map(IndexCursor::from)
        };

        Ok(Page::new(quotes, next_cursor))
    }

    async fn count(&self, index: &QuoteIndex) -> Result<usize> {
        let partition = keys::quote_index_partition(index);
        index::count(&self.client, &self.table_name, &partition, None).await
    }

    async fn create_storage(&self) -> Result<()> {
        provision::deploy(&self.client, &self.table_name).await
    }

    async fn delete_storage(&self) -> Result<()> {
        provision::destroy(&self.client, &self.table_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key() {
        let key = primary_key("mdro1");

        assert_eq!(key.len(), 2);
        assert_eq!(key["PK"], s("QUOTE#mdro1"));
        assert_eq!(key["SK"], s("QUOTE#mdro1"));
    }
}
