use async_trait::async_trait;
use aws_sdk_dynamodb::Client;

use quotes_core::quote::{TopicQuote, TopicRelation};
use quotes_core::storage::{IndexCursor, IndexQuery, Page, Result, TopicQuoteStore};

use super::conversions::{item_to_topic_quote, topic_quote_to_item};
use super::error::map_put_item_error;
use super::{expressions, index, keys, provision};

/// Topic fan-out records, stored next to the quotes in the same table.
#[derive(Debug, Clone)]
pub struct DynamoDbTopicQuoteStore {
    client: Client,
    table_name: String,
}

impl DynamoDbTopicQuoteStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl TopicQuoteStore for DynamoDbTopicQuoteStore {
    async fn put(&self, item: &TopicQuote) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(topic_quote_to_item(item)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, format!("{}/{}", item.topic_id, item.quote_id)))?;

        Ok(())
    }

    async fn query(
        &self,
        topic_id: &str,
        relation: Option<TopicRelation>,
        query: &IndexQuery,
    ) -> Result<Page<TopicQuote>> {
        let partition = keys::topic_index_partition(topic_id);
        let filter = relation.map(expressions::relation_filter);
        let scan = index::scan(
            &self.client,
            &self.table_name,
            &partition,
            query,
            filter.as_ref(),
        )
        .await?;

        let items = scan
            .items
            .iter()
            .map(item_to_topic_quote)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = if scan.exhausted {
            None
        } else {
            items.last().map(IndexCursor::from)
        };

        Ok(Page::new(items, next_cursor))
    }

    async fn count(&self, topic_id: &str, relation: Option<TopicRelation>) -> Result<usize> {
        let partition = keys::topic_index_partition(topic_id);
        let filter = relation.map(expressions::relation_filter);
        index::count(&self.client, &self.table_name, &partition, filter.as_ref()).await
    }

    fn shares_quote_storage(&self) -> bool {
        true
    }

    async fn create_storage(&self) -> Result<()> {
        provision::deploy(&self.client, &self.table_name).await
    }

    async fn delete_storage(&self) -> Result<()> {
        provision::destroy(&self.client, &self.table_name).await
    }
}
