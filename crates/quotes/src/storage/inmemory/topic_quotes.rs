use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quotes_core::quote::{TopicQuote, TopicRelation};
use quotes_core::storage::{IndexCursor, IndexQuery, Page, Result, TopicQuoteStore};

use super::paginate;

/// In-memory fan-out records keyed by `(topic_id, quote_id)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTopicQuoteStore {
    items: Arc<RwLock<HashMap<(String, String), TopicQuote>>>,
}

impl InMemoryTopicQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all topics.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Looks up a single record.
    pub async fn get(&self, topic_id: &str, quote_id: &str) -> Option<TopicQuote> {
        let items = self.items.read().await;
        items
            .get(&(topic_id.to_string(), quote_id.to_string()))
            .cloned()
    }
}

fn matches(item: &TopicQuote, topic_id: &str, relation: Option<TopicRelation>) -> bool {
    item.topic_id == topic_id && relation.is_none_or(|relation| item.relation == relation)
}

#[async_trait]
impl TopicQuoteStore for InMemoryTopicQuoteStore {
    async fn put(&self, item: &TopicQuote) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(
            (item.topic_id.clone(), item.quote_id.clone()),
            item.clone(),
        );
        Ok(())
    }

    async fn query(
        &self,
        topic_id: &str,
        relation: Option<TopicRelation>,
        query: &IndexQuery,
    ) -> Result<Page<TopicQuote>> {
        let items = self.items.read().await;
        let matching: Vec<TopicQuote> = items
            .values()
            .filter(|item| matches(item, topic_id, relation))
            .cloned()
            .collect();

        Ok(paginate(matching, query, |item| IndexCursor::from(item)))
    }

    async fn count(&self, topic_id: &str, relation: Option<TopicRelation>) -> Result<usize> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| matches(item, topic_id, relation))
            .count())
    }

    async fn create_storage(&self) -> Result<()> {
        Ok(())
    }

    async fn delete_storage(&self) -> Result<()> {
        self.items.write().await.clear();
        Ok(())
    }
}
