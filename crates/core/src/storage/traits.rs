use async_trait::async_trait;

use crate::quote::{PartialQuote, Quote, QuoteChanges, QuoteField, TopicQuote, TopicRelation};

use super::{IndexQuery, Page, QuoteIndex, Result};

/// Canonical quote records keyed by id.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Writes a new quote. Fails with `AlreadyExists` when the id is taken.
    async fn create(&self, quote: &Quote) -> Result<()>;

    /// Gets a quote by its id.
    async fn get(&self, id: &str) -> Result<Option<Quote>>;

    /// Gets only the requested attributes of a quote, plus its id.
    async fn get_projected(&self, id: &str, fields: &[QuoteField]) -> Result<Option<PartialQuote>>;

    /// Gets several quotes. Missing ids are skipped; order is unspecified.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Quote>>;

    /// Batch form of [`QuoteStore::get_projected`].
    async fn get_many_projected(
        &self,
        ids: &[String],
        fields: &[QuoteField],
    ) -> Result<Vec<PartialQuote>>;

    /// Applies validated changes and returns the stored result.
    /// Fails with `NotFound` when the quote does not exist.
    async fn update(&self, id: &str, changes: &QuoteChanges) -> Result<Quote>;

    /// Deletes a quote, returning the removed record.
    async fn delete(&self, id: &str) -> Result<Option<Quote>>;

    /// Reads one page of a recency index.
    async fn query(&self, index: &QuoteIndex, query: &IndexQuery) -> Result<Page<Quote>>;

    /// Counts the quotes in an index partition.
    async fn count(&self, index: &QuoteIndex) -> Result<usize>;

    async fn create_storage(&self) -> Result<()>;

    async fn delete_storage(&self) -> Result<()>;
}

/// Per-topic fan-out records keyed by `(topic_id, quote_id)`.
#[async_trait]
pub trait TopicQuoteStore: Send + Sync {
    /// Upserts a record.
    async fn put(&self, item: &TopicQuote) -> Result<()>;

    /// Upserts records one after another, stopping at the first failure.
    async fn put_many(&self, items: &[TopicQuote]) -> Result<()> {
        for item in items {
            self.put(item).await?;
        }
        Ok(())
    }

    /// Reads one page of a topic's recency index, optionally keeping a single relation.
    async fn query(
        &self,
        topic_id: &str,
        relation: Option<TopicRelation>,
        query: &IndexQuery,
    ) -> Result<Page<TopicQuote>>;

    /// Counts a topic's records, optionally for a single relation.
    async fn count(&self, topic_id: &str, relation: Option<TopicRelation>) -> Result<usize>;

    /// True when the records live in storage the quote store provisions.
    fn shares_quote_storage(&self) -> bool {
        false
    }

    async fn create_storage(&self) -> Result<()>;

    async fn delete_storage(&self) -> Result<()>;
}
