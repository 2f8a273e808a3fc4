//! Quote repository.
//!
//! Keeps the canonical quote records and their per-topic fan-out in step.
//! Writes go to the quote store first, then one fan-out record per topic is
//! written in topic order. There is no transaction across the two stores: a
//! failed fan-out write leaves the quote in place and is logged as a gap.

use std::collections::HashMap;
use std::sync::Arc;

use quotes_core::quote::{
    needs_fan_out, topic_quotes_for, validate_quote, validate_update, CountByAuthorParams,
    CountByTopicParams, CountParams, LatestByAuthorParams, LatestByTopicParams,
    LatestQuotesParams, PartialQuote, Quote, QuoteField, QuoteUpdate,
};
use quotes_core::storage::{IndexQuery, QuoteIndex, QuoteStore, Result, TopicQuoteStore};

/// Orchestrates a [`QuoteStore`] and a [`TopicQuoteStore`].
///
/// # Type Parameters
///
/// * `Q` - Canonical quote records
/// * `T` - Topic fan-out records
pub struct QuoteRepository<Q, T>
where
    Q: QuoteStore,
    T: TopicQuoteStore,
{
    quotes: Arc<Q>,
    topic_quotes: Arc<T>,
}

impl<Q, T> Clone for QuoteRepository<Q, T>
where
    Q: QuoteStore,
    T: TopicQuoteStore,
{
    fn clone(&self) -> Self {
        Self {
            quotes: Arc::clone(&self.quotes),
            topic_quotes: Arc::clone(&self.topic_quotes),
        }
    }
}

impl<Q, T> QuoteRepository<Q, T>
where
    Q: QuoteStore,
    T: TopicQuoteStore,
{
    pub fn new(quotes: Q, topic_quotes: T) -> Self {
        Self::from_shared(Arc::new(quotes), Arc::new(topic_quotes))
    }

    /// Builds a repository over stores that are also used elsewhere.
    pub fn from_shared(quotes: Arc<Q>, topic_quotes: Arc<T>) -> Self {
        Self {
            quotes,
            topic_quotes,
        }
    }

    pub fn quotes(&self) -> &Q {
        &self.quotes
    }

    pub fn topic_quotes(&self) -> &T {
        &self.topic_quotes
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Stores a new quote and fans it out to its topics.
    ///
    /// Fails with `AlreadyExists` when a quote with the same id is stored.
    pub async fn create(&self, quote: Quote) -> Result<Quote> {
        validate_quote(&quote)?;

        self.quotes.create(&quote).await?;
        tracing::debug!(quote_id = %quote.id, topics = quote.topics.len(), "Created quote");

        self.fan_out(&quote).await;
        Ok(quote)
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// The payload is validated before storage is touched. When `lastFoundAt`
    /// changes, every fan-out record of the quote is rewritten.
    pub async fn update(&self, update: QuoteUpdate) -> Result<Quote> {
        let changes = validate_update(&update)?;

        let updated = self.quotes.update(&update.id, &changes).await?;
        tracing::debug!(
            quote_id = %updated.id,
            fields = ?changes.set_fields(),
            removed = ?changes.remove,
            "Updated quote"
        );

        if needs_fan_out(&changes, &updated) {
            self.fan_out(&updated).await;
        }
        Ok(updated)
    }

    /// Deletes the quote record. Fan-out records are left to expire.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.quotes.delete(id).await?;
        if let Some(quote) = &deleted {
            tracing::debug!(quote_id = %id, topics = quote.topics.len(), "Deleted quote");
        }
        Ok(deleted.is_some())
    }

    /// Writes the fan-out records of `quote`, one after another.
    async fn fan_out(&self, quote: &Quote) {
        for item in topic_quotes_for(quote) {
            if let Err(err) = self.topic_quotes.put(&item).await {
                tracing::warn!(
                    quote_id = %quote.id,
                    topic_id = %item.topic_id,
                    error = %err,
                    "Topic fan-out write failed, index is incomplete"
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.quotes.get_projected(id, &[]).await?.is_some())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Quote>> {
        tracing::trace!(quote_id = %id, "Getting quote");
        self.quotes.get(id).await
    }

    /// Gets several quotes. Missing ids are skipped and order is not preserved.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Quote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        tracing::trace!(count = ids.len(), "Getting quotes");
        self.quotes.get_many(ids).await
    }

    /// Gets the requested fields of a quote, plus its id.
    pub async fn get_by_id_with_fields(
        &self,
        id: &str,
        fields: &[QuoteField],
    ) -> Result<Option<PartialQuote>> {
        self.quotes.get_projected(id, fields).await
    }

    pub async fn get_by_ids_with_fields(
        &self,
        ids: &[String],
        fields: &[QuoteField],
    ) -> Result<Vec<PartialQuote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.quotes.get_many_projected(ids, fields).await
    }

    // ------------------------------------------------------------------------
    // Index queries
    // ------------------------------------------------------------------------

    /// Latest quotes of a locale, newest first.
    pub async fn latest(&self, params: LatestQuotesParams) -> Result<Vec<Quote>> {
        let index = QuoteIndex::locale(&params.country, &params.lang);
        let query = IndexQuery::latest(params.limit).with_cursor(params.cursor);
        tracing::trace!(partition = %index.partition(), limit = params.limit, "Latest quotes");

        Ok(self.quotes.query(&index, &query).await?.into_items())
    }

    /// Latest quotes of an author, newest first.
    ///
    /// The author index spans every locale; `country` and `lang` do not narrow it.
    pub async fn latest_by_author(&self, params: LatestByAuthorParams) -> Result<Vec<Quote>> {
        let index = QuoteIndex::author(&params.author_id);
        let query = IndexQuery::latest(params.limit).with_cursor(params.cursor);
        tracing::trace!(author_id = %params.author_id, limit = params.limit, "Latest quotes by author");

        Ok(self.quotes.query(&index, &query).await?.into_items())
    }

    /// Latest quotes referencing a topic, newest first, optionally for one relation.
    ///
    /// Reads the topic's fan-out records, then fetches the quotes in one batch.
    /// Records whose quote is gone are skipped.
    pub async fn latest_by_topic(&self, params: LatestByTopicParams) -> Result<Vec<Quote>> {
        let query = IndexQuery::latest(params.limit).with_cursor(params.cursor);
        let page = self
            .topic_quotes
            .query(&params.topic_id, params.relation, &query)
            .await?;
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = page.items.iter().map(|item| item.quote_id.clone()).collect();
        let mut found: HashMap<String, Quote> = self
            .quotes
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|quote| (quote.id.clone(), quote))
            .collect();

        let quotes: Vec<Quote> = ids.iter().filter_map(|id| found.remove(id)).collect();
        if quotes.len() < ids.len() {
            tracing::debug!(
                topic_id = %params.topic_id,
                missing = ids.len() - quotes.len(),
                "Fan-out records without a quote"
            );
        }
        Ok(quotes)
    }

    pub async fn count(&self, params: CountParams) -> Result<usize> {
        self.quotes
            .count(&QuoteIndex::locale(&params.country, &params.lang))
            .await
    }

    /// Counts an author's quotes across every locale.
    pub async fn count_by_author(&self, params: CountByAuthorParams) -> Result<usize> {
        self.quotes
            .count(&QuoteIndex::author(&params.author_id))
            .await
    }

    /// Counts a topic's fan-out records, optionally for one relation.
    pub async fn count_by_topic(&self, params: CountByTopicParams) -> Result<usize> {
        self.topic_quotes
            .count(&params.topic_id, params.relation)
            .await
    }

    // ------------------------------------------------------------------------
    // Provisioning
    // ------------------------------------------------------------------------

    /// Provisions both stores. A topic store living in the quote store's
    /// table is provisioned with it.
    pub async fn create_storage(&self) -> Result<()> {
        self.quotes.create_storage().await?;
        if !self.topic_quotes.shares_quote_storage() {
            self.topic_quotes.create_storage().await?;
        }
        tracing::info!("Quote storage ready");
        Ok(())
    }

    pub async fn delete_storage(&self) -> Result<()> {
        self.quotes.delete_storage().await?;
        if !self.topic_quotes.shares_quote_storage() {
            self.topic_quotes.delete_storage().await?;
        }
        tracing::info!("Quote storage deleted");
        Ok(())
    }
}
