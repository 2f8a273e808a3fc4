use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quotes_core::quote::{apply_update, PartialQuote, Quote, QuoteChanges, QuoteField};
use quotes_core::storage::{
    IndexCursor, IndexQuery, Page, QuoteIndex, QuoteStore, RepositoryError, Result,
};

use super::paginate;

/// In-memory quote records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteStore {
    quotes: Arc<RwLock<HashMap<String, Quote>>>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored quotes.
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }
}

fn in_index(quote: &Quote, index: &QuoteIndex) -> bool {
    match index {
        QuoteIndex::Locale { .. } => quote.locale_key() == index.partition(),
        QuoteIndex::Author { author_id } => &quote.author.id == author_id,
    }
}

fn unique<'a>(ids: &'a [String]) -> impl Iterator<Item = &'a String> {
    let mut seen = HashSet::new();
    ids.iter().filter(move |id| seen.insert(*id))
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn create(&self, quote: &Quote) -> Result<()> {
        let mut quotes = self.quotes.write().await;
        if quotes.contains_key(&quote.id) {
            return Err(RepositoryError::quote_exists(&quote.id));
        }
        quotes.insert(quote.id.clone(), quote.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Quote>> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(id).cloned())
    }

    async fn get_projected(&self, id: &str, fields: &[QuoteField]) -> Result<Option<PartialQuote>> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(id).map(|quote| quote.project(fields)))
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Quote>> {
        let quotes = self.quotes.read().await;
        Ok(unique(ids)
            .filter_map(|id| quotes.get(id).cloned())
            .collect())
    }

    async fn get_many_projected(
        &self,
        ids: &[String],
        fields: &[QuoteField],
    ) -> Result<Vec<PartialQuote>> {
        let quotes = self.quotes.read().await;
        Ok(unique(ids)
            .filter_map(|id| quotes.get(id).map(|quote| quote.project(fields)))
            .collect())
    }

    async fn update(&self, id: &str, changes: &QuoteChanges) -> Result<Quote> {
        let mut quotes = self.quotes.write().await;
        let current = quotes
            .get(id)
            .ok_or_else(|| RepositoryError::quote_not_found(id))?;

        let updated = apply_update(current, changes);
        quotes.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<Option<Quote>> {
        let mut quotes = self.quotes.write().await;
        Ok(quotes.remove(id))
    }

    async fn query(&self, index: &QuoteIndex, query: &IndexQuery) -> Result<Page<Quote>> {
        let quotes = self.quotes.read().await;
        let matching: Vec<Quote> = quotes
            .values()
            .filter(|quote| in_index(quote, index))
            .cloned()
            .collect();

        Ok(paginate(matching, query, |quote| IndexCursor::from(quote)))
    }

    async fn count(&self, index: &QuoteIndex) -> Result<usize> {
        let quotes = self.quotes.read().await;
        Ok(quotes.values().filter(|quote| in_index(quote, index)).count())
    }

    async fn create_storage(&self) -> Result<()> {
        Ok(())
    }

    async fn delete_storage(&self) -> Result<()> {
        self.quotes.write().await.clear();
        Ok(())
    }
}
