//! DynamoDB storage backend.
//!
//! Quotes and their topic fan-out share one table (see [`schema`] for the key
//! layout). Both stores take the same client and table name.

mod client;
mod conversions;
mod error;
mod expressions;
mod index;
mod keys;
mod quotes;
mod topic_quotes;

pub mod provision;
pub mod schema;

pub use client::create_client;
pub use quotes::DynamoDbQuoteStore;
pub use topic_quotes::DynamoDbTopicQuoteStore;

use aws_sdk_dynamodb::Client;

use crate::repository::QuoteRepository;

/// Builds a repository whose stores share `client` and the quotes table.
pub fn repository(
    client: Client,
    table_name: &str,
) -> QuoteRepository<DynamoDbQuoteStore, DynamoDbTopicQuoteStore> {
    QuoteRepository::new(
        DynamoDbQuoteStore::new(client.clone(), table_name),
        DynamoDbTopicQuoteStore::new(client, table_name),
    )
}
