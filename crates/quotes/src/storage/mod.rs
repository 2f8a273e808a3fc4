//! Storage engine implementations.
//!
//! Concrete implementations of the store traits defined in
//! `quotes_core::storage`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): HashMap-backed stores for tests and local runs
//! - `dynamodb` (default): AWS DynamoDB stores using `aws-sdk-dynamodb`,
//!   plus table provisioning
//!
//! Both engines may be compiled in together; the repository is generic over them.

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage engine selected. Enable 'inmemory' or 'dynamodb'. \
    Example: cargo build -p quotes --features dynamodb"
);

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::{InMemoryQuoteStore, InMemoryTopicQuoteStore};

#[cfg(feature = "dynamodb")]
pub use dynamodb::{DynamoDbQuoteStore, DynamoDbTopicQuoteStore};
