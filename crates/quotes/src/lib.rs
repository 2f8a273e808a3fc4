//! Quote data-access layer.
//!
//! [`QuoteRepository`] keeps canonical quote records and their per-topic
//! fan-out in step, on top of any pair of stores implementing the
//! `quotes_core::storage` traits.

#[cfg(feature = "dynamodb")]
pub mod cli;
pub mod config;
pub mod output;
pub mod repository;
pub mod storage;

#[cfg(test)]
mod fixtures;

pub use config::{Config, ConfigError};
pub use repository::QuoteRepository;
