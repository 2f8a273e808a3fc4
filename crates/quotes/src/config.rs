use std::env;
use std::str::FromStr;

use quotes_core::quote::{DEFAULT_LIMIT, DEFAULT_TTL_DAYS};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Table holding quotes and their topic fan-out (default: "quotes")
    pub table_name: String,
    /// Custom endpoint such as a local DynamoDB. Unset means AWS itself.
    pub endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Days a quote lives after it was last found (default: 180)
    pub quote_ttl_days: i64,
    /// Page size for list queries (default: 20)
    pub default_limit: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `QUOTES_TABLE_NAME` - Table name (default: "quotes")
    /// - `AWS_ENDPOINT_URL` - Custom endpoint (default: unset)
    /// - `AWS_REGION` - Region (default: "us-east-1")
    /// - `QUOTE_TTL_DAYS` - Quote TTL in days (default: 180)
    /// - `QUOTES_DEFAULT_LIMIT` - List page size (default: 20)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: lookup("QUOTES_TABLE_NAME").unwrap_or_else(|| "quotes".to_string()),
            endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|url| !url.is_empty()),
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            quote_ttl_days: parse_or(&lookup, "QUOTE_TTL_DAYS", DEFAULT_TTL_DAYS)?,
            default_limit: parse_or(&lookup, "QUOTES_DEFAULT_LIMIT", DEFAULT_LIMIT)?,
        })
    }

    /// Get quote TTL as a Duration.
    pub fn quote_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.quote_ttl_days)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: "quotes".to_string(),
            endpoint_url: None,
            region: "us-east-1".to_string(),
            quote_ttl_days: DEFAULT_TTL_DAYS,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.table_name, "quotes");
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.quote_ttl_days, 180);
        assert_eq!(config.default_limit, 20);
    }

    #[test]
    fn test_values_from_environment() {
        let config = Config::from_lookup(lookup(&[
            ("QUOTES_TABLE_NAME", "quotes-test"),
            ("AWS_ENDPOINT_URL", "http://localhost:8000"),
            ("AWS_REGION", "eu-central-1"),
            ("QUOTE_TTL_DAYS", "30"),
            ("QUOTES_DEFAULT_LIMIT", " 50 "),
        ]))
        .unwrap();

        assert_eq!(config.table_name, "quotes-test");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.region, "eu-central-1");
        assert_eq!(config.quote_ttl(), chrono::Duration::days(30));
        assert_eq!(config.default_limit, 50);
    }

    #[test]
    fn test_empty_endpoint_means_aws() {
        let config = Config::from_lookup(lookup(&[("AWS_ENDPOINT_URL", "")])).unwrap();
        assert_eq!(config.endpoint_url, None);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("QUOTE_TTL_DAYS", "forever")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "QUOTE_TTL_DAYS",
                value: "forever".to_string()
            }
        );
    }
}
