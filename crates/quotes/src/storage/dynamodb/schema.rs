//! Table schema description (pure data).

use quotes_core::quote::QuoteField;

use super::keys;

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub gsis: Vec<GsiConfig>,
    pub billing_mode: BillingMode,
    /// Epoch-seconds attribute the engine expires items by.
    pub ttl_attribute: Option<String>,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute_type: AttributeType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

/// Global Secondary Index configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub projection: ProjectionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionType {
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl TableConfig {
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Every attribute name used as a key by the table or one of its indexes, deduplicated.
    pub fn key_attributes(&self) -> Vec<&KeyAttribute> {
        let mut attributes: Vec<&KeyAttribute> = Vec::new();
        let candidates = std::iter::once(&self.partition_key)
            .chain(self.sort_key.as_ref())
            .chain(
                self.gsis
                    .iter()
                    .flat_map(|gsi| std::iter::once(&gsi.partition_key).chain(gsi.sort_key.as_ref())),
            );
        for attribute in candidates {
            if !attributes.iter().any(|a| a.name == attribute.name) {
                attributes.push(attribute);
            }
        }
        attributes
    }
}

fn recency_gsi(name: &str, pk: &str, sk: &str) -> GsiConfig {
    GsiConfig {
        name: name.to_string(),
        partition_key: KeyAttribute::string(pk),
        sort_key: Some(KeyAttribute::string(sk)),
        projection: ProjectionType::All,
    }
}

/// The quotes table: quotes and their topic fan-out share it.
///
/// `GSI1` serves the by-locale and by-topic recency indexes, `GSI2` the by-author one.
pub fn quotes_table_config(table_name: &str) -> TableConfig {
    TableConfig {
        table_name: table_name.to_string(),
        partition_key: KeyAttribute::string(keys::PK),
        sort_key: Some(KeyAttribute::string(keys::SK)),
        gsis: vec![
            recency_gsi(keys::GSI1, keys::GSI1_PK, keys::GSI1_SK),
            recency_gsi(keys::GSI2, keys::GSI2_PK, keys::GSI2_SK),
        ],
        billing_mode: BillingMode::PayPerRequest,
        ttl_attribute: Some(QuoteField::ExpiresAt.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_table_config() {
        let config = quotes_table_config("quotes");

        assert_eq!(config.table_name, "quotes");
        assert_eq!(config.partition_key.name, "PK");
        assert_eq!(config.gsis.len(), 2);
        assert_eq!(config.gsis[1].name, "GSI2");
        assert_eq!(config.ttl_attribute.as_deref(), Some("expiresAt"));
    }

    #[test]
    fn test_key_attributes_are_unique() {
        let config = quotes_table_config("quotes");
        let names: Vec<&str> = config
            .key_attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        assert_eq!(
            names,
            vec!["PK", "SK", "GSI1PK", "GSI1SK", "GSI2PK", "GSI2SK"]
        );
    }

    #[test]
    fn test_with_table_name() {
        let config = quotes_table_config("quotes").with_table_name("quotes-test");
        assert_eq!(config.table_name, "quotes-test");
    }
}
