use thiserror::Error;

use crate::quote::ValidationError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn quote_not_found(id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity_type: "Quote",
            id: id.into(),
        }
    }

    pub fn quote_exists(id: impl Into<String>) -> Self {
        RepositoryError::AlreadyExists {
            entity_type: "Quote",
            id: id.into(),
        }
    }

    /// True for failures a caller may retry once the engine recovers.
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            RepositoryError::quote_not_found("mdro123").to_string(),
            "Quote not found: mdro123"
        );
    }

    #[test]
    fn test_already_exists_display() {
        assert_eq!(
            RepositoryError::quote_exists("mdro123").to_string(),
            "Quote already exists: mdro123"
        );
    }

    #[test]
    fn test_validation_wraps_field_error() {
        let error: RepositoryError =
            ValidationError::FieldNotAllowed("country".to_string()).into();
        assert_eq!(
            error.to_string(),
            "Validation failed: \"country\" is not allowed"
        );
    }

    #[test]
    fn test_unavailable_is_transient() {
        let error = RepositoryError::Unavailable("throughput exceeded".to_string());
        assert_eq!(error.to_string(), "Storage unavailable: throughput exceeded");
        assert!(error.is_transient());
        assert!(!RepositoryError::QueryFailed("bad".to_string()).is_transient());
    }

    #[test]
    fn test_serde_json_error_converts() {
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::Serialization(_)
        ));
    }
}
