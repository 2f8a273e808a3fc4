use thiserror::Error;

/// Errors raised when a quote or an update payload is rejected before reaching storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quote text cannot be empty")]
    EmptyText,
    #[error("Quote text too long (max {max} characters)")]
    TextTooLong { max: usize },
    #[error("Invalid country code: {0}")]
    InvalidCountry(String),
    #[error("Invalid language code: {0}")]
    InvalidLang(String),
    #[error("Quote author requires an id and a name")]
    InvalidAuthor,
    #[error("Quote source requires a host and an id")]
    InvalidSource,
    #[error("Topic requires an id and a name: {0}")]
    InvalidTopic(String),
    #[error("Duplicate topic: {0}")]
    DuplicateTopic(String),
    #[error("Quote id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },
    #[error("Update requires a quote id")]
    MissingId,
    #[error("Update must contain at least one of [set, delete]")]
    EmptyUpdate,
    #[error("\"{0}\" is not allowed")]
    FieldNotAllowed(String),
    #[error("\"{0}\" cannot be both set and deleted")]
    ConflictingField(String),
    #[error("Invalid value for \"{field}\": {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("Unknown quote field: {0}")]
    UnknownField(String),
    #[error("Unknown topic type: {0}")]
    UnknownTopicType(String),
    #[error("Unknown topic relation: {0}")]
    UnknownRelation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_allowed_names_the_field() {
        assert_eq!(
            ValidationError::FieldNotAllowed("country".to_string()).to_string(),
            "\"country\" is not allowed"
        );
    }

    #[test]
    fn test_empty_update_display() {
        assert_eq!(
            ValidationError::EmptyUpdate.to_string(),
            "Update must contain at least one of [set, delete]"
        );
    }

    #[test]
    fn test_id_mismatch_display() {
        let error = ValidationError::IdMismatch {
            expected: "mdroabc".to_string(),
            actual: "mdroxyz".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Quote id mismatch: expected mdroabc, got mdroxyz"
        );
    }
}
