//! Maps repository errors onto HTTP status codes for callers that serve quotes over HTTP.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404
/// - `AlreadyExists` -> 409
/// - `Validation`, `InvalidData` -> 400
/// - `Unavailable` -> 503
/// - `QueryFailed`, `Serialization` -> 500
///
/// ```
/// use quotes_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::quote_exists("mdro42");
/// assert_eq!(repository_error_to_status_code(&error), 409);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::Validation(_) | RepositoryError::InvalidData(_) => 400,
        RepositoryError::Unavailable(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::ValidationError;

    #[test]
    fn test_client_errors() {
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::quote_not_found("q")),
            404
        );
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::quote_exists("q")),
            409
        );
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::Validation(
                ValidationError::EmptyUpdate
            )),
            400
        );
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let error = RepositoryError::Unavailable("table not found".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_engine_failures_map_to_500() {
        let error = RepositoryError::Serialization("bad attribute".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
        let error = RepositoryError::QueryFailed("bad key condition".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }
}
