//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `quotes_core::storage`.
//! Throttling, internal errors, a missing table and transport failures all
//! surface as `Unavailable`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use quotes_core::storage::RepositoryError;

const ENTITY_QUOTE: &str = "Quote";

fn unavailable(reason: &str) -> RepositoryError {
    RepositoryError::Unavailable(reason.to_string())
}

/// Errors that never reached the service (timeouts, dispatch, connection).
fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::TimeoutError(_) => Some(unavailable("Request timed out")),
        SdkError::DispatchFailure(_) => Some(unavailable("Could not reach DynamoDB")),
        _ => None,
    }
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => unavailable("Table not found"),
        GetItemError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        GetItemError::RequestLimitExceeded(_) => unavailable("Request limit exceeded, please retry"),
        GetItemError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a BatchGetItem SDK error to RepositoryError.
pub fn map_batch_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchGetItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        BatchGetItemError::ResourceNotFoundException(_) => unavailable("Table not found"),
        BatchGetItemError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        BatchGetItemError::RequestLimitExceeded(_) => {
            unavailable("Request limit exceeded, please retry")
        }
        BatchGetItemError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("BatchGetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => unavailable("Table or index not found"),
        QueryError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        QueryError::RequestLimitExceeded(_) => unavailable("Request limit exceeded, please retry"),
        QueryError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
///
/// A failed `attribute_not_exists` condition means the quote already exists.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    id: impl Into<String>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => RepositoryError::AlreadyExists {
            entity_type: ENTITY_QUOTE,
            id: id.into(),
        },
        PutItemError::ResourceNotFoundException(_) => unavailable("Table not found"),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        PutItemError::RequestLimitExceeded(_) => unavailable("Request limit exceeded, please retry"),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            unavailable("Transaction conflict, please retry")
        }
        PutItemError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to RepositoryError.
///
/// A failed `attribute_exists` condition means the quote does not exist.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    id: impl Into<String>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => RepositoryError::NotFound {
            entity_type: ENTITY_QUOTE,
            id: id.into(),
        },
        UpdateItemError::ResourceNotFoundException(_) => unavailable("Table not found"),
        UpdateItemError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        UpdateItemError::RequestLimitExceeded(_) => {
            unavailable("Request limit exceeded, please retry")
        }
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            unavailable("Transaction conflict, please retry")
        }
        UpdateItemError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => unavailable("Table not found"),
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            unavailable("Throughput exceeded, please retry")
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            unavailable("Request limit exceeded, please retry")
        }
        DeleteItemError::TransactionConflictException(_) => {
            unavailable("Transaction conflict, please retry")
        }
        DeleteItemError::InternalServerError(_) => unavailable("DynamoDB internal server error"),
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a provisioning (control plane) failure to RepositoryError.
pub fn map_provisioning_error(operation: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::QueryFailed(format!("{} failed: {}", operation, err))
}
