use crate::error::StoreError;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::{error::Error, fmt::Debug};

const THROTTLING_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
];

const TRANSIENT_CODES: &[&str] = &["InternalServerError", "ServiceUnavailable"];

/// Maps an SDK failure of `operation` onto the store error taxonomy.
pub(crate) fn store_error<E, R>(operation: &str, table: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug,
{
    let message = format!("DynamoDB {operation} on '{table}' failed: {}", DisplayErrorContext(&err));

    match &err {
        SdkError::ServiceError(service_err) => match service_err.err().code() {
            Some("ResourceNotFoundException") => StoreError::TableNotFound(table.to_string()),
            Some(code) if THROTTLING_CODES.contains(&code) => StoreError::Throttled(message),
            Some(code) if TRANSIENT_CODES.contains(&code) => StoreError::Transient(message),
            _ => StoreError::Service(message),
        },
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::Transient(message)
        }
        _ => StoreError::Service(message),
    }
}
