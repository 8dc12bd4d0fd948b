use model::errors::RecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The table does not exist or is not visible to the caller.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The store rejected the request because of provisioned/request limits.
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// Network, timeout or server-side failure that may succeed on retry.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Any other service-side rejection.
    #[error("Store service error: {0}")]
    Service(String),

    /// The store answered with something we cannot interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Throttled(_) | StoreError::Transient(_))
    }
}
