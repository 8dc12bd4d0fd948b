use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is missing key attribute '{attribute}'")]
    MissingKeyAttribute { attribute: String },

    #[error("key attribute '{attribute}' has unsupported type {found} (expected S, N or B)")]
    InvalidKeyType {
        attribute: String,
        found: &'static str,
    },
}
