use connectors::error::StoreError;
use model::{errors::RecordError, pagination::cursor::Cursor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Table name must not be empty")]
    EmptyTableName,

    #[error("Target attribute name must not be empty")]
    EmptyAttribute,

    #[error("Key attribute name must not be empty")]
    EmptyKeyAttribute,

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Target attribute '{0}' is part of the primary key")]
    AttributeIsKey(String),
}

/// Failures of a backfill run.
///
/// Variants raised while walking the table carry the cursor of the page
/// being processed. Restarting from it is safe: updates are conditional.
#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to describe table '{table}': {source}")]
    Describe {
        table: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to scan table '{table}' at {resume}: {source}")]
    Scan {
        table: String,
        resume: Cursor,
        #[source]
        source: StoreError,
    },

    #[error("Failed to update record '{key}': {source}")]
    Update {
        key: String,
        resume: Cursor,
        #[source]
        source: StoreError,
    },

    #[error("Invalid record in page at {resume}: {source}")]
    Record {
        resume: Cursor,
        #[source]
        source: RecordError,
    },

    #[error("Backfill cancelled at {resume}")]
    Cancelled { resume: Cursor },
}

impl BackfillError {
    /// Where a rerun should start to pick up the remaining records.
    pub fn resume_cursor(&self) -> Option<&Cursor> {
        match self {
            BackfillError::Scan { resume, .. }
            | BackfillError::Update { resume, .. }
            | BackfillError::Record { resume, .. }
            | BackfillError::Cancelled { resume } => Some(resume),
            BackfillError::Config(_) | BackfillError::Describe { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BackfillError::Cancelled { .. })
    }
}
