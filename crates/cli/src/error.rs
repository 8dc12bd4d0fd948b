use connectors::error::StoreError;
use engine_core::error::BackfillError;
use model::pagination::cursor::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Failed to parse the resume token: {0}")]
    InvalidResumeToken(serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backfill failed: {0}")]
    Backfill(#[from] BackfillError),
}

impl CliError {
    pub fn resume_cursor(&self) -> Option<&Cursor> {
        match self {
            CliError::Backfill(err) => err.resume_cursor(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CliError::Backfill(err) if err.is_cancelled())
    }
}
