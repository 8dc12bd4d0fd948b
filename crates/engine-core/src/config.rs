use crate::{error::ConfigError, retry::RetryPolicy};
use model::{core::key::KeySchema, pagination::cursor::Cursor};
use serde::Serialize;

pub const DEFAULT_TARGET_ATTRIBUTE: &str = "isTimeClaimed";

/// Everything a backfill run needs to know, injected by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillConfig {
    pub table_name: String,
    /// Region the store client was built for. Logged and recorded in the
    /// report; the client itself takes it from the store configuration.
    pub region: Option<String>,
    /// Attribute to backfill.
    pub target_attribute: String,
    /// Value written to records where the attribute is missing or null.
    pub default_value: bool,
    /// Overrides the key schema reported by the table.
    pub key_schema: Option<KeySchema>,
    pub page_size: Option<usize>,
    pub consistent_read: bool,
    /// Scan and count only; issue no writes.
    pub dry_run: bool,
    pub resume_from: Cursor,
    pub retry: RetryPolicy,
}

impl BackfillConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        BackfillConfig {
            table_name: table_name.into(),
            region: None,
            target_attribute: DEFAULT_TARGET_ATTRIBUTE.to_string(),
            default_value: false,
            key_schema: None,
            page_size: None,
            consistent_read: false,
            dry_run: false,
            resume_from: Cursor::None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_target_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.target_attribute = attribute.into();
        self
    }

    pub fn with_default_value(mut self, value: bool) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_key_schema(mut self, key_schema: KeySchema) -> Self {
        self.key_schema = Some(key_schema);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_resume_from(mut self, cursor: Cursor) -> Self {
        self.resume_from = cursor;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }

        if self.target_attribute.trim().is_empty() {
            return Err(ConfigError::EmptyAttribute);
        }

        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidPageSize);
        }

        if let Some(schema) = &self.key_schema {
            self.check_key_schema(schema)?;
        }

        Ok(())
    }

    /// The target attribute must never be part of the key.
    pub fn check_key_schema(&self, schema: &KeySchema) -> Result<(), ConfigError> {
        if schema.partition_key.trim().is_empty() {
            return Err(ConfigError::EmptyKeyAttribute);
        }

        if schema.contains(&self.target_attribute) {
            return Err(ConfigError::AttributeIsKey(self.target_attribute.clone()));
        }

        Ok(())
    }
}
