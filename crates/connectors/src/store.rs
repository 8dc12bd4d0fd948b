use crate::{error::StoreError, requests::ScanRequest};
use async_trait::async_trait;
use model::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    pagination::page::Page,
};
use serde::Serialize;

/// What the store reports about a table.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub key_schema: KeySchema,
    pub status: Option<String>,
    /// Approximate; the store refreshes it periodically.
    pub item_count: Option<i64>,
}

/// Result of a conditional attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The attribute was unset and now holds the new value.
    Updated,
    /// The condition failed: the attribute was set (or the record removed)
    /// after it was scanned.
    ConditionFailed,
}

/// A single table that can be scanned page by page and patched per record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn table_name(&self) -> &str;

    async fn describe(&self) -> Result<TableInfo, StoreError>;

    /// Reads one page starting at `request.cursor`.
    async fn scan_page(&self, request: &ScanRequest) -> Result<Page, StoreError>;

    /// Sets `attribute` to `value` on the record identified by `key`, only if
    /// the record exists and the attribute is missing or null.
    async fn set_if_unset(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        value: &Value,
    ) -> Result<UpdateOutcome, StoreError>;
}
