use crate::{
    error::StoreError,
    requests::ScanRequest,
    store::{RecordStore, TableInfo, UpdateOutcome},
};
use async_trait::async_trait;
use model::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    pagination::page::Page,
    records::record::Record,
};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

const DEFAULT_PAGE_LIMIT: usize = 100;

/// Table kept in process memory, ordered by primary key.
///
/// Pages are capped at `page_limit` records regardless of the requested
/// limit, the same way a remote store caps a page by response size.
pub struct InMemoryStore {
    name: String,
    key_schema: KeySchema,
    page_limit: usize,
    items: Mutex<BTreeMap<String, Record>>,
    scan_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(name: impl Into<String>, key_schema: KeySchema) -> Self {
        InMemoryStore {
            name: name.into(),
            key_schema,
            page_limit: DEFAULT_PAGE_LIMIT,
            items: Mutex::new(BTreeMap::new()),
            scan_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub async fn insert(&self, record: Record) -> Result<(), StoreError> {
        let key = record.key(&self.key_schema)?;
        self.items.lock().await.insert(key.to_string(), record);
        Ok(())
    }

    pub async fn get(&self, key: &PrimaryKey) -> Option<Record> {
        self.items.lock().await.get(&key.to_string()).cloned()
    }

    /// All records in key order.
    pub async fn records(&self) -> Vec<Record> {
        self.items.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn table_name(&self) -> &str {
        &self.name
    }

    async fn describe(&self) -> Result<TableInfo, StoreError> {
        let item_count = self.items.lock().await.len() as i64;
        Ok(TableInfo {
            name: self.name.clone(),
            key_schema: self.key_schema.clone(),
            status: Some("ACTIVE".to_string()),
            item_count: Some(item_count),
        })
    }

    async fn scan_page(&self, request: &ScanRequest) -> Result<Page, StoreError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);

        let limit = request
            .limit
            .map_or(self.page_limit, |l| l.min(self.page_limit))
            .max(1);

        let items = self.items.lock().await;
        let lower = match request.cursor.start_key() {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let mut range = items.range((lower, Bound::Unbounded));
        let mut records = Vec::with_capacity(limit);
        for (_, record) in range.by_ref().take(limit) {
            records.push(record.clone());
        }

        let last_key = match (range.next(), records.last()) {
            (Some(_), Some(last)) => Some(last.key(&self.key_schema)?),
            _ => None,
        };

        if !request.projection.is_empty() {
            let projection = request
                .projection
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>();
            records = records.iter().map(|r| r.project(&projection)).collect();
        }

        Ok(Page::new(records, last_key))
    }

    async fn set_if_unset(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        value: &Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut items = self.items.lock().await;
        let Some(record) = items.get_mut(&key.to_string()) else {
            return Ok(UpdateOutcome::ConditionFailed);
        };

        if !record.attribute_state(attribute).is_unset() {
            return Ok(UpdateOutcome::ConditionFailed);
        }

        record.set(attribute, value.clone());
        Ok(UpdateOutcome::Updated)
    }
}
