use crate::{
    config::BackfillConfig, error::BackfillError, retry::RetryPolicy, runner::BackfillRunner,
};
use async_trait::async_trait;
use connectors::{
    error::StoreError,
    memory::InMemoryStore,
    requests::ScanRequest,
    store::{RecordStore, TableInfo, UpdateOutcome},
};
use model::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    pagination::{cursor::Cursor, page::Page},
    records::record::Record,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;

const TABLE: &str = "Sighting";
const ATTR: &str = "isTimeClaimed";

fn sighting(id: &str, claimed: Option<Value>) -> Record {
    let mut record: Record = [("id", Value::from(id)), ("hours", Value::from(2))]
        .into_iter()
        .collect();
    if let Some(value) = claimed {
        record.set(ATTR, value);
    }
    record
}

async fn seeded(records: Vec<Record>, page_limit: usize) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new(TABLE, KeySchema::new("id")).with_page_limit(page_limit));
    for record in records {
        store.insert(record).await.unwrap();
    }
    store
}

fn config() -> BackfillConfig {
    BackfillConfig::new(TABLE).with_retry(RetryPolicy::new(3, Duration::ZERO, Duration::ZERO))
}

fn key(id: &str) -> PrimaryKey {
    [("id", id)].into_iter().collect()
}

async fn claimed(store: &InMemoryStore, id: &str) -> Option<Value> {
    store.get(&key(id)).await.and_then(|r| r.get(ATTR).cloned())
}

/// Wraps the in-memory table and injects failures.
struct FlakyStore {
    inner: Arc<InMemoryStore>,
    scan_failures: AtomicUsize,
    fail_update_for: Option<String>,
    concurrent_writer: bool,
    cancel_on_throttle: Option<CancellationToken>,
}

impl FlakyStore {
    fn new(inner: Arc<InMemoryStore>) -> Self {
        FlakyStore {
            inner,
            scan_failures: AtomicUsize::new(0),
            fail_update_for: None,
            concurrent_writer: false,
            cancel_on_throttle: None,
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    async fn describe(&self) -> Result<TableInfo, StoreError> {
        self.inner.describe().await
    }

    async fn scan_page(&self, request: &ScanRequest) -> Result<Page, StoreError> {
        let remaining = self.scan_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.scan_failures.store(remaining - 1, Ordering::SeqCst);
            if let Some(cancel) = &self.cancel_on_throttle {
                cancel.cancel();
            }
            return Err(StoreError::Throttled("ProvisionedThroughputExceeded".into()));
        }
        self.inner.scan_page(request).await
    }

    async fn set_if_unset(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        value: &Value,
    ) -> Result<UpdateOutcome, StoreError> {
        let id = key.get("id").and_then(Value::as_str);
        if id.is_some() && id == self.fail_update_for.as_deref() {
            return Err(StoreError::Service("AccessDeniedException".into()));
        }

        if self.concurrent_writer {
            self.inner
                .set_if_unset(key, attribute, &Value::Boolean(true))
                .await?;
        }

        self.inner.set_if_unset(key, attribute, value).await
    }
}

#[tokio::test]
async fn test_backfills_missing_and_null() {
    let store = seeded(
        vec![
            sighting("1", None),
            sighting("2", Some(Value::Boolean(true))),
            sighting("3", Some(Value::Null)),
        ],
        100,
    )
    .await;

    let report = BackfillRunner::new(store.clone(), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated(), 2);
    assert_eq!(report.metrics.records_scanned, 3);
    assert_eq!(report.metrics.records_present, 1);
    assert_eq!(claimed(&store, "1").await, Some(Value::Boolean(false)));
    assert_eq!(claimed(&store, "2").await, Some(Value::Boolean(true)));
    assert_eq!(claimed(&store, "3").await, Some(Value::Boolean(false)));
}

#[tokio::test]
async fn test_existing_values_are_untouched() {
    let store = seeded(
        vec![
            sighting("1", Some(Value::Boolean(false))),
            sighting("2", Some(Value::from("yes"))),
        ],
        100,
    )
    .await;

    let report = BackfillRunner::new(store.clone(), config().with_default_value(true))
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated(), 0);
    assert_eq!(store.update_calls(), 0);
    assert_eq!(claimed(&store, "1").await, Some(Value::Boolean(false)));
    assert_eq!(claimed(&store, "2").await, Some(Value::from("yes")));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let store = seeded(
        vec![sighting("1", None), sighting("2", Some(Value::Null))],
        100,
    )
    .await;

    let first = BackfillRunner::new(store.clone(), config()).run().await.unwrap();
    let after_first = store.records().await;

    let second = BackfillRunner::new(store.clone(), config()).run().await.unwrap();

    assert_eq!(first.updated(), 2);
    assert_eq!(second.updated(), 0);
    assert_eq!(second.metrics.records_present, 2);
    assert_eq!(store.records().await, after_first);
}

#[tokio::test]
async fn test_empty_table() {
    let store = seeded(vec![], 100).await;

    let report = BackfillRunner::new(store.clone(), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated(), 0);
    assert_eq!(report.metrics.records_scanned, 0);
    assert_eq!(report.metrics.pages_fetched, 1);
}

#[tokio::test]
async fn test_walks_every_page() {
    let records = (0..25).map(|i| sighting(&format!("{i:02}"), None)).collect();
    let store = seeded(records, 4).await;

    let report = BackfillRunner::new(store.clone(), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated(), 25);
    assert_eq!(report.metrics.pages_fetched, 7);
    assert_eq!(store.scan_calls(), 7);
    for record in store.records().await {
        assert_eq!(record.get(ATTR), Some(&Value::Boolean(false)));
    }
}

#[tokio::test]
async fn test_page_size_is_honoured() {
    let records = (0..6).map(|i| sighting(&i.to_string(), None)).collect();
    let store = seeded(records, 100).await;

    let report = BackfillRunner::new(store.clone(), config().with_page_size(2))
        .run()
        .await
        .unwrap();

    assert_eq!(report.metrics.pages_fetched, 3);
    assert_eq!(report.updated(), 6);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let store = seeded(
        vec![
            sighting("1", None),
            sighting("2", Some(Value::Boolean(true))),
            sighting("3", Some(Value::Null)),
        ],
        100,
    )
    .await;

    let report = BackfillRunner::new(store.clone(), config().with_dry_run(true))
        .run()
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.pending(), 2);
    assert_eq!(report.updated(), 0);
    assert_eq!(store.update_calls(), 0);
    assert_eq!(claimed(&store, "1").await, None);
    assert_eq!(claimed(&store, "3").await, Some(Value::Null));
}

#[tokio::test]
async fn test_concurrent_write_counts_as_conflict() {
    let inner = seeded(vec![sighting("1", None)], 100).await;
    let mut flaky = FlakyStore::new(inner.clone());
    flaky.concurrent_writer = true;

    let report = BackfillRunner::new(Arc::new(flaky), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated(), 0);
    assert_eq!(report.metrics.conflict_count, 1);
    assert_eq!(claimed(&inner, "1").await, Some(Value::Boolean(true)));
}

#[tokio::test]
async fn test_throttled_scan_is_retried() {
    let inner = seeded(vec![sighting("1", None)], 100).await;
    let flaky = FlakyStore::new(inner.clone());
    flaky.scan_failures.store(2, Ordering::SeqCst);

    let report = BackfillRunner::new(Arc::new(flaky), config())
        .run()
        .await
        .unwrap();

    assert_eq!(report.metrics.retry_count, 2);
    assert_eq!(report.updated(), 1);
}

#[tokio::test]
async fn test_scan_gives_up_after_max_attempts() {
    let inner = seeded(vec![sighting("1", None)], 100).await;
    let flaky = FlakyStore::new(inner.clone());
    flaky.scan_failures.store(10, Ordering::SeqCst);

    let runner = BackfillRunner::new(Arc::new(flaky), config());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(
        err,
        BackfillError::Scan {
            source: StoreError::Throttled(_),
            ..
        }
    ));
    assert_eq!(err.resume_cursor(), Some(&Cursor::None));

    let max_attempts = runner.config().retry.max_attempts as u64;
    assert_eq!(runner.metrics().snapshot().retry_count, max_attempts - 1);
}

#[tokio::test]
async fn test_single_attempt_counts_no_retries() {
    let inner = seeded(vec![sighting("1", None)], 100).await;
    let flaky = FlakyStore::new(inner.clone());
    flaky.scan_failures.store(1, Ordering::SeqCst);

    let runner = BackfillRunner::new(
        Arc::new(flaky),
        config().with_retry(RetryPolicy::no_retry()),
    );
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, BackfillError::Scan { .. }));
    assert_eq!(runner.metrics().snapshot().retry_count, 0);
}

#[tokio::test]
async fn test_cancel_during_backoff_stops_promptly() {
    let inner = seeded(vec![sighting("1", None)], 100).await;
    let cancel = CancellationToken::new();
    let mut flaky = FlakyStore::new(inner.clone());
    flaky.scan_failures.store(10, Ordering::SeqCst);
    flaky.cancel_on_throttle = Some(cancel.clone());

    let slow = RetryPolicy::new(5, Duration::from_secs(60), Duration::from_secs(60));
    let runner = BackfillRunner::new(Arc::new(flaky), config().with_retry(slow))
        .with_cancellation(cancel);

    let err = tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("run kept waiting after cancellation")
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.resume_cursor(), Some(&Cursor::None));
    assert_eq!(inner.update_calls(), 0);
}

#[tokio::test]
async fn test_region_is_reported() {
    let store = seeded(vec![sighting("1", None)], 100).await;

    let report = BackfillRunner::new(store.clone(), config().with_region("eu-central-1"))
        .run()
        .await
        .unwrap();

    assert_eq!(report.region.as_deref(), Some("eu-central-1"));
}

#[tokio::test]
async fn test_failed_update_aborts_and_resumes() {
    let records = ["1", "2", "3", "4", "5"]
        .into_iter()
        .map(|id| sighting(id, None))
        .collect();
    let inner = seeded(records, 2).await;
    let mut flaky = FlakyStore::new(inner.clone());
    flaky.fail_update_for = Some("3".to_string());

    let err = BackfillRunner::new(Arc::new(flaky), config())
        .run()
        .await
        .unwrap_err();

    let BackfillError::Update { key, resume, .. } = &err else {
        panic!("expected update error, got {err:?}");
    };
    assert_eq!(key, "id=3");
    assert_eq!(resume, &Cursor::After(self::key("2")));
    assert_eq!(claimed(&inner, "2").await, Some(Value::Boolean(false)));
    assert_eq!(claimed(&inner, "3").await, None);

    let resumed = BackfillRunner::new(
        inner.clone(),
        config().with_resume_from(resume.clone()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(resumed.updated(), 3);
    for record in inner.records().await {
        assert_eq!(record.get(ATTR), Some(&Value::Boolean(false)));
    }
}

#[tokio::test]
async fn test_cancelled_run_modifies_nothing() {
    let store = seeded(vec![sighting("1", None)], 100).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = BackfillRunner::new(store.clone(), config())
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.resume_cursor(), Some(&Cursor::None));
    assert_eq!(store.update_calls(), 0);
    assert_eq!(claimed(&store, "1").await, None);
}

#[tokio::test]
async fn test_key_schema_override() {
    let store = Arc::new(InMemoryStore::new(TABLE, KeySchema::new("pk").with_sort_key("sk")));
    let record: Record = [
        ("pk", Value::from("user#1")),
        ("sk", Value::from(1)),
    ]
    .into_iter()
    .collect();
    store.insert(record).await.unwrap();

    let report = BackfillRunner::new(
        store.clone(),
        config().with_key_schema(KeySchema::new("pk").with_sort_key("sk")),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.updated(), 1);
    assert_eq!(report.key_schema.sort_key.as_deref(), Some("sk"));
}

#[tokio::test]
async fn test_target_attribute_cannot_be_discovered_key() {
    let store = seeded(vec![sighting("1", None)], 100).await;

    let err = BackfillRunner::new(store.clone(), config().with_target_attribute("id"))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, BackfillError::Config(_)));
    assert_eq!(store.scan_calls(), 0);
}

#[tokio::test]
async fn test_record_without_configured_key_fails() {
    let store = seeded(vec![sighting("1", None)], 100).await;

    let err = BackfillRunner::new(
        store.clone(),
        config().with_key_schema(KeySchema::new("sightingId")),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, BackfillError::Record { .. }));
}
