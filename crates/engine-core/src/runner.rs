use crate::{
    config::BackfillConfig,
    error::BackfillError,
    metrics::Metrics,
    reader::{FetchedPage, PageReader},
    report::BackfillReport,
    retry::{RetryError, classify_store_error},
};
use chrono::Utc;
use connectors::{
    error::StoreError,
    requests::ScanRequestBuilder,
    store::{RecordStore, UpdateOutcome},
};
use futures::TryStreamExt;
use model::{
    core::{key::KeySchema, value::Value},
    pagination::cursor::Cursor,
    records::record::{AttributeState, Record},
};
use std::{pin::pin, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sets the target attribute on every record of the table that lacks it.
///
/// Records are handled one at a time; each update is awaited before the
/// next record is looked at.
pub struct BackfillRunner {
    store: Arc<dyn RecordStore>,
    config: BackfillConfig,
    metrics: Metrics,
    cancel: CancellationToken,
}

impl BackfillRunner {
    pub fn new(store: Arc<dyn RecordStore>, config: BackfillConfig) -> Self {
        BackfillRunner {
            store,
            config,
            metrics: Metrics::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &BackfillConfig {
        &self.config
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    pub async fn run(&self) -> Result<BackfillReport, BackfillError> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let key_schema = self.resolve_key_schema().await?;
        let attribute = self.config.target_attribute.as_str();
        let default_value = Value::Boolean(self.config.default_value);

        info!(
            %run_id,
            table = %self.store.table_name(),
            region = self.config.region.as_deref().unwrap_or("default"),
            attribute,
            default = self.config.default_value,
            key = %key_schema,
            dry_run = self.config.dry_run,
            from = %self.config.resume_from,
            "Starting backfill"
        );

        let mut projection = key_schema
            .attributes()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        projection.push(attribute.to_string());

        let request = ScanRequestBuilder::new()
            .cursor(self.config.resume_from.clone())
            .limit(self.config.page_size)
            .projection(projection)
            .consistent_read(self.config.consistent_read)
            .build();

        let reader = PageReader::new(
            self.store.clone(),
            request,
            self.config.retry.clone(),
            self.metrics.clone(),
        )
        .with_cancellation(self.cancel.clone());
        let mut pages = pin!(reader.into_stream());
        let mut resume = self.config.resume_from.clone();

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(resume));
            }

            let Some(FetchedPage { from, page }) = pages.try_next().await? else {
                break;
            };

            for record in &page.records {
                if self.cancel.is_cancelled() {
                    return Err(self.cancelled(from));
                }
                self.metrics.increment_scanned(1);
                self.process(record, &key_schema, &default_value, &from)
                    .await?;
            }

            if let Some(next) = page.next_cursor() {
                resume = next;
            }
        }

        let metrics = self.metrics.snapshot();
        if metrics.records_scanned == 0 {
            if self.config.resume_from.is_start() {
                info!(table = %self.store.table_name(), "No records found in table");
            } else {
                info!(
                    table = %self.store.table_name(),
                    from = %self.config.resume_from,
                    "No records left after the resume point"
                );
            }
        }

        if self.config.dry_run {
            info!(
                scanned = metrics.records_scanned,
                "Dry run complete. {} records need '{attribute}'.",
                metrics.records_pending
            );
        } else {
            info!(
                scanned = metrics.records_scanned,
                present = metrics.records_present,
                conflicts = metrics.conflict_count,
                "Backfill complete. Updated {} records.",
                metrics.records_updated
            );
        }

        Ok(BackfillReport {
            run_id,
            table: self.store.table_name().to_string(),
            region: self.config.region.clone(),
            target_attribute: attribute.to_string(),
            default_value: self.config.default_value,
            key_schema,
            dry_run: self.config.dry_run,
            started_at,
            finished_at: Utc::now(),
            metrics,
        })
    }

    async fn resolve_key_schema(&self) -> Result<KeySchema, BackfillError> {
        if let Some(schema) = &self.config.key_schema {
            return Ok(schema.clone());
        }

        let store = self.store.as_ref();
        let info = self
            .config
            .retry
            .run_with(
                move || store.describe(),
                classify_store_error,
                |err, attempt| self.record_retry(err, attempt),
                &self.cancel,
            )
            .await
            .map_err(|err| match err {
                RetryError::Cancelled(_) => self.cancelled(self.config.resume_from.clone()),
                err => BackfillError::Describe {
                    table: store.table_name().to_string(),
                    source: err.into_inner(),
                },
            })?;

        self.config.check_key_schema(&info.key_schema)?;
        debug!(table = %info.name, key = %info.key_schema, "Key schema discovered");
        Ok(info.key_schema)
    }

    async fn process(
        &self,
        record: &Record,
        key_schema: &KeySchema,
        value: &Value,
        from: &Cursor,
    ) -> Result<(), BackfillError> {
        let attribute = self.config.target_attribute.as_str();
        let state = record.attribute_state(attribute);

        if state == AttributeState::Present {
            self.metrics.increment_present(1);
            return Ok(());
        }

        let key = record
            .key(key_schema)
            .map_err(|source| BackfillError::Record {
                resume: from.clone(),
                source,
            })?;

        if self.config.dry_run {
            self.metrics.increment_pending(1);
            info!(key = %key, ?state, "Record needs backfill");
            return Ok(());
        }

        let store = self.store.as_ref();
        let key_ref = &key;
        let outcome = self
            .config
            .retry
            .run_with(
                move || store.set_if_unset(key_ref, attribute, value),
                classify_store_error,
                |err, attempt| self.record_retry(err, attempt),
                &self.cancel,
            )
            .await
            .map_err(|err| match err {
                RetryError::Cancelled(_) => self.cancelled(from.clone()),
                err => BackfillError::Update {
                    key: key.to_string(),
                    resume: from.clone(),
                    source: err.into_inner(),
                },
            })?;

        match outcome {
            UpdateOutcome::Updated => {
                self.metrics.increment_updated(1);
                info!(key = %key, "Updated record");
            }
            UpdateOutcome::ConditionFailed => {
                self.metrics.increment_conflicts(1);
                warn!(key = %key, "Record changed since it was scanned, skipped");
            }
        }

        Ok(())
    }

    fn record_retry(&self, err: &StoreError, attempt: usize) {
        self.metrics.increment_retries(1);
        warn!(
            table = %self.store.table_name(),
            error = %err,
            attempt,
            "Store call failed, retrying"
        );
    }

    fn cancelled(&self, resume: Cursor) -> BackfillError {
        warn!(
            table = %self.store.table_name(),
            resume = %resume,
            "Backfill cancelled"
        );
        BackfillError::Cancelled { resume }
    }
}
