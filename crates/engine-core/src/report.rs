use crate::metrics::MetricsSnapshot;
use chrono::{DateTime, Utc};
use model::core::key::KeySchema;
use serde::Serialize;
use uuid::Uuid;

/// Summary of one backfill run, printed or written as JSON by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillReport {
    pub run_id: Uuid,
    pub table: String,
    pub region: Option<String>,
    pub target_attribute: String,
    pub default_value: bool,
    pub key_schema: KeySchema,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub metrics: MetricsSnapshot,
}

impl BackfillReport {
    pub fn updated(&self) -> u64 {
        self.metrics.records_updated
    }

    pub fn pending(&self) -> u64 {
        self.metrics.records_pending
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
