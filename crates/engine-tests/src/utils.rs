#![allow(dead_code)]

use connectors::memory::InMemoryStore;
use engine_core::{config::BackfillConfig, retry::RetryPolicy};
use model::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    records::record::Record,
};
use std::{sync::Arc, time::Duration};

pub const SIGHTING_TABLE: &str = "Sighting-qo222crfkbdjhaavuojlf47f3e-dev";
pub const TIME_CLAIMED: &str = "isTimeClaimed";

/// A sighting as the app stores it, optionally with the claim flag.
pub fn sighting(id: &str, time_claimed: Option<Value>) -> Record {
    let mut record: Record = [
        ("id", Value::from(id)),
        ("volunteerId", Value::from("vol-7")),
        ("hours", Value::Number("1.5".into())),
    ]
    .into_iter()
    .collect();

    if let Some(value) = time_claimed {
        record.set(TIME_CLAIMED, value);
    }
    record
}

pub async fn sighting_table(records: Vec<Record>, page_limit: usize) -> Arc<InMemoryStore> {
    let store = Arc::new(
        InMemoryStore::new(SIGHTING_TABLE, KeySchema::new("id")).with_page_limit(page_limit),
    );
    for record in records {
        store.insert(record).await.expect("insert sighting");
    }
    store
}

pub fn backfill_config() -> BackfillConfig {
    BackfillConfig::new(SIGHTING_TABLE)
        .with_retry(RetryPolicy::new(3, Duration::ZERO, Duration::ZERO))
}

pub fn id_key(id: &str) -> PrimaryKey {
    [("id", id)].into_iter().collect()
}

pub async fn time_claimed(store: &InMemoryStore, id: &str) -> Option<Value> {
    store
        .get(&id_key(id))
        .await
        .and_then(|record| record.get(TIME_CLAIMED).cloned())
}

/// Asserts that every record carries the attribute and that nothing but the
/// attribute differs from `before`.
pub async fn assert_only_attribute_changed(store: &InMemoryStore, before: &[Record]) {
    let after = store.records().await;
    assert_eq!(after.len(), before.len(), "record count changed");

    for (old, new) in before.iter().zip(after.iter()) {
        assert!(
            !new.attribute_state(TIME_CLAIMED).is_unset(),
            "record {:?} still lacks {TIME_CLAIMED}",
            new.get("id")
        );

        for (name, value) in old.attributes() {
            if name == TIME_CLAIMED && value.is_null() {
                continue;
            }
            assert_eq!(new.get(name), Some(value), "attribute {name} changed");
        }
    }
}
