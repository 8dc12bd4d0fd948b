use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Names of the attributes that make up a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>) -> Self {
        KeySchema {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Key attribute names, partition key first.
    pub fn attributes(&self) -> Vec<&str> {
        let mut attrs = vec![self.partition_key.as_str()];
        if let Some(sort_key) = &self.sort_key {
            attrs.push(sort_key);
        }
        attrs
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.partition_key == attribute || self.sort_key.as_deref() == Some(attribute)
    }
}

impl fmt::Display for KeySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort_key {
            Some(sort_key) => write!(f, "HASH({}) RANGE({sort_key})", self.partition_key),
            None => write!(f, "HASH({})", self.partition_key),
        }
    }
}

/// Key attribute values identifying exactly one record.
///
/// Also used as the continuation token of a scan, since the store's last
/// evaluated key is the primary key of the last record it read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKey(BTreeMap<String, Value>);

impl PrimaryKey {
    pub fn new(attributes: BTreeMap<String, Value>) -> Self {
        PrimaryKey(attributes)
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    pub fn into_attributes(self) -> BTreeMap<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PrimaryKey {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PrimaryKey(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>();
        f.write_str(&parts.join(", "))
    }
}
