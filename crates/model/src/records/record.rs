use crate::{
    core::{
        key::{KeySchema, PrimaryKey},
        value::Value,
    },
    errors::RecordError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an attribute appears on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeState {
    Missing,
    Null,
    Present,
}

impl AttributeState {
    /// Missing and explicit-null attributes both need a value.
    pub fn is_unset(&self) -> bool {
        !matches!(self, AttributeState::Present)
    }
}

/// One item of the table: attribute name to value, no schema beyond its key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(attributes: BTreeMap<String, Value>) -> Self {
        Record { attributes }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: Value) {
        self.attributes.insert(attribute.into(), value);
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> BTreeMap<String, Value> {
        self.attributes
    }

    pub fn attribute_state(&self, attribute: &str) -> AttributeState {
        match self.attributes.get(attribute) {
            None => AttributeState::Missing,
            Some(Value::Null) => AttributeState::Null,
            Some(_) => AttributeState::Present,
        }
    }

    /// Extracts the primary key of this record.
    pub fn key(&self, schema: &KeySchema) -> Result<PrimaryKey, RecordError> {
        let mut key = BTreeMap::new();
        for attribute in schema.attributes() {
            let value =
                self.attributes
                    .get(attribute)
                    .ok_or_else(|| RecordError::MissingKeyAttribute {
                        attribute: attribute.to_string(),
                    })?;

            if !value.is_key_type() {
                return Err(RecordError::InvalidKeyType {
                    attribute: attribute.to_string(),
                    found: value.type_name(),
                });
            }

            key.insert(attribute.to_string(), value.clone());
        }
        Ok(PrimaryKey::new(key))
    }

    /// Copy holding only the named attributes.
    pub fn project(&self, attributes: &[&str]) -> Record {
        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| attributes.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Record { attributes }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
