use crate::error::StoreError;
use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use model::{
    core::{key::PrimaryKey, value::Value},
    records::record::Record,
};
use std::collections::{BTreeMap, HashMap};

pub type Item = HashMap<String, AttributeValue>;

pub fn value_from_attribute(attr: &AttributeValue) -> Result<Value, StoreError> {
    let value = match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(n.clone()),
        AttributeValue::B(b) => Value::Binary(b.as_ref().to_vec()),
        AttributeValue::Bool(b) => Value::Boolean(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Ss(v) => Value::StringSet(v.clone()),
        AttributeValue::Ns(v) => Value::NumberSet(v.clone()),
        AttributeValue::Bs(v) => Value::BinarySet(v.iter().map(|b| b.as_ref().to_vec()).collect()),
        AttributeValue::L(items) => Value::List(
            items
                .iter()
                .map(value_from_attribute)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Map(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), value_from_attribute(v)?)))
                .collect::<Result<_, StoreError>>()?,
        ),
        other => {
            return Err(StoreError::InvalidResponse(format!(
                "unsupported attribute value: {other:?}"
            )));
        }
    };
    Ok(value)
}

pub fn attribute_from_value(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(n.clone()),
        Value::Binary(b) => AttributeValue::B(Blob::new(b.clone())),
        Value::Boolean(b) => AttributeValue::Bool(*b),
        Value::StringSet(v) => AttributeValue::Ss(v.clone()),
        Value::NumberSet(v) => AttributeValue::Ns(v.clone()),
        Value::BinarySet(v) => AttributeValue::Bs(v.iter().cloned().map(Blob::new).collect()),
        Value::List(items) => AttributeValue::L(items.iter().map(attribute_from_value).collect()),
        Value::Map(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_from_value(v)))
                .collect(),
        ),
        Value::Null => AttributeValue::Null(true),
    }
}

fn attributes_from_item(item: &Item) -> Result<BTreeMap<String, Value>, StoreError> {
    item.iter()
        .map(|(k, v)| Ok((k.clone(), value_from_attribute(v)?)))
        .collect()
}

pub fn record_from_item(item: &Item) -> Result<Record, StoreError> {
    Ok(Record::new(attributes_from_item(item)?))
}

pub fn key_from_item(item: &Item) -> Result<PrimaryKey, StoreError> {
    Ok(PrimaryKey::new(attributes_from_item(item)?))
}

pub fn item_from_key(key: &PrimaryKey) -> Item {
    key.attributes()
        .iter()
        .map(|(k, v)| (k.clone(), attribute_from_value(v)))
        .collect()
}
