use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// A single attribute value as stored in the table.
///
/// Numbers keep their decimal string form so that values read from the
/// store are written back byte-for-byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Value {
    String(String),
    Number(String),
    Binary(Vec<u8>),
    Boolean(bool),
    StringSet(Vec<String>),
    NumberSet(Vec<String>),
    BinarySet(Vec<Vec<u8>>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Number(v) => Some(v),
            _ => None,
        }
    }

    /// Only scalar strings, numbers and binaries may form a primary key.
    pub fn is_key_type(&self) -> bool {
        matches!(self, Value::String(_) | Value::Number(_) | Value::Binary(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "S",
            Value::Number(_) => "N",
            Value::Binary(_) => "B",
            Value::Boolean(_) => "BOOL",
            Value::StringSet(_) => "SS",
            Value::NumberSet(_) => "NS",
            Value::BinarySet(_) => "BS",
            Value::List(_) => "L",
            Value::Map(_) => "M",
            Value::Null => "NULL",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) | Value::Number(v) => write!(f, "{v}"),
            Value::Binary(v) => {
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Boolean(v) => write!(f, "{v}"),
            Value::StringSet(v) | Value::NumberSet(v) => write!(f, "{{{}}}", v.join(", ")),
            Value::BinarySet(v) => write!(f, "<{} binaries>", v.len()),
            Value::List(v) => {
                let items = v.iter().map(|i| i.to_string()).collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Map(v) => {
                let items = v
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Null => write!(f, "NULL"),
        }
    }
}
