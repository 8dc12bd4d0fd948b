use crate::core::key::PrimaryKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the scan position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Start of the table.
    #[default]
    None,

    /// Continue after the given key (the store's last evaluated key).
    After(PrimaryKey),
}

impl Cursor {
    pub fn is_start(&self) -> bool {
        matches!(self, Cursor::None)
    }

    pub fn start_key(&self) -> Option<&PrimaryKey> {
        match self {
            Cursor::None => None,
            Cursor::After(key) => Some(key),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::None => write!(f, "<start>"),
            Cursor::After(key) => write!(f, "after({key})"),
        }
    }
}
