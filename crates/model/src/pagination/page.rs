use crate::{core::key::PrimaryKey, pagination::cursor::Cursor, records::record::Record};

/// One page of a scan.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Record>,
    /// Last evaluated key; `None` once the table is exhausted.
    pub last_key: Option<PrimaryKey>,
}

impl Page {
    pub fn new(records: Vec<Record>, last_key: Option<PrimaryKey>) -> Self {
        Page { records, last_key }
    }

    pub fn is_last(&self) -> bool {
        self.last_key.as_ref().is_none_or(|k| k.is_empty())
    }

    pub fn next_cursor(&self) -> Option<Cursor> {
        if self.is_last() {
            return None;
        }
        self.last_key.clone().map(Cursor::After)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
