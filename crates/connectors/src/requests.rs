use model::pagination::cursor::Cursor;

/// Parameters of one scan call.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub cursor: Cursor,
    /// Maximum number of items to evaluate; `None` leaves it to the store.
    pub limit: Option<usize>,
    /// Attributes to return; empty means all of them.
    pub projection: Vec<String>,
    pub consistent_read: bool,
}

pub struct ScanRequestBuilder {
    cursor: Cursor,
    limit: Option<usize>,
    projection: Vec<String>,
    consistent_read: bool,
}

impl ScanRequestBuilder {
    pub fn new() -> Self {
        ScanRequestBuilder {
            cursor: Cursor::None,
            limit: None,
            projection: Vec::new(),
            consistent_read: false,
        }
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn projection<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn build(self) -> ScanRequest {
        ScanRequest {
            cursor: self.cursor,
            limit: self.limit,
            projection: self.projection,
            consistent_read: self.consistent_read,
        }
    }
}

impl Default for ScanRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
