use crate::{
    error::BackfillError,
    metrics::Metrics,
    retry::{RetryError, RetryPolicy, classify_store_error},
};
use connectors::{requests::ScanRequest, store::RecordStore};
use futures::{Stream, stream};
use model::pagination::{cursor::Cursor, page::Page};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A page together with the cursor it was read from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub from: Cursor,
    pub page: Page,
}

/// Lazily walks a table page by page, following continuation tokens until
/// the store reports no more data.
///
/// Nothing is fetched until asked for. A reader built with the cursor of an
/// earlier failure continues exactly where that run stopped.
pub struct PageReader {
    store: Arc<dyn RecordStore>,
    request: ScanRequest,
    next: Option<Cursor>,
    retry: RetryPolicy,
    metrics: Metrics,
    cancel: CancellationToken,
}

impl PageReader {
    pub fn new(
        store: Arc<dyn RecordStore>,
        request: ScanRequest,
        retry: RetryPolicy,
        metrics: Metrics,
    ) -> Self {
        let next = Some(request.cursor.clone());
        PageReader {
            store,
            request,
            next,
            retry,
            metrics,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops waiting out a scan back-off once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cursor of the next fetch, `None` once the table is exhausted.
    pub fn position(&self) -> Option<&Cursor> {
        self.next.as_ref()
    }

    pub async fn next_page(&mut self) -> Result<Option<FetchedPage>, BackfillError> {
        let Some(cursor) = self.next.take() else {
            return Ok(None);
        };
        self.request.cursor = cursor.clone();

        let store = self.store.as_ref();
        let request = &self.request;
        let metrics = &self.metrics;

        let result = self
            .retry
            .run_with(
                move || store.scan_page(request),
                classify_store_error,
                |err, attempt| {
                    metrics.increment_retries(1);
                    warn!(
                        table = %store.table_name(),
                        error = %err,
                        attempt,
                        "Scan failed, retrying"
                    );
                },
                &self.cancel,
            )
            .await;

        match result {
            Ok(page) => {
                self.metrics.increment_pages(1);
                self.next = page.next_cursor();
                debug!(
                    table = %self.store.table_name(),
                    from = %cursor,
                    records = page.len(),
                    last = self.next.is_none(),
                    "Page read"
                );
                Ok(Some(FetchedPage { from: cursor, page }))
            }
            Err(RetryError::Cancelled(_)) => {
                self.next = Some(cursor.clone());
                Err(BackfillError::Cancelled { resume: cursor })
            }
            Err(err) => {
                self.next = Some(cursor.clone());
                Err(BackfillError::Scan {
                    table: self.store.table_name().to_string(),
                    resume: cursor,
                    source: err.into_inner(),
                })
            }
        }
    }

    /// The remaining pages as a stream; it ends after the last page or the
    /// first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<FetchedPage, BackfillError>> {
        stream::try_unfold(self, |mut reader| async move {
            let page = reader.next_page().await?;
            Ok::<_, BackfillError>(page.map(|page| (page, reader)))
        })
    }
}
