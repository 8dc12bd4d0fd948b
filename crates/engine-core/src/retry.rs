use connectors::error::StoreError;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    Fatal(E),
    /// The error was retryable, but the configured attempts were exhausted.
    AttemptsExceeded(E),
    /// Cancellation was requested while waiting to retry.
    Cancelled(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(err)
            | RetryError::AttemptsExceeded(err)
            | RetryError::Cancelled(err) => err,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_database()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Preset tuned for store calls (throttling needs a longer back-off).
    pub fn for_database() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }

    /// A single attempt, no back-off.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Executes the operation with the configured retry policy.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
    {
        self.run_with(op, classify, |_, _| {}, &CancellationToken::new())
            .await
    }

    /// Like [`RetryPolicy::run`], but calls `on_retry` with the error and the
    /// number of the upcoming attempt before each back-off, and gives up with
    /// [`RetryError::Cancelled`] when `cancel` fires during a back-off.
    pub async fn run_with<F, Fut, T, E, Classifier, OnRetry>(
        &self,
        mut op: F,
        classify: Classifier,
        mut on_retry: OnRetry,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        OnRetry: FnMut(&E, usize),
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        if attempt + 1 >= self.max_attempts {
                            return Err(RetryError::AttemptsExceeded(err));
                        }

                        let delay = self.backoff_delay(attempt);
                        attempt += 1;
                        on_retry(&err, attempt + 1);

                        tokio::select! {
                            _ = sleep(delay) => {}
                            _ = cancel.cancelled() => return Err(RetryError::Cancelled(err)),
                        }
                    }
                },
            }
        }
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::from_millis(0);
        }

        let factor = 1u128 << attempt.min(6);
        let base_ms = self.base_delay.as_millis();
        let delay_ms = base_ms.saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis());
        Duration::from_millis(capped as u64)
    }
}

pub fn classify_store_error(err: &StoreError) -> RetryDisposition {
    if err.is_retryable() {
        RetryDisposition::Retry
    } else {
        RetryDisposition::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = fast(3)
            .run(
                move || async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(StoreError::Throttled("busy".into()))
                    } else {
                        Ok(n)
                    }
                },
                classify_store_error,
            )
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = fast(5)
            .run(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::Service("denied".into()))
                },
                classify_store_error,
            )
            .await;

        assert!(matches!(result, Err(RetryError::Fatal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_exceeded() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = fast(2)
            .run(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::Transient("reset".into()))
                },
                classify_store_error,
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::AttemptsExceeded(_)));
        assert!(matches!(err.into_inner(), StoreError::Transient(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_on_retry_skips_final_attempt() {
        let retries = AtomicUsize::new(0);
        let result: Result<(), _> = fast(3)
            .run_with(
                || async { Err(StoreError::Throttled("busy".into())) },
                classify_store_error,
                |_, _| {
                    retries.fetch_add(1, Ordering::SeqCst);
                },
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(RetryError::AttemptsExceeded(_))));
        assert_eq!(retries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_never_retries() {
        let mut attempts = Vec::new();
        let result: Result<(), _> = RetryPolicy::no_retry()
            .run_with(
                || async { Err(StoreError::Transient("reset".into())) },
                classify_store_error,
                |_, attempt| attempts.push(attempt),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(RetryError::AttemptsExceeded(_))));
        assert!(attempts.is_empty());
    }

    #[tokio::test]
    async fn test_on_retry_reports_next_attempt() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let mut attempts = Vec::new();
        let result = fast(5)
            .run_with(
                move || async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(StoreError::Throttled("busy".into()))
                    } else {
                        Ok(n)
                    }
                },
                classify_store_error,
                |_, attempt| attempts.push(attempt),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let policy = RetryPolicy::new(5, Duration::from_secs(60), Duration::from_secs(60));

        let result: Result<(), _> = tokio::time::timeout(
            Duration::from_secs(5),
            policy.run_with(
                || async { Err(StoreError::Throttled("busy".into())) },
                classify_store_error,
                |_, _| {},
                &cancel,
            ),
        )
        .await
        .expect("back-off was not interrupted");

        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert!(matches!(err.into_inner(), StoreError::Throttled(_)));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(5), Duration::from_millis(500));
    }
}
