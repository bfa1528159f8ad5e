use super::util::{RetryPolicy, with_retry};
use crate::core::error::FetchError;
use crate::core::price::{MarketDataProvider, PricePoint};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Spaces out provider requests to stay under an external rate limit.
///
/// Shared by every request in the process; concurrent callers queue on it.
pub struct Pacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}

/// Wraps a provider with bounded retries and request pacing.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
    pacer: Arc<Pacer>,
}

impl<P: MarketDataProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy, pacer: Arc<Pacer>) -> Self {
        Self {
            inner,
            policy,
            pacer,
        }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for RetryingProvider<P> {
    #[instrument(name = "FetchWithRetry", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError> {
        let result = with_retry(
            move |attempt| async move {
                self.pacer.wait().await;
                debug!("Fetching data for {}, attempt {}", symbol, attempt);
                self.inner.fetch_quote(symbol).await
            },
            &self.policy,
        )
        .await;

        result.map_err(|exhausted| FetchError::Exhausted {
            symbol: symbol.to_string(),
            attempts: exhausted.attempts,
            detail: exhausted.last_error.to_string(),
        })
    }
}
