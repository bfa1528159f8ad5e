use crate::core::config::RetryConfig;
use crate::core::error::FetchError;
use crate::core::price::PricePoint;
use anyhow::Result;
use rand::Rng;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "stratfolio/0.1";

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Sends a request and decodes a JSON body.
///
/// A 404 means the provider does not know the ticker.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    ticker: &str,
) -> Result<T, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::request(ticker, e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::InvalidSymbol(ticker.to_string()));
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            symbol: ticker.to_string(),
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| FetchError::request(ticker, e))?;
    serde_json::from_str(&text).map_err(|e| FetchError::decode(ticker, e))
}

/// Lookup variants of a symbol, in the order they should be tried.
///
/// Class shares are spelled `BRK-B` by some providers and `BRK.B` by others,
/// and listings outside the home exchange need an exchange suffix.
pub fn candidate_symbols(symbol: &str, suffixes: &[String]) -> Vec<String> {
    let mut candidates = vec![symbol.to_string()];

    let swapped = if symbol.contains('-') {
        Some(symbol.replace('-', "."))
    } else if symbol.contains('.') {
        Some(symbol.replace('.', "-"))
    } else {
        None
    };
    candidates.extend(swapped);

    for suffix in suffixes {
        if !suffix.is_empty() && !symbol.ends_with(suffix.as_str()) {
            candidates.push(format!("{symbol}{suffix}"));
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

/// Tries each lookup variant until one resolves.
///
/// Only [`FetchError::InvalidSymbol`] moves on to the next variant; any other
/// failure is returned as is.
pub(crate) async fn first_resolved<F, Fut>(
    symbol: &str,
    suffixes: &[String],
    mut fetch: F,
) -> Result<PricePoint, FetchError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<PricePoint, FetchError>>,
{
    for candidate in candidate_symbols(symbol, suffixes) {
        match fetch(candidate.clone()).await {
            Err(FetchError::InvalidSymbol(_)) => {
                debug!("No quote for candidate {}, trying next", candidate);
            }
            other => return other,
        }
    }
    Err(FetchError::InvalidSymbol(symbol.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            max_jitter: Duration::from_millis(100),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after the given failed attempt (1-based),
    /// without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.backoff_base.saturating_mul(1 << exponent)
    }

    fn delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..=self.max_jitter);
        self.backoff(attempt) + jitter
    }
}

#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Retries an async operation with exponential backoff and jitter
///
/// # Parameters
/// - `operation`: Closure receiving the 1-based attempt number
/// - `policy`: Attempt limit and delays
///
/// # Returns
/// Either the successful result or the last error once attempts run out
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                let delay = policy.delay(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying after {:?}",
                    attempt, max_attempts, err, delay
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_candidate_symbols() {
        assert_eq!(candidate_symbols("MSFT", &[]), vec!["MSFT"]);
        assert_eq!(candidate_symbols("BRK-B", &[]), vec!["BRK-B", "BRK.B"]);
        assert_eq!(
            candidate_symbols("NSRGY", &[".TO".to_string(), "".to_string()]),
            vec!["NSRGY", "NSRGY.TO"]
        );
        assert_eq!(
            candidate_symbols("SHOP.TO", &[".TO".to_string()]),
            vec!["SHOP.TO", "SHOP-TO"]
        );
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        for attempt in 1..5 {
            let delay = policy.delay(attempt);
            assert!(delay >= policy.backoff(attempt));
            assert!(delay <= policy.backoff(attempt) + policy.max_jitter);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_succeeds_on_third_attempt() {
        let policy = RetryPolicy::default();
        let start = Instant::now();

        let result = with_retry(
            |attempt| async move {
                if attempt < 3 {
                    Err(format!("failure {attempt}"))
                } else {
                    Ok(attempt)
                }
            },
            &policy,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed <= Duration::from_secs(3) + 2 * policy.max_jitter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_reports_last_error() {
        let policy = RetryPolicy::default();

        let result: Result<(), _> =
            with_retry(|attempt| async move { Err(format!("failure {attempt}")) }, &policy).await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, "failure 3");
    }

    #[tokio::test]
    async fn test_first_resolved_falls_back_to_variant() {
        let point = first_resolved("BRK-B", &[], |candidate| async move {
            if candidate == "BRK.B" {
                PricePoint::from_daily_closes(
                    "BRK-B",
                    rust_decimal::Decimal::ONE,
                    [(chrono::NaiveDate::MIN, rust_decimal::Decimal::ONE)].into(),
                )
            } else {
                Err(FetchError::InvalidSymbol(candidate))
            }
        })
        .await
        .unwrap();

        assert_eq!(point.symbol, "BRK-B");
    }

    #[tokio::test]
    async fn test_first_resolved_stops_on_other_errors() {
        let mut calls = Vec::new();
        let result = first_resolved("BRK-B", &[], |candidate| {
            calls.push(candidate.clone());
            async move { Err(FetchError::NoHistory(candidate)) }
        })
        .await;

        assert_eq!(result, Err(FetchError::NoHistory("BRK-B".to_string())));
        assert_eq!(calls, vec!["BRK-B"]);
    }
}
