//! Retry policy with exponential backoff and full jitter.

use std::time::Duration;

use rand::Rng;
use tracing::{info_span, warn, Instrument};

use crate::error::LedgerResult;
use crate::metrics::record_retry;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Create config from `LEDGER_RETRY_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse = |name: &str| std::env::var(name).ok().and_then(|s| s.parse().ok());

        Self {
            max_retries: parse("LEDGER_RETRY_MAX").map(|v: u64| v as u32).unwrap_or(defaults.max_retries),
            base_delay_ms: parse("LEDGER_RETRY_BASE_MS").unwrap_or(defaults.base_delay_ms),
            max_delay_ms: parse("LEDGER_RETRY_MAX_MS").unwrap_or(defaults.max_delay_ms),
        }
    }
}

/// Execute an async operation, retrying errors that [`LedgerError::is_retryable`]
/// accepts.
///
/// [`LedgerError::is_retryable`]: crate::error::LedgerError::is_retryable
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: &str, op: F) -> LedgerResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = LedgerResult<T>>,
{
    let mut attempt = 0;
    loop {
        let span = info_span!("ledger_retry", operation = %operation, attempt = attempt + 1);

        match op().instrument(span).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = calculate_delay(config, attempt);

                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Ledger operation failed, retrying: {}",
                    e
                );

                record_retry(operation);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential backoff capped at `max_delay_ms`, jittered down to no less
/// than `base_delay_ms`.
fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp_delay = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let capped = exp_delay.min(config.max_delay_ms);

    let jittered = if capped > 0 {
        rand::rng().random_range(0..=capped)
    } else {
        0
    };

    Duration::from_millis(jittered.max(config.base_delay_ms))
}
