//! Bounded retry on Telegram rate-limit responses.
//!
//! A 429 carries a server-advised delay; the wrapper sleeps that long and
//! retries the same send. Attempts are capped so a misbehaving advisory
//! header cannot hold the run hostage, and each individual wait is clamped.

use std::future::Future;
use std::time::Duration;

use crate::error::TelegramError;

/// Upper bound on a single advisory wait. A server telling us to come back
/// in an hour is treated as a delivery failure, not a schedule.
const MAX_WAIT_SECS: u64 = 60;

/// Runs `operation`, sleeping and retrying on [`TelegramError::RateLimited`]
/// up to `max_retries` additional attempts. Every other error, and a 429
/// once attempts are exhausted, is returned to the caller unchanged.
pub(crate) async fn retry_on_rate_limit<T, F, Fut>(
    max_retries: u32,
    mut operation: F,
) -> Result<T, TelegramError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TelegramError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(TelegramError::RateLimited { retry_after_secs }) if attempt < max_retries => {
                attempt += 1;
                let wait_secs = retry_after_secs.min(MAX_WAIT_SECS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    wait_secs,
                    "rate limited — waiting before retrying delivery"
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
