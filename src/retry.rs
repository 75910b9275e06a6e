//! Backoff for transient locale fetch failures.
//!
//! One [`FetchBackoff::run`] call is one logical fetch: the request is
//! repeated only while the error is transient (see
//! [`TransportError::is_transient`]) and attempts remain. The fetch
//! coordinator above never retries on its own.

use crate::i18n::Dictionary;
use crate::transport::TransportError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Attempt budget and delays for one locale fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBackoff {
    attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for FetchBackoff {
    /// 3 attempts, waiting 500ms then 1s.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500)).with_max_delay(Duration::from_secs(2))
    }
}

impl FetchBackoff {
    /// `attempts` counts the first request; 0 is treated as 1.
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait before the `failed`-th retry (1-based): base, 2x base, 4x base...
    fn delay_after(&self, failed: u32) -> Duration {
        let factor = 1u32 << failed.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `fetch` for `locale` until it succeeds, fails permanently, or the
    /// budget is spent. Returns the last error in the latter cases.
    pub async fn run<F, Fut>(&self, locale: &str, mut fetch: F) -> Result<Dictionary, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Dictionary, TransportError>>,
    {
        let mut failed = 0;
        loop {
            let err = match fetch().await {
                Ok(dict) => {
                    if failed > 0 {
                        debug!("Locale '{}' fetched after {} failed attempts", locale, failed);
                    }
                    return Ok(dict);
                }
                Err(err) => err,
            };
            failed += 1;

            if !err.is_transient() {
                debug!("Locale '{}': permanent failure, not retrying: {}", locale, err);
                return Err(err);
            }
            if failed >= self.attempts {
                warn!("Locale '{}': giving up after {} attempts: {}", locale, failed, err);
                return Err(err);
            }

            let delay = self.delay_after(failed);
            warn!(
                "Locale '{}': attempt {}/{} failed ({}), retrying in {:?}",
                locale, failed, self.attempts, err, delay
            );
            sleep(delay).await;
        }
    }
}
