// Exponential backoff for transient lookup failures.
//
// Wraps any NeighborSource. Timeouts, connection errors, 429 and 5xx
// responses are retried up to `max_retries` times with jittered exponential
// delays. Everything else (malformed bodies, empty terms, 4xx) goes straight
// back to the caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::traits::{NeighborSet, NeighborSource};
use crate::error::SimilarityError;

/// Base delay for exponential backoff (doubles each retry).
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Maximum backoff delay to cap exponential growth.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retrying decorator around another source.
pub struct RetryingSource<S> {
    inner: S,
    max_retries: u32,
}

impl<S: NeighborSource> RetryingSource<S> {
    pub fn new(inner: S, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: NeighborSource> NeighborSource for RetryingSource<S> {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        let mut attempt = 0u32;

        loop {
            match self.inner.fetch_neighbors(term, limit).await {
                Ok(neighbors) => return Ok(neighbors),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.max_retries {
                        return Err(err);
                    }

                    attempt += 1;
                    let delay = backoff_delay(attempt);

                    warn!(
                        term = term,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        backoff_secs = delay.as_secs_f64(),
                        error = %err,
                        "Lookup failed, retrying in {:.1}s",
                        delay.as_secs_f64(),
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Backoff for the given retry attempt (1-based): base * 2^(attempt-1),
/// capped, then jittered by +/- 25%.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let backoff = BASE_BACKOFF.saturating_mul(1u32 << exp).min(MAX_BACKOFF);

    // Sub-second clock noise is enough spread to avoid lockstep retries.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let jitter_factor = 0.75 + (nanos % 500) as f64 / 1000.0; // 0.75 to 1.25
    Duration::from_secs_f64(backoff.as_secs_f64() * jitter_factor)
}
