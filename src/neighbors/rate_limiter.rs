// Minimum-interval rate limiter for neighbor service calls.
//
// Datamuse asks clients to stay well under its daily quota and does not
// publish a per-second limit, so we cap requests client-side. Each request
// waits until at least `interval` has passed since the previous one was let
// through. Shared across concurrent lookups via Clone (Arc inside).

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// A simple rate limiter that enforces a maximum request rate.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

struct RateLimiterInner {
    /// Minimum time between requests
    interval: Duration,
    /// When the next request may go out
    next_slot: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter that allows `requests_per_second` requests per second.
    ///
    /// A non-positive rate disables limiting.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                interval,
                next_slot: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return.
    ///
    /// Slots are reserved under the lock and slept on outside it, so
    /// concurrent callers queue up one interval apart instead of all waking
    /// at the same instant.
    pub async fn acquire(&self) {
        let wait_until = {
            let mut inner = self.inner.lock().await;
            let now = Instant::now();
            let slot = match inner.next_slot {
                Some(next) if next > now => next,
                _ => now,
            };
            inner.next_slot = Some(slot + inner.interval);
            slot
        };

        tokio::time::sleep_until(wait_until).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_allows_first_request_immediately() {
        let limiter = RateLimiter::new(1.0);
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_delays_second_request() {
        let limiter = RateLimiter::new(2.0); // 500ms between requests
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(400),
            "Expected ~500ms delay, got {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_queues_concurrent_callers() {
        let limiter = RateLimiter::new(10.0); // 100ms between requests
        let start = Instant::now();
        futures::future::join_all((0..4).map(|_| limiter.acquire())).await;
        // Slots at 0, 100, 200, 300ms
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_zero_rate_disables_limiting() {
        let limiter = RateLimiter::new(0.0);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
