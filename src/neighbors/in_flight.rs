// Cap on simultaneous neighbor lookups.
//
// Pair-level concurrency and per-sentence token fan-out multiply, and the
// rate limiter only spaces out request starts. A semaphore permit is held for
// the whole lookup, so at most `max_in_flight` requests are open at once no
// matter how many callers are waiting.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use super::traits::{NeighborSet, NeighborSource};
use crate::error::{LookupCause, SimilarityError};

/// Decorator that bounds how many lookups run against `inner` at a time.
pub struct InFlightLimit<S> {
    inner: S,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
}

impl<S: NeighborSource> InFlightLimit<S> {
    /// `max_in_flight` of zero is treated as one.
    pub fn new(inner: S, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: NeighborSource> NeighborSource for InFlightLimit<S> {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        let _permit = self.permits.acquire().await.map_err(|_| {
            SimilarityError::lookup(term, LookupCause::Transport("lookup limiter closed".into()))
        })?;

        debug!(
            term = term,
            available = self.permits.available_permits(),
            "Acquired lookup permit"
        );

        self.inner.fetch_neighbors(term, limit).await
    }
}
