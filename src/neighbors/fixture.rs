// In-memory neighbor source.
//
// Answers from a fixed term -> ranked words map, so scoring can run without
// the network. Used by the test suite and by `LEXSIM_FIXTURE` for offline
// runs. Terms can be marked as failing to exercise error paths, and an
// optional delay makes each lookup yield like a real request would.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::traits::{check_query, NeighborSet, NeighborSource};
use crate::error::{LookupCause, SimilarityError};

/// Neighbor source backed by a map of ranked word lists.
#[derive(Default)]
pub struct FixtureSource {
    neighbors: HashMap<String, Vec<String>>,
    failing: HashMap<String, LookupCause>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ranked neighbors of `term`.
    pub fn with_term(mut self, term: &str, words: &[&str]) -> Self {
        self.neighbors.insert(
            term.to_string(),
            words.iter().map(|w| w.to_string()).collect(),
        );
        self
    }

    /// Make every lookup of `term` fail with `cause`.
    pub fn with_failure(mut self, term: &str, cause: LookupCause) -> Self {
        self.failing.insert(term.to_string(), cause);
        self
    }

    /// Sleep for `delay` inside every lookup before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Load a `{ "term": ["word", ...] }` JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let neighbors: HashMap<String, Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))?;
        Ok(Self {
            neighbors,
            ..Self::default()
        })
    }

    /// Number of lookups answered or failed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most lookups that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Every term with registered neighbors.
    pub fn terms(&self) -> HashSet<&str> {
        self.neighbors.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl NeighborSource for FixtureSource {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        // Decrements even when the lookup is dropped mid-sleep.
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        check_query(term, limit)?;

        if let Some(cause) = self.failing.get(term) {
            return Err(SimilarityError::lookup(term, cause.clone()));
        }

        // Unknown terms have no neighbors, like a service that knows nothing about them.
        Ok(self
            .neighbors
            .get(term)
            .map(|words| words.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
