// HTTP client for the Datamuse related-words API.
//
// Queries `/words?ml=<term>&max=<limit>` ("means like") and keeps only the
// `word` field of each returned object. Every call is a fresh request; wrap
// the client in CachedSource / RetryingSource for memoization and backoff.
//
// API docs: https://www.datamuse.com/api/

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{check_query, NeighborSet, NeighborSource};
use crate::error::{LookupCause, SimilarityError};

/// Default Datamuse endpoint.
pub const DEFAULT_API_URL: &str = "https://api.datamuse.com";

/// A single candidate from the `/words` endpoint.
///
/// Datamuse also sends `score` and sometimes `tags`; only `word` is read, and
/// the other keys are ignored whatever their type.
#[derive(Debug, Clone, Deserialize)]
pub struct DatamuseWord {
    pub word: String,
}

/// Client for the Datamuse related-words endpoint.
pub struct DatamuseClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl DatamuseClient {
    /// Create a client pointing at `base_url`.
    ///
    /// `timeout` bounds each request; expiry surfaces as `LookupCause::Timeout`.
    pub fn new(base_url: &str, timeout: Duration, requests_per_second: f64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("lexsim/0.1 (similarity-evaluation)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(requests_per_second),
        })
    }

    async fn request(&self, term: &str, limit: u32) -> Result<String, LookupCause> {
        let url = format!("{}/words", self.base_url);

        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(&url)
            .query(&[("ml", term), ("max", &limit.to_string())])
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupCause::Status(status.as_u16()));
        }

        response.text().await.map_err(classify_reqwest_error)
    }
}

#[async_trait]
impl NeighborSource for DatamuseClient {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        check_query(term, limit)?;

        let body = self
            .request(term, limit)
            .await
            .map_err(|cause| SimilarityError::lookup(term, cause))?;

        let neighbors = parse_neighbors(&body, limit)
            .map_err(|cause| SimilarityError::lookup(term, cause))?;

        debug!(term = term, limit = limit, count = neighbors.len(), "Fetched neighbors");

        Ok(neighbors)
    }
}

/// Turn a `/words` response body into a neighbor set of at most `limit` words.
pub fn parse_neighbors(body: &str, limit: u32) -> Result<NeighborSet, LookupCause> {
    let candidates: Vec<DatamuseWord> =
        serde_json::from_str(body).map_err(|e| LookupCause::Malformed(e.to_string()))?;

    Ok(candidates
        .into_iter()
        .take(limit as usize)
        .map(|candidate| candidate.word)
        .collect())
}

fn classify_reqwest_error(err: reqwest::Error) -> LookupCause {
    if err.is_timeout() {
        LookupCause::Timeout
    } else if err.is_decode() || err.is_body() {
        LookupCause::Malformed(err.to_string())
    } else {
        LookupCause::Transport(err.to_string())
    }
}
