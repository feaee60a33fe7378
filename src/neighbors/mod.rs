// Lexical neighbor lookups: trait-based abstraction over the related-words service.
//
// NeighborSource is the single query interface. DatamuseClient talks to the
// real service; FixtureSource answers from memory for tests and offline runs.
// Caching and retry are decorators that wrap any source without changing
// call sites.

pub mod cache;
pub mod datamuse;
pub mod fixture;
pub mod in_flight;
pub mod rate_limiter;
pub mod retry;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use cache::CachedSource;
use datamuse::DatamuseClient;
use fixture::FixtureSource;
use in_flight::InFlightLimit;
use retry::RetryingSource;
use traits::NeighborSource;

/// Build the neighbor source described by `config`.
///
/// Layering, inside out: fixture or HTTP client, then the in-flight cap,
/// then retry (HTTP only, when `max_retries > 0`), then the per-run cache
/// (when enabled). A lookup sleeping in retry backoff holds no permit, and a
/// retried lookup is still fetched once per key.
pub fn build_source(config: &Config) -> Result<Arc<dyn NeighborSource>> {
    let base: Arc<dyn NeighborSource> = match &config.fixture_path {
        Some(path) => {
            info!(fixture = %path.display(), "Using offline neighbor fixture");
            Arc::new(InFlightLimit::new(
                FixtureSource::from_json_file(path)?,
                config.max_in_flight,
            ))
        }
        None => {
            let client = DatamuseClient::new(
                &config.api_url,
                config.request_timeout,
                config.requests_per_second,
            )?;
            let client = InFlightLimit::new(client, config.max_in_flight);
            if config.max_retries > 0 {
                Arc::new(RetryingSource::new(client, config.max_retries))
            } else {
                Arc::new(client)
            }
        }
    };

    if config.cache_enabled {
        Ok(Arc::new(CachedSource::new(base)))
    } else {
        Ok(base)
    }
}
