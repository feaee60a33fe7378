use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::neighbors::datamuse::DEFAULT_API_URL;
use crate::similarity::pipeline::{PipelineLimits, DEFAULT_SENTENCE_LIMIT, DEFAULT_WORD_LIMIT};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every setting has a
/// default; a variable that is set but unparseable is an error rather than
/// a silent fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the related-words service
    pub api_url: String,
    /// Neighbor limit for word-pair scoring
    pub word_limit: u32,
    /// Neighbor limit per token for sentence bags
    pub sentence_limit: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Retries for transient lookup failures (0 disables retrying)
    pub max_retries: u32,
    /// Client-side cap on requests per second (0 disables the cap)
    pub requests_per_second: f64,
    /// Pairs scored concurrently during a dataset run
    pub concurrency: usize,
    /// Neighbor lookups open at the same time, across all pairs and tokens
    pub max_in_flight: usize,
    /// Memoize lookups for the duration of one run
    pub cache_enabled: bool,
    /// Location of the stored result table
    pub results_path: PathBuf,
    /// Offline neighbor fixture; replaces the HTTP service when set
    pub fixture_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            word_limit: DEFAULT_WORD_LIMIT,
            sentence_limit: DEFAULT_SENTENCE_LIMIT,
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            requests_per_second: 10.0,
            concurrency: 4,
            max_in_flight: 8,
            cache_enabled: true,
            results_path: PathBuf::from("data/results.json"),
            fixture_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            api_url: lookup("LEXSIM_API_URL").unwrap_or(defaults.api_url),
            word_limit: parse_var(&lookup, "LEXSIM_WORD_LIMIT")?.unwrap_or(defaults.word_limit),
            sentence_limit: parse_var(&lookup, "LEXSIM_SENTENCE_LIMIT")?
                .unwrap_or(defaults.sentence_limit),
            request_timeout: parse_var(&lookup, "LEXSIM_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_retries: parse_var(&lookup, "LEXSIM_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            requests_per_second: parse_var(&lookup, "LEXSIM_REQUESTS_PER_SECOND")?
                .unwrap_or(defaults.requests_per_second),
            concurrency: parse_var(&lookup, "LEXSIM_CONCURRENCY")?.unwrap_or(defaults.concurrency),
            max_in_flight: parse_var(&lookup, "LEXSIM_MAX_IN_FLIGHT")?
                .unwrap_or(defaults.max_in_flight),
            cache_enabled: parse_var(&lookup, "LEXSIM_CACHE")?.unwrap_or(defaults.cache_enabled),
            results_path: lookup("LEXSIM_RESULTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_path),
            fixture_path: lookup("LEXSIM_FIXTURE")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the values that would make lookups or scoring meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.word_limit == 0 {
            anyhow::bail!("LEXSIM_WORD_LIMIT must be greater than zero");
        }
        if self.sentence_limit == 0 {
            anyhow::bail!("LEXSIM_SENTENCE_LIMIT must be greater than zero");
        }
        if self.request_timeout.is_zero() {
            anyhow::bail!("LEXSIM_TIMEOUT_SECS must be greater than zero");
        }
        if self.concurrency == 0 {
            anyhow::bail!("LEXSIM_CONCURRENCY must be greater than zero");
        }
        if self.max_in_flight == 0 {
            anyhow::bail!("LEXSIM_MAX_IN_FLIGHT must be greater than zero");
        }
        if !self.requests_per_second.is_finite() || self.requests_per_second < 0.0 {
            anyhow::bail!("LEXSIM_REQUESTS_PER_SECOND must be a non-negative number");
        }
        if self.fixture_path.is_none() && self.api_url.trim().is_empty() {
            anyhow::bail!("LEXSIM_API_URL is empty and no LEXSIM_FIXTURE is set");
        }
        Ok(())
    }

    /// Neighbor limits for the scoring pipeline.
    pub fn limits(&self) -> PipelineLimits {
        PipelineLimits {
            word_limit: self.word_limit,
            sentence_limit: self.sentence_limit,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key}='{raw}' is not valid")),
    }
}
