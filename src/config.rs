use crate::retry::RetryPolicy;
use std::path::PathBuf;
use thiserror::Error;

/// Business filter applied after aggregation.
///
/// Only the future-only mode exists today: a listing is kept when its
/// auction date (UTC, date granularity) is today or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    FutureOnly,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,
    #[error("invalid retry backoff: {0}")]
    InvalidBackoff(String),
    #[error("data directory is not usable: {0}")]
    DataDir(String),
}

/// Run configuration for the harvest orchestrator.
///
/// Defaults mirror the production setup: 10 concurrent sources, future-only
/// filtering, exponential backoff from 2 s to 30 s over 5 attempts, output
/// under `data/` with photos in `data/photos/`.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Maximum number of sources fetching simultaneously.
    pub concurrency: usize,
    pub filter_mode: FilterMode,
    pub retry: RetryPolicy,
    /// Directory receiving `auctions.json`, `auctions.csv` and `photos/`.
    pub data_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            filter_mode: FilterMode::default(),
            retry: RetryPolicy::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl HarvestConfig {
    /// Photo cache directory, shared by all sources.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("photos")
    }

    /// Rejects configurations that would make the run meaningless before
    /// any source executes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        self.retry
            .validate()
            .map_err(|msg| ConfigError::InvalidBackoff(msg.to_string()))?;
        Ok(())
    }
}
