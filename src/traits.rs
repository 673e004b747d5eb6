use crate::model::Listing;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or transport failure. Retried with backoff until the
    /// attempt budget is exhausted.
    #[error("transient network failure: {0}")]
    Transient(String),
    /// Response did not match the expected structure. Never retried.
    #[error("malformed response: {0}")]
    Parse(String),
    /// The run was cancelled while this source was in flight.
    #[error("fetch cancelled")]
    Cancelled,
    /// The source's unit of work aborted (e.g., panicked).
    #[error("source task failed: {0}")]
    Task(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Only transport failures are worth retrying; parse errors fail the
    /// same way on every attempt and would burn the whole backoff budget.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transient(err.to_string())
    }
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Registry identifier for this source (e.g., "zukerman", "tjpi").
    /// Names starting with '_' are reserved for template placeholders and
    /// are skipped at discovery time.
    fn name(&self) -> &str;

    /// Whether the source has its endpoints filled in. Template sources
    /// report `false` and are skipped at discovery time with a warning.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetches all current listings from the source. Photos are cached
    /// under `media_dir`; the returned listings reference them by relative
    /// path.
    async fn fetch(&self, media_dir: &Path) -> Result<Vec<Listing>, FetchError>;
}
