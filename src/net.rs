//! Shared HTTP plumbing for source adapters.

use crate::retry::{retry_fetch, RetryPolicy};
use crate::traits::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Identifies the harvester to the scraped sites.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; LeilaoBot/1.0)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the client shared by all sources: bot User-Agent, 60 s timeout.
pub fn build_client() -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(FetchError::from)
}

/// GET the body of `url` as text, retrying transient failures.
/// Non-2xx statuses count as transient, the same as transport errors.
pub async fn get_text(client: &Client, retry: &RetryPolicy, url: &str) -> Result<String, FetchError> {
    retry_fetch(retry, || async {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    })
    .await
}

/// GET the body of `url` as raw bytes, retrying transient failures.
pub async fn get_bytes(
    client: &Client,
    retry: &RetryPolicy,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    retry_fetch(retry, || async {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    })
    .await
}
