//! Photo cache shared by all sources.
//!
//! Destination filenames are derived from the photo URL, so concurrent
//! sources downloading the same photo converge on identical bytes at the
//! same path and no locking is needed. A download is skipped entirely when
//! the destination already exists.

use crate::net;
use crate::retry::RetryPolicy;
use crate::traits::FetchError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination and relative path for a photo URL.
///
/// The filename is the last URL segment with any query string stripped,
/// mirroring how the sources publish stable image names. The relative path
/// is what ends up in [`Listing::media_path`](crate::model::Listing), e.g.
/// `photos/lote-123.jpg`.
pub fn cache_paths(url: &str, media_dir: &Path) -> Result<(PathBuf, String), FetchError> {
    let name = url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .split('?')
        .next()
        .unwrap_or_default();
    if name.is_empty() {
        return Err(FetchError::Parse(format!("photo url has no file name: {url}")));
    }
    let dest = media_dir.join(name);
    let rel = match media_dir.file_name() {
        Some(dir) => format!("{}/{}", dir.to_string_lossy(), name),
        None => name.to_string(),
    };
    Ok((dest, rel))
}

/// Downloads `url` into the cache, returning the relative path to store on
/// the listing. Idempotent: if the destination exists the download is
/// skipped and the same path is returned.
pub async fn cache_photo(
    client: &Client,
    retry: &RetryPolicy,
    url: &str,
    media_dir: &Path,
) -> Result<String, FetchError> {
    let (dest, rel) = cache_paths(url, media_dir)?;
    if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
        debug!(path = %dest.display(), "photo already cached");
        return Ok(rel);
    }
    let bytes = net::get_bytes(client, retry, url).await?;
    tokio::fs::write(&dest, bytes).await?;
    Ok(rel)
}
