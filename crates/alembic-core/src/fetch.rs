//! Resource fetching with streaming SHA-256 verification.
//!
//! Every fetch re-verifies content against its declared digest before the
//! bytes may be referenced by any later plan step; a mismatch is always
//! fatal and removes the partial file. Independent resources fetch
//! concurrently; each is read-only and content-addressed, so no shared
//! mutable state exists between them.

use std::path::{Path, PathBuf};

use alembic_schema::Sha256Digest;
use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::paths::filename_from_url;

/// Errors produced while fetching and verifying a resource.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP transport or status failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetched content does not match the declared digest.
    #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Source URL of the mismatching content.
        url: String,
        /// Declared digest.
        expected: String,
        /// Digest of the bytes actually received.
        actual: String,
    },
}

/// A (url, digest) pair to fetch. Both source archives and patches reduce
/// to this; auxiliary resources carry one inside [`alembic_schema::Resource`].
#[derive(Debug, Clone)]
pub struct FetchItem {
    /// Download URL.
    pub url: String,
    /// Declared digest the bytes must match.
    pub sha256: Sha256Digest,
}

/// Download one item into `dest_dir`, verifying while streaming.
///
/// The file is named after the final URL segment. On digest mismatch the
/// partial file is removed and [`FetchError::HashMismatch`] returned,
/// never warn-and-continue.
///
/// # Errors
///
/// Returns [`FetchError`] on transport, filesystem, or verification
/// failure.
pub async fn fetch_verified(
    client: &Client,
    item: &FetchItem,
    dest_dir: &Path,
) -> Result<PathBuf, FetchError> {
    let dest = dest_dir.join(filename_from_url(&item.url));

    let response = client
        .get(&item.url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let mut file = File::create(&dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
    }
    file.flush().await?;

    let actual = hex::encode(hasher.finalize());
    if actual != item.sha256.as_str() {
        tokio::fs::remove_file(&dest).await.ok();
        return Err(FetchError::HashMismatch {
            url: item.url.clone(),
            expected: item.sha256.to_string(),
            actual,
        });
    }

    tracing::debug!(url = %item.url, dest = %dest.display(), "fetched and verified");
    Ok(dest)
}

/// Fetch all items concurrently into `dest_dir`.
///
/// Results come back in input order. Any single failure fails the whole
/// batch; already-written files for failed items are removed by
/// [`fetch_verified`].
///
/// # Errors
///
/// Returns the first [`FetchError`] encountered.
pub async fn fetch_all(
    client: &Client,
    items: &[FetchItem],
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, FetchError> {
    tokio::fs::create_dir_all(dest_dir).await?;
    let futures = items
        .iter()
        .map(|item| fetch_verified(client, item, dest_dir));
    futures::future::try_join_all(futures).await
}
