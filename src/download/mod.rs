use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Downloads a file from a URL to `dest_path` with retry support.
#[tracing::instrument(skip(runtime, dest_path, http_client))]
pub async fn download_file<R: Runtime>(
    runtime: &R,
    url: &str,
    dest_path: &Path,
    http_client: &HttpClient,
) -> Result<u64> {
    info!("Downloading file from {}...", url);

    let bytes = http_client
        .download_file(url, || {
            runtime
                .create_file(dest_path)
                .with_context(|| format!("Failed to create file at {:?}", dest_path))
        })
        .await
        .with_context(|| format!("Error fetching release from {}", url))?;

    info!("Download complete.");
    Ok(bytes)
}
