//! Stock fragment download over HTTP.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Download a stock fragment to `dest`, streaming the body to disk.
///
/// The shared `client` is constructed once at startup and injected. A
/// zero-byte body is treated as a failed download; a partial file left by
/// an aborted transfer is removed before the error is returned.
pub async fn download_fragment(
    client: &reqwest::Client,
    url: &str,
    dest: impl AsRef<Path>,
) -> MediaResult<()> {
    let dest = dest.as_ref();

    debug!("Downloading fragment {} -> {}", url, dest.display());

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("request failed: {e}")))?
        .error_for_status()
        .map_err(|e| MediaError::download_failed(format!("bad status: {e}")))?;

    if let Some(parent) = dest.parent() {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;

    let mut response = response;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            Ok(None) => break,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(MediaError::download_failed(format!(
                    "transfer aborted after {written} bytes: {e}"
                )));
            }
        }
    }

    file.flush().await?;

    if written == 0 {
        let _ = tokio::fs::remove_file(dest).await;
        return Err(MediaError::download_failed("empty response body"));
    }

    info!("Downloaded {} bytes to {}", written, dest.display());
    Ok(())
}
