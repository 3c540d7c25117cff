//! Streaming file download with a size cap.
//!
//! Bytes are written to a `.part` temp file next to the destination and
//! renamed into place only on success, so a failed or aborted download
//! never leaves a partial file at the destination path.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Temp path used while a transfer to `dest` is in flight.
///
/// Exposed so callers that abort an in-flight transfer (dropping the
/// future) can sweep the leftover temp file.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download `url` to `dest`, enforcing `max_bytes` mid-stream.
///
/// Returns the final file size. Exceeding the cap aborts the transfer
/// and surfaces as a `ConstraintViolation` since a bigger retry budget
/// would not help.
pub async fn download_to_file(
    http: &reqwest::Client,
    url: &str,
    dest: &Path,
    max_bytes: Option<u64>,
) -> ProviderResult<u64> {
    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ProviderError::download_failed(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    // Reject early when the server already tells us the size.
    if let (Some(max), Some(len)) = (max_bytes, response.content_length()) {
        if len > max {
            return Err(ProviderError::constraint(format!(
                "content length {} exceeds limit {}",
                len, max
            )));
        }
    }

    let tmp = partial_path(dest);
    let result = write_stream(response, &tmp, max_bytes).await;

    match result {
        Ok(written) => {
            tokio::fs::rename(&tmp, dest).await?;
            info!(
                dest = %dest.display(),
                size_bytes = written,
                "Download complete"
            );
            Ok(written)
        }
        Err(e) => {
            // Discard the partial file; callers must never observe one.
            tokio::fs::remove_file(&tmp).await.ok();
            debug!(dest = %dest.display(), error = %e, "Removed partial download");
            Err(e)
        }
    }
}

async fn write_stream(
    response: reqwest::Response,
    tmp: &Path,
    max_bytes: Option<u64>,
) -> ProviderResult<u64> {
    let mut file = tokio::fs::File::create(tmp).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if let Some(max) = max_bytes {
            if written > max {
                return Err(ProviderError::constraint(format!(
                    "download exceeded size limit of {} bytes",
                    max
                )));
            }
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 256]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let http = reqwest::Client::new();

        let size = download_to_file(&http, &format!("{}/file.bin", server.uri()), &dest, None)
            .await
            .unwrap();
        assert_eq!(size, 256);
        assert!(dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_size_cap_leaves_no_partial_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let http = reqwest::Client::new();

        let err = download_to_file(
            &http,
            &format!("{}/big.bin", server.uri()),
            &dest,
            Some(1024),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::ConstraintViolation(_)));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.bin"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let http = reqwest::Client::new();

        let err = download_to_file(&http, &format!("{}/missing.bin", server.uri()), &dest, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DownloadFailed(_)));
        assert!(!dest.exists());
    }
}
