//! Streaming image fetch collaborator

use crate::error::{FetchError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique sibling of `destination` that an in-flight attempt streams into
fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed);
    destination.with_file_name(format!(".{name}.{}-{seq}.part", std::process::id()))
}

/// Fetches one URL into one local file
///
/// A successful call leaves the complete body at `destination`, replacing any
/// file already there as a whole. A failed call must not leave a partial file
/// behind and must not touch `destination`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` to `destination`, returning the number of bytes written
    async fn fetch_to(
        &self,
        url: &str,
        destination: &Path,
    ) -> std::result::Result<u64, FetchError>;
}

/// [`ImageFetcher`] backed by a `reqwest` byte stream
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Build a fetcher with the given User-Agent and optional per-request timeout
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    async fn stream_to_file(
        response: reqwest::Response,
        path: &Path,
    ) -> std::result::Result<u64, FetchError> {
        let write_err = |source| FetchError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(write_err)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::Stream)?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;
        Ok(written)
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_to(
        &self,
        url: &str,
        destination: &Path,
    ) -> std::result::Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        // Stream into a private sibling, then rename over the destination so
        // concurrent writers of the same name replace whole files only
        let partial = partial_path(destination);
        let result = match Self::stream_to_file(response, &partial).await {
            Ok(written) => tokio::fs::rename(&partial, destination)
                .await
                .map(|()| written)
                .map_err(|source| FetchError::Write {
                    path: destination.to_path_buf(),
                    source,
                }),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(rm) = tokio::fs::remove_file(&partial).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(
                        path = %partial.display(),
                        error = %rm,
                        "Failed to remove partial file"
                    );
                }
            }
        }
        result
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn writes_full_body_to_destination() {
        let mock_server = MockServer::start().await;
        let body: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
        Mock::given(method("GET"))
            .and(path("/img/cat.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cat.jpg");
        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();

        let written = fetcher
            .fetch_to(&format!("{}/img/cat.jpg", mock_server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.png");
        std::fs::write(&dest, b"old contents that are longer").unwrap();

        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();
        fetcher
            .fetch_to(&format!("{}/a.png", mock_server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn http_error_status_writes_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.jpg");
        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();

        let err = fetcher
            .fetch_to(&format!("{}/missing.jpg", mock_server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn failed_status_keeps_existing_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("keep.jpg");
        std::fs::write(&dest, b"previous run").unwrap();
        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();

        fetcher
            .fetch_to(&format!("{}/keep.jpg", mock_server.uri()), &dest)
            .await
            .unwrap_err();

        assert_eq!(std::fs::read(&dest).unwrap(), b"previous run");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_of_one_name_leave_a_whole_file() {
        let mock_server = MockServer::start().await;
        let large = vec![0xAAu8; 8 * 1024 * 1024];
        let small = vec![0xBBu8; 1024];
        Mock::given(method("GET"))
            .and(path("/a/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(large.clone()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b/logo.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(small.clone())
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("logo.png");
        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();
        let url_a = format!("{}/a/logo.png", mock_server.uri());
        let url_b = format!("{}/b/logo.png", mock_server.uri());

        let (a, b) = tokio::join!(
            fetcher.fetch_to(&url_a, &dest),
            fetcher.fetch_to(&url_b, &dest)
        );
        a.unwrap();
        b.unwrap();

        let body = std::fs::read(&dest).unwrap();
        assert!(body == large || body == small, "file mixes both downloads");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unwritable_destination_is_write_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no-such-dir").join("x.jpg");
        let fetcher = HttpImageFetcher::new("snap-test", None).unwrap();

        let err = fetcher
            .fetch_to(&format!("{}/x.jpg", mock_server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Write { .. }));
    }
}
