//! Error types for catalog-snap
//!
//! Two families live here:
//! - [`Error`], the fatal errors that unwind to the orchestrator and end the run
//! - [`FetchError`], the per-image failures that the batch downloader retries
//!   and finally swallows into a log line

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalog-snap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog-snap
///
/// Every variant is fatal for a run: the orchestrator releases the page renderer
/// and hands the error back to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.batch_size")
        key: Option<String>,
    },

    /// The catalog page could not be loaded
    #[error("render failure: {0}")]
    Render(#[from] RenderError),

    /// The four selector result-sets have different lengths
    #[error(
        "mismatched data: {titles} titles, {prices} prices, {brands} brands, {images} images"
    )]
    ExtractionMismatch {
        /// Number of title elements matched
        titles: usize,
        /// Number of price elements matched
        prices: usize,
        /// Number of brand elements matched
        brands: usize,
        /// Number of image elements matched
        images: usize,
    },

    /// HTTP client could not be constructed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error pointing at a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Reasons a catalog page could not be rendered
#[derive(Debug, Error)]
pub enum RenderError {
    /// The HTTP request itself failed (DNS, connect, timeout, TLS)
    #[error("request to {url} failed: {source}")]
    Request {
        /// The page URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status {
        /// The page URL
        url: String,
        /// Status code returned by the server
        status: reqwest::StatusCode,
    },

    /// The response body could not be read
    #[error("failed to read body of {url}: {source}")]
    Body {
        /// The page URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },
}

/// Per-task image fetch failure
///
/// Never propagated out of the batch downloader.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request failed before a response arrived
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: reqwest::StatusCode,
    },

    /// The body stream broke off mid-transfer
    #[error("stream error: {0}")]
    Stream(#[source] reqwest::Error),

    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a non-HTTP fetcher implementation
    #[error("{0}")]
    Other(String),
}
