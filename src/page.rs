//! Page rendering collaborator
//!
//! The orchestrator never talks to a browser or HTTP client directly; it asks a
//! [`PageRenderer`] for the document and releases it when the run ends.

use crate::error::{RenderError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Source of rendered catalog pages
///
/// Implementations may hold an expensive resource (a browser process, a pooled
/// connection); [`close`](PageRenderer::close) is called exactly once per run,
/// on success and failure paths alike.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url` and return its document as HTML text
    async fn render(&self, url: &str) -> std::result::Result<String, RenderError>;

    /// Release whatever the renderer holds
    async fn close(&self);

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Renderer that returns the served HTML as-is
///
/// No script execution; pages that build their listing client-side need a
/// browser-backed [`PageRenderer`] instead.
pub struct HttpPageRenderer {
    client: reqwest::Client,
}

impl HttpPageRenderer {
    /// Build a renderer with the given User-Agent and optional per-request timeout
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> std::result::Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RenderError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| RenderError::Body {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(url, bytes = body.len(), "Page rendered");
        Ok(body)
    }

    async fn close(&self) {
        tracing::debug!("HTTP page renderer released");
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
