//! Run lifecycle: render -> extract -> JSON sink -> image downloads.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::downloader::download_all;
use crate::error::Result;
use crate::extract::extract_records;
use crate::fetch::{HttpImageFetcher, ImageFetcher};
use crate::page::{HttpPageRenderer, PageRenderer};
use crate::types::ProductRecord;

/// Owns one snapshot run and the collaborators it needs
pub struct Orchestrator {
    config: Config,
    renderer: Arc<dyn PageRenderer>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Orchestrator {
    /// Build an orchestrator around injected collaborators
    pub fn new(
        config: Config,
        renderer: Arc<dyn PageRenderer>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            config,
            renderer,
            fetcher,
        }
    }

    /// Build an orchestrator with the reqwest-backed renderer and fetcher
    pub fn with_http(config: Config) -> Result<Self> {
        let user_agent = &config.catalog.user_agent;
        let timeout = config.catalog.request_timeout;
        let renderer = HttpPageRenderer::new(user_agent, timeout)?;
        let fetcher = HttpImageFetcher::new(user_agent, timeout)?;
        Ok(Self::new(config, Arc::new(renderer), Arc::new(fetcher)))
    }

    /// The configuration this run uses
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one snapshot
    ///
    /// The renderer is closed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Any fatal error: render failure, extraction mismatch, invalid selectors,
    /// failure to write the data file or create the image directory. Individual
    /// image failures are not errors.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            url = %self.config.catalog.url,
            renderer = self.renderer.name(),
            "Starting catalog snapshot"
        );

        let result = self.snapshot().await;
        self.renderer.close().await;

        match &result {
            Ok(()) => tracing::info!("Catalog snapshot complete"),
            Err(e) => tracing::error!(error = %e, "Catalog snapshot failed"),
        }
        result
    }

    async fn snapshot(&self) -> Result<()> {
        let catalog = &self.config.catalog;

        let html = self.renderer.render(&catalog.url).await?;
        let records = extract_records(&html, &catalog.url, &catalog.selectors)?;
        tracing::info!(count = records.len(), "Extracted product records");

        write_records(&self.config.output.data_file, &records).await?;

        download_all(
            &records,
            &self.config.output.image_dir,
            &self.config.download,
            self.fetcher.as_ref(),
        )
        .await
    }
}

/// Write `records` to `path` as a pretty-printed JSON array, replacing the file
pub async fn write_records(path: &Path, records: &[ProductRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), count = records.len(), "Product data saved");
    Ok(())
}
