//! # catalog-snap
//!
//! Snapshot an e-commerce catalog page: extract product records with CSS
//! selectors, save them as JSON, then mirror every product image to disk.
//!
//! ## Pipeline
//!
//! 1. A [`PageRenderer`] loads the catalog page
//! 2. [`extract_records`] turns it into [`ProductRecord`]s (all-or-nothing)
//! 3. The records are written to a pretty-printed JSON file
//! 4. [`download_all`] fetches the images in fixed-size batches, retrying each
//!    failed image with a fixed delay
//!
//! ## Quick Start
//!
//! ```no_run
//! use catalog_snap::{Config, Orchestrator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.catalog.url = "https://shop.example/catalog".to_string();
//!     config.download.batch_size = 20;
//!
//!     Orchestrator::with_http(config)?.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Batch image downloader
pub mod downloader;
/// Error types
pub mod error;
/// Selector-based record extraction
pub mod extract;
/// Streaming image fetcher
pub mod fetch;
/// Run lifecycle
pub mod orchestrator;
/// Page rendering
pub mod page;
/// Core record types
pub mod types;

// Re-export commonly used types
pub use config::{CatalogConfig, Config, DownloadConfig, OutputConfig, SelectorConfig};
pub use downloader::{DownloadTask, TaskEvent, TaskState, download_all};
pub use error::{Error, FetchError, RenderError, Result};
pub use extract::extract_records;
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use orchestrator::{Orchestrator, write_records};
pub use page::{HttpPageRenderer, PageRenderer};
pub use types::ProductRecord;
