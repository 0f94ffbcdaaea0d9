//! Batch image downloader
//!
//! Split into focused submodules:
//! - [`task`] - Per-image state machine and its async driver
//! - [`batch`] - Sequential batches with full concurrency inside each batch

mod batch;
pub mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use batch::download_all;
pub use task::{DownloadTask, TaskEvent, TaskState, file_name_from_url};
