//! Batch scheduling: fixed-size groups run one after another, tasks inside a
//! group run concurrently on the calling task.

use std::path::Path;

use futures::future::join_all;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::fetch::ImageFetcher;
use crate::types::ProductRecord;

use super::task::{DownloadTask, TaskState, run_task};

/// Download the image of every record into `destination_dir`
///
/// Records are split into contiguous batches of `settings.batch_size`. A batch
/// starts only after every task of the previous batch has succeeded or been
/// abandoned. Per-image failures are retried with a fixed `settings.retry_delay`
/// and, once `settings.max_retries` attempts are spent, logged and dropped; they
/// never fail the call.
///
/// Files are named after the last path segment of their URL. Two URLs sharing
/// that segment write the same file; each download replaces it whole, so the
/// last one to finish wins.
///
/// # Errors
///
/// - [`Error::Config`] if `settings.batch_size` is zero
/// - [`Error::Io`] if `destination_dir` cannot be created
pub async fn download_all(
    records: &[ProductRecord],
    destination_dir: &Path,
    settings: &DownloadConfig,
    fetcher: &dyn ImageFetcher,
) -> Result<()> {
    if settings.batch_size == 0 {
        return Err(Error::config(
            "download.batch_size",
            "batch size must be at least 1",
        ));
    }

    tokio::fs::create_dir_all(destination_dir).await?;

    let total_batches = records.len().div_ceil(settings.batch_size);
    tracing::info!(
        images = records.len(),
        batches = total_batches,
        batch_size = settings.batch_size,
        dir = %destination_dir.display(),
        "Starting image downloads"
    );

    for (index, batch) in records.chunks(settings.batch_size).enumerate() {
        tracing::debug!(
            batch = index + 1,
            total_batches,
            size = batch.len(),
            "Batch started"
        );

        let tasks = batch
            .iter()
            .map(|record| DownloadTask::new(&record.image, destination_dir))
            .map(|task| run_task(task, fetcher, settings));
        let finished = join_all(tasks).await;

        let succeeded = finished
            .iter()
            .filter(|task| matches!(task.state, TaskState::Succeeded { .. }))
            .count();
        tracing::debug!(
            batch = index + 1,
            succeeded,
            abandoned = finished.len() - succeeded,
            "Batch finished"
        );
    }

    tracing::info!(images = records.len(), "Image downloads finished");
    Ok(())
}
