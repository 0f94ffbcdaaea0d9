//! Per-image download task: tagged state, pure transitions, and the async
//! driver that performs fetches and retry sleeps between them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::config::DownloadConfig;
use crate::fetch::ImageFetcher;

/// Lifecycle of one image download
///
/// `Pending -> Attempting -> {Succeeded | Pending(retries + 1) | Abandoned}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for its next attempt; `retries` failed attempts so far
    Pending {
        /// Failed attempts so far
        retries: u32,
    },
    /// A fetch is in flight
    Attempting {
        /// Failed attempts before this one
        retries: u32,
    },
    /// Image written to its destination
    Succeeded {
        /// Bytes written
        bytes: u64,
        /// Total attempts, including the successful one
        attempts: u32,
    },
    /// Retries exhausted, or the URL had nowhere to go
    Abandoned {
        /// Fetch attempts made (0 if the task never had a destination)
        attempts: u32,
        /// Last failure
        reason: String,
    },
}

/// Input to [`TaskState::advance`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskEvent {
    /// Begin an attempt
    Start,
    /// The fetch completed
    Fetched {
        /// Bytes written
        bytes: u64,
    },
    /// The fetch failed
    Failed {
        /// Error description
        reason: String,
    },
    /// No destination could be derived from the URL
    Unroutable {
        /// Why the URL was rejected
        reason: String,
    },
}

impl TaskState {
    /// Initial state of every task
    pub fn new() -> Self {
        TaskState::Pending { retries: 0 }
    }

    /// Apply `event`, returning the next state
    ///
    /// A failure moves back to `Pending` only while the failure count stays below
    /// `max_retries`. Events that make no sense for the current state leave it
    /// unchanged.
    pub fn advance(self, event: TaskEvent, max_retries: u32) -> TaskState {
        match (self, event) {
            (TaskState::Pending { retries }, TaskEvent::Start) => {
                TaskState::Attempting { retries }
            }
            (TaskState::Pending { retries }, TaskEvent::Unroutable { reason }) => {
                TaskState::Abandoned {
                    attempts: retries,
                    reason,
                }
            }
            (TaskState::Attempting { retries }, TaskEvent::Fetched { bytes }) => {
                TaskState::Succeeded {
                    bytes,
                    attempts: retries + 1,
                }
            }
            (TaskState::Attempting { retries }, TaskEvent::Failed { reason }) => {
                let retries = retries + 1;
                if retries < max_retries {
                    TaskState::Pending { retries }
                } else {
                    TaskState::Abandoned {
                        attempts: retries,
                        reason,
                    }
                }
            }
            (state, _) => state,
        }
    }

    /// Whether the task is finished (succeeded or abandoned)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded { .. } | TaskState::Abandoned { .. }
        )
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::new()
    }
}

/// One image to download
#[derive(Clone, Debug)]
pub struct DownloadTask {
    /// Source URL
    pub url: String,
    /// `destination_dir/<last path segment>`, or None if the URL has no usable segment
    pub destination: Option<PathBuf>,
    /// Current state
    pub state: TaskState,
}

impl DownloadTask {
    /// Derive a task from an image URL
    pub fn new(url: &str, destination_dir: &Path) -> Self {
        Self {
            url: url.to_string(),
            destination: file_name_from_url(url).map(|name| destination_dir.join(name)),
            state: TaskState::new(),
        }
    }
}

/// Final path segment of `url`, as it appears in the URL (no decoding, no sanitizing)
///
/// Returns None for unparsable URLs and for paths ending in `/`.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

/// Wait owed before the attempt that follows `next`; `None` once no attempt follows
fn delay_before_next_attempt(next: &TaskState, settings: &DownloadConfig) -> Option<Duration> {
    match next {
        TaskState::Pending { retries } if *retries > 0 => Some(settings.retry_delay),
        _ => None,
    }
}

/// Drive `task` to a terminal state
///
/// Fetch failures never escape; they end up in [`TaskState::Abandoned`] and a
/// warning.
pub(crate) async fn run_task(
    mut task: DownloadTask,
    fetcher: &dyn ImageFetcher,
    settings: &DownloadConfig,
) -> DownloadTask {
    let max_retries = settings.max_retries;

    let Some(destination) = task.destination.clone() else {
        let reason = format!("no file name in image URL '{}'", task.url);
        task.state = task
            .state
            .advance(TaskEvent::Unroutable { reason }, max_retries);
        tracing::warn!(url = %task.url, "Image skipped: URL has no final path segment");
        return task;
    };

    loop {
        task.state = match task.state {
            TaskState::Pending { retries } => {
                if let Some(delay) = delay_before_next_attempt(&TaskState::Pending { retries }, settings) {
                    tokio::time::sleep(delay).await;
                }
                TaskState::Pending { retries }.advance(TaskEvent::Start, max_retries)
            }
            TaskState::Attempting { retries } => {
                match fetcher.fetch_to(&task.url, &destination).await {
                    Ok(bytes) => TaskState::Attempting { retries }
                        .advance(TaskEvent::Fetched { bytes }, max_retries),
                    Err(e) => {
                        let reason = e.to_string();
                        let next = TaskState::Attempting { retries }
                            .advance(TaskEvent::Failed { reason }, max_retries);
                        match delay_before_next_attempt(&next, settings) {
                            Some(delay) => tracing::warn!(
                                url = %task.url,
                                error = %e,
                                attempt = retries + 1,
                                max_attempts = max_retries,
                                delay_ms = delay.as_millis() as u64,
                                "Image download attempt failed, retrying"
                            ),
                            None => tracing::warn!(
                                url = %task.url,
                                error = %e,
                                attempt = retries + 1,
                                max_attempts = max_retries,
                                "Image download attempt failed"
                            ),
                        }
                        next
                    }
                }
            }
            TaskState::Succeeded { .. } | TaskState::Abandoned { .. } => break,
        };
    }

    match &task.state {
        TaskState::Succeeded { bytes, attempts } => {
            tracing::info!(
                url = %task.url,
                path = %destination.display(),
                bytes,
                attempts,
                "Image downloaded"
            );
        }
        TaskState::Abandoned { attempts, reason } => {
            tracing::warn!(
                url = %task.url,
                attempts,
                error = %reason,
                "Image download abandoned after all attempts"
            );
        }
        _ => {}
    }

    task
}
