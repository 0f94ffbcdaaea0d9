//! Shared test helpers: a scripted in-memory image fetcher.

use crate::error::FetchError;
use crate::fetch::ImageFetcher;
use crate::types::ProductRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// What the fetcher saw, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FetchLog {
    Started(String),
    Finished(String),
}

/// Fetcher that fails each URL a scripted number of times before succeeding.
///
/// Successful fetches write the URL itself as the file body. Every fetch sleeps
/// for `latency` so tasks inside a batch genuinely overlap.
pub(crate) struct ScriptedFetcher {
    failures: HashMap<String, u32>,
    latency: Duration,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
    log: Mutex<Vec<FetchLog>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            failures: HashMap::new(),
            latency: Duration::from_millis(5),
            attempts: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Fail `url` this many times before succeeding (u32::MAX = always fail)
    pub(crate) fn failing(mut self, url: &str, times: u32) -> Self {
        self.failures.insert(url.to_string(), times);
        self
    }

    pub(crate) fn attempts(&self, url: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(url)
            .map_or(0, |v| v.len())
    }

    pub(crate) fn attempt_times(&self, url: &str) -> Vec<Instant> {
        self.attempts
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn distinct_urls(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub(crate) fn log(&self) -> Vec<FetchLog> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch_to(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let previous = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(url.to_string()).or_default();
            entry.push(Instant::now());
            entry.len() as u32 - 1
        };
        self.log
            .lock()
            .unwrap()
            .push(FetchLog::Started(url.to_string()));

        tokio::time::sleep(self.latency).await;

        let result = if previous < self.failures.get(url).copied().unwrap_or(0) {
            Err(FetchError::Other(format!("scripted failure #{}", previous + 1)))
        } else {
            tokio::fs::write(destination, url.as_bytes())
                .await
                .map(|_| url.len() as u64)
                .map_err(|source| FetchError::Write {
                    path: destination.to_path_buf(),
                    source,
                })
        };

        self.log
            .lock()
            .unwrap()
            .push(FetchLog::Finished(url.to_string()));
        result
    }
}

/// Record whose image lives at `https://<host>/img/<name>`
pub(crate) fn record_with_image(host: &str, name: &str) -> ProductRecord {
    ProductRecord::new(
        format!("Product {name}"),
        "1,000 IQD",
        "Brand",
        format!("https://{host}/img/{name}"),
    )
}
