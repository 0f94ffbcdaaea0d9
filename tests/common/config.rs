//! Test configuration helpers

use catalog_snap::Config;
use std::path::Path;
use std::time::Duration;

/// Config pointing at `page_url`, writing everything under `dir`, with short retry delays
pub fn config_for(page_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.url = page_url.to_string();
    config.catalog.request_timeout = Some(Duration::from_secs(5));
    config.output.data_file = dir.join("productAllData.txt");
    config.output.image_dir = dir.join("images");
    config.download.retry_delay = Duration::from_millis(20);
    config
}

/// Sorted file names inside `dir` (empty if it does not exist)
pub fn files_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
