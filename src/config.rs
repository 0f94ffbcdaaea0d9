//! Configuration types for catalog-snap

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Top-level configuration
///
/// Every field has a default, so an empty JSON object is a valid config file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the catalog lives and how to read it
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Where results are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Image download batching and retry
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Catalog page location and extraction selectors
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog listing page URL
    #[serde(default = "default_catalog_url")]
    pub url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in milliseconds (None = no timeout)
    #[serde(default, with = "optional_duration_millis")]
    pub request_timeout: Option<Duration>,

    /// CSS selectors for the four record fields
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            user_agent: default_user_agent(),
            request_timeout: None,
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors, one per record field
///
/// The four selectors must match the same number of elements on the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Product title elements (text content)
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Price elements (text content)
    #[serde(default = "default_price_selector")]
    pub price: String,

    /// Brand elements (text content)
    #[serde(default = "default_brand_selector")]
    pub brand: String,

    /// Image elements
    #[serde(default = "default_image_selector")]
    pub image: String,

    /// Attribute on the image element that carries the URL (lazy-loaded pages use `data-src`)
    #[serde(default = "default_image_attribute")]
    pub image_attribute: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: default_title_selector(),
            price: default_price_selector(),
            brand: default_brand_selector(),
            image: default_image_selector(),
            image_attribute: default_image_attribute(),
        }
    }
}

/// Output locations, relative to the working directory unless absolute
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON data file (default: "productAllData.txt")
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Image directory (default: "images")
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            image_dir: default_image_dir(),
        }
    }
}

/// Image download batching and retry settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Records per batch; all downloads of a batch run concurrently (default: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum attempts per image (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed wait between attempts, in milliseconds (default: 2000)
    #[serde(default = "default_retry_delay", with = "duration_millis")]
    pub retry_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Config {
    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `path` if it exists, otherwise fall back to the defaults
    ///
    /// Either way the returned config has passed [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!(path = %path.display(), "Loading configuration");
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.catalog.url.trim().is_empty() {
            return Err(Error::config("catalog.url", "catalog URL is empty"));
        }
        if let Err(e) = url::Url::parse(&self.catalog.url) {
            return Err(Error::config(
                "catalog.url",
                format!("invalid catalog URL '{}': {}", self.catalog.url, e),
            ));
        }
        if self.download.batch_size == 0 {
            return Err(Error::config(
                "download.batch_size",
                "batch size must be at least 1",
            ));
        }
        if self.download.max_retries == 0 {
            return Err(Error::config(
                "download.max_retries",
                "max retries must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_catalog_url() -> String {
    "https://www.storeexpress.iq/pet/shop?ps=59".to_string()
}

fn default_user_agent() -> String {
    concat!("catalog-snap/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_title_selector() -> String {
    "a.listProductName".to_string()
}

fn default_price_selector() -> String {
    "div.currentPrice".to_string()
}

fn default_brand_selector() -> String {
    "a.listProductBrand".to_string()
}

fn default_image_selector() -> String {
    "img.stImage".to_string()
}

fn default_image_attribute() -> String {
    "data-src".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("productAllData.txt")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_batch_size() -> usize {
    50
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(2000)
}

// Duration serialization helper (integer milliseconds)
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper
mod optional_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
