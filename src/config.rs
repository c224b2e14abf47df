// ⚙️ Scrape Configuration - Selectors, timeouts and formats as data
// Every field is optional in the JSON file; missing fields keep the defaults

use crate::error::ConfigError;
use crate::selectors::SelectorMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub selectors: SelectorMap,

    /// Storefront landing page
    pub home_url: String,

    /// Bounded wait for any page-state condition (default: 20s)
    pub wait_timeout_ms: u64,

    /// How often a bounded wait re-checks its condition (default: 250ms)
    pub poll_interval_ms: u64,

    /// chrono format of the displayed order date (default: "%B %d, %Y")
    pub date_format: String,

    /// Synthetic title given to every consolidated order
    pub consolidated_title: String,

    /// Run the browser without a window (manual login needs one)
    pub headless: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            selectors: SelectorMap::default(),
            home_url: "https://www.amazon.com".to_string(),
            wait_timeout_ms: 20_000,
            poll_interval_ms: 250,
            date_format: "%B %d, %Y".to_string(),
            consolidated_title: "groceries".to_string(),
            headless: false,
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ScrapeConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
