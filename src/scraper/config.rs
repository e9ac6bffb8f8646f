use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the browser session and its waits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Deadline for the document to become interactive, and for the
    /// search field to show up, in seconds (default: 30)
    pub page_timeout_secs: u64,

    /// How long to look for the consent banner in milliseconds (default: 3000)
    pub consent_timeout_ms: u64,

    /// Deadline for the results-count indicator after submitting a search,
    /// in seconds (default: 30)
    pub search_timeout_secs: u64,

    /// Deadline for a detail profile to render after a click, in seconds (default: 10)
    pub detail_timeout_secs: u64,

    /// Deadline for the listing to come back after a back-navigation,
    /// in seconds (default: 10)
    pub back_timeout_secs: u64,

    /// Pause after issuing a back-navigation in milliseconds (default: 1000)
    pub back_settle_ms: u64,

    /// Interval between two DOM checks while waiting, in milliseconds (default: 200)
    pub poll_interval_ms: u64,

    /// Fee entries are kept only if their tag contains this text (case-insensitive)
    pub fee_tag_filter: String,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            page_timeout_secs: 30,
            consent_timeout_ms: 3000,
            search_timeout_secs: 30,
            detail_timeout_secs: 10,
            back_timeout_secs: 10,
            back_settle_ms: 1000,
            poll_interval_ms: 200,
            fee_tag_filter: "conventionné".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn back_timeout(&self) -> Duration {
        Duration::from_secs(self.back_timeout_secs)
    }

    pub fn back_settle(&self) -> Duration {
        Duration::from_millis(self.back_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
