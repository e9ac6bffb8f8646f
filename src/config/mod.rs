//! Configuration management for praticiens.
//!
//! Configuration is read from `~/.config/praticiens/config.toml` unless a path
//! is given on the command line. If the file doesn't exist, a default
//! configuration with comments is created.

pub mod run;

pub use run::RunConfig;

use crate::scraper::{ScraperConfig, Selectors};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub scraper: ScraperConfig,
    pub selectors: Selectors,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/praticiens/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("praticiens").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# praticiens configuration
#
# Every key is optional; anything left out uses the built-in default.
# Command-line flags override the values below.

[run]
# Site home page holding the search bar
url = "https://www.doctolib.fr/"

# Location typed into the search bar
place = "Montpellier"

# Maximum number of practitioners written per run
max_rows = 10

# CSV output file
output = "doctolib_results.csv"

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Document ready and search field deadline in seconds
page_timeout_secs = 30

# How long to look for the cookie consent banner (milliseconds)
consent_timeout_ms = 3000

# Deadline for search results after submitting, in seconds
search_timeout_secs = 30

# Deadline for a profile page to render after clicking a card, in seconds
detail_timeout_secs = 10

# Deadline for the listing to come back after going back, in seconds
back_timeout_secs = 10

# Pause after going back before checking the listing (milliseconds)
back_settle_ms = 1000

# Interval between two page checks while waiting (milliseconds)
poll_interval_ms = 200

# Fee entries are kept only if their tag contains this text (case-insensitive)
fee_tag_filter = "conventionné"

# Selectors follow the site's markup and can be overridden when it changes.
# Per-field chains are tried in order; the first non-blank match wins.
#
# [selectors]
# card = ".dl-card-content"
# profile = "#main-content .dl-profile-wrapper"
#
# [selectors.address]
# selectors = ["[data-test='doctor-card-address']", "address"]
#
# [selectors.availability]
# selectors = [".availabilities-slot"]
# join = " | "
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
