use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {after:?} waiting for {what}")]
    NavigationTimeout { what: String, after: Duration },

    #[error("Click on {0} was intercepted")]
    ClickIntercepted(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Stale card from generation {card} (session is at {current})")]
    StaleCard { card: u64, current: u64 },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Session unrecoverable: {0}")]
    SessionFatal(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl ScrapeError {
    /// Whether the run has to stop processing further items
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::SessionFatal(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
