//! Browser-driven extraction of practitioner cards.
//!
//! This module drives one browser tab through a JavaScript-rendered search
//! listing, reads each result card, visits its profile for fee information
//! and comes back to the listing.
//!
//! # Architecture
//!
//! ```text
//! BrowserSession → CardCollector → FieldExtractor ─┐
//!                        ↑                          ├→ RowAssembler
//!                        └──── DetailNavigator ─────┘
//! ```
//!
//! Every component talks to the page through the [`Driver`] trait, so the
//! state machine can be exercised without a real browser.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use praticiens::scraper::{BrowserSession, ChromeDriver, ScraperConfig, Selectors};
//!
//! let config = ScraperConfig::default();
//! let driver = ChromeDriver::launch(&config).await?;
//! let mut session = BrowserSession::new(driver, config, Arc::new(Selectors::default()));
//!
//! session.open("https://www.doctolib.fr/").await?;
//! session.dismiss_consent_if_present().await;
//! session.submit_location_query("Montpellier").await?;
//! ```

mod cards;
mod chrome;
mod config;
mod detail;
mod extractor;
mod script;
mod selectors;
mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use cards::{Card, CardCollector};
pub use chrome::ChromeDriver;
pub use config::ScraperConfig;
pub use detail::{DetailNavigator, DetailVisit, FeePolicy};
pub use extractor::{FieldExtractor, ListingFields};
pub use selectors::{Extraction, FeeSelectors, SelectorChain, Selectors};
pub use session::BrowserSession;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

/// How a click is delivered to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    /// A real pointer click at the element's center. Fails with
    /// `ClickIntercepted` when another element covers that point.
    Interactive,
    /// `element.click()` dispatched from script, ignoring overlays
    Forced,
}

/// One label/tag pair read from a profile's fee section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeeRow {
    pub label: String,
    pub tag: String,
}

/// Low-level page operations the extraction components are built on.
///
/// Document-level methods query the whole current page; the `*_within`
/// methods are scoped to a node previously returned by [`Driver::find_all`].
/// Nodes become invalid after any navigation.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opaque reference to a DOM node
    type Node: Send + Sync;

    /// Navigate the tab to `url`
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> Result<String>;

    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Trimmed inner text of the first match, if any
    async fn text(&self, selector: &str) -> Result<Option<String>>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Replace the value of an input with `value`, as typed keystrokes
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    async fn input_value(&self, selector: &str) -> Result<Option<String>>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// Inner texts of every match of `selector` below `node`, in document order
    async fn texts_within(&self, node: &Self::Node, selector: &str) -> Result<Vec<String>>;

    async fn exists_within(&self, node: &Self::Node, selector: &str) -> Result<bool>;

    async fn scroll_into_view(&self, node: &Self::Node, selector: &str) -> Result<()>;

    async fn click_within(&self, node: &Self::Node, selector: &str, mode: ClickMode)
        -> Result<()>;

    /// Every fee row of the current profile page
    async fn fee_rows(&self, selectors: &FeeSelectors) -> Result<Vec<FeeRow>>;

    /// `history.back()`
    async fn go_back(&self) -> Result<()>;

    /// Release the browser. Further calls are invalid.
    async fn close(&mut self) -> Result<()>;
}
