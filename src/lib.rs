//! # praticiens
//!
//! Collects practitioner listings from a JavaScript-rendered medical booking
//! site into a CSV table.
//!
//! ## Architecture
//!
//! ```text
//! BrowserSession → CardCollector → FieldExtractor/DetailNavigator → RowAssembler → Sink
//! ```
//!
//! - [`scraper`]: the browser tab, selector chains and the listing/detail round trip
//! - [`pipeline`]: the run loop, deduplication and the row budget
//! - [`sink`]: CSV output
//! - [`filter`]: post-run filtering of a results table
//!
//! ## Quick Start
//!
//! ```bash
//! # First 10 practitioners around Montpellier
//! praticiens scrape
//!
//! # Another place, more rows, visible browser
//! praticiens scrape --place Lyon --max-rows 25 --headed
//!
//! # Video consultations at 50 € or less
//! praticiens filter doctolib_results.csv --consultation-type visio --max-price 50
//! ```

/// Error types shared by every module.
pub mod app;

/// Command-line interface using clap.
///
/// - `scrape` - Run the browser pipeline and write the CSV
/// - `filter <csv>` - Filter a previously written CSV
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/praticiens/config.toml` (or `--config`), with
/// `[run]`, `[scraper]` and `[selectors]` sections.
pub mod config;

/// Core domain models.
///
/// - [`Record`](domain::Record): one output row
/// - [`IdentityKey`](domain::IdentityKey): (name, specialty) deduplication key
/// - [`ListingState`](domain::ListingState): which view the tab is on
pub mod domain;

/// Post-run filtering by specialty, insurance, address, consultation type
/// and fee range.
pub mod filter;

/// The run loop tying the scraper components together.
pub mod pipeline;

/// Browser automation via chromiumoxide.
///
/// - [`BrowserSession`](scraper::BrowserSession): the single tab and its state machine
/// - [`Driver`](scraper::Driver): async trait over page operations
/// - [`ChromeDriver`](scraper::ChromeDriver): Chrome-based implementation
pub mod scraper;

/// CSV persistence of assembled records.
pub mod sink;
