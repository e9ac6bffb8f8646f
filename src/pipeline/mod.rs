//! Pipeline driver: session → cards → fields/fees → assembled rows.
//!
//! Items are processed one at a time on the single tab. After every
//! profile round trip the card list is re-collected and the next item is
//! picked by identity key, never by position, since a re-render may reorder
//! the listing.

mod assembler;

pub use assembler::{AddOutcome, RowAssembler, RunBudget, DEFAULT_MAX_ROWS};

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::app::{Result, ScrapeError};
use crate::config::Config;
use crate::domain::{IdentityKey, Record};
use crate::scraper::{
    BrowserSession, CardCollector, DetailNavigator, Driver, FeePolicy, FieldExtractor,
};

/// What a run produced
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<Record>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the run stopped early; `records` still holds what was
    /// assembled before
    pub error: Option<ScrapeError>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct Pipeline<D: Driver> {
    session: BrowserSession<D>,
    collector: CardCollector,
    extractor: FieldExtractor,
    navigator: DetailNavigator,
    url: String,
    place: String,
    budget: RunBudget,
}

impl<D: Driver> Pipeline<D> {
    pub fn new(driver: D, config: &Config) -> Self {
        let selectors = Arc::new(config.selectors.clone());
        let policy = FeePolicy::new(config.scraper.fee_tag_filter.clone());

        Self {
            session: BrowserSession::new(driver, config.scraper.clone(), selectors.clone()),
            collector: CardCollector::new(selectors.card.clone()),
            extractor: FieldExtractor::new(selectors.clone()),
            navigator: DetailNavigator::new(selectors, policy),
            url: config.run.url.clone(),
            place: config.run.place.clone(),
            budget: RunBudget::new(config.run.max_rows),
        }
    }

    pub fn session(&self) -> &BrowserSession<D> {
        &self.session
    }

    /// Run to completion or to the first fatal error, then close the browser.
    pub async fn run(&mut self) -> RunReport {
        let started_at = Utc::now();
        let mut assembler = RowAssembler::new(self.budget);

        let outcome = self.drive(&mut assembler).await;

        if let Err(e) = self.session.close().await {
            warn!("Failed to close browser: {}", e);
        }

        match &outcome {
            Ok(()) => info!(records = assembler.len(), "Run complete"),
            Err(e) => error!(records = assembler.len(), "Run aborted: {}", e),
        }

        RunReport {
            records: assembler.into_records(),
            started_at,
            finished_at: Utc::now(),
            error: outcome.err(),
        }
    }

    async fn drive(&mut self, assembler: &mut RowAssembler) -> Result<()> {
        self.session.open(&self.url).await?;
        self.session.dismiss_consent_if_present().await;
        self.session.submit_location_query(&self.place).await?;

        let mut keyed = self.collector.keyed(&self.session, &self.extractor).await?;
        info!(cards = keyed.len(), budget = self.budget.max_rows(), "Listing ready");

        let mut visited: HashSet<IdentityKey> = HashSet::new();

        while !assembler.is_full() {
            let Some(index) = keyed.iter().position(|(key, _)| !visited.contains(key)) else {
                info!(visited = visited.len(), "No unvisited card left on the listing");
                break;
            };
            let key = keyed[index].0.clone();
            visited.insert(key.clone());

            let card = &keyed[index].1;
            let fields = self.extractor.listing_fields(&self.session, card).await;

            debug!(%key, "Visiting profile");
            let visit = self
                .navigator
                .visit(&mut self.session, &self.collector, card)
                .await?;
            if let Some(fresh) = visit.cards {
                keyed = self
                    .collector
                    .identify(&self.session, &self.extractor, fresh)
                    .await;
            }

            let record = RowAssembler::merge(fields, visit.fees);
            match assembler.add(record) {
                AddOutcome::Added => info!(%key, count = assembler.len(), "Record added"),
                outcome => debug!(%key, ?outcome, "Record not added"),
            }
        }

        Ok(())
    }
}
