use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::{Result, ScrapeError};
use crate::domain::ListingState;
use crate::scraper::cards::{Card, CardCollector};
use crate::scraper::selectors::{Extraction, Selectors};
use crate::scraper::session::BrowserSession;
use crate::scraper::{ClickMode, Driver, FeeRow};

/// Separator between kept fee entries
pub const FEE_SEPARATOR: &str = " | ";

/// Which fee entries of a profile end up in the record.
///
/// An entry is kept when its tag contains `tag_filter`, compared
/// case-insensitively. Entries with other tags are dropped, even when they
/// carry a price.
#[derive(Debug, Clone)]
pub struct FeePolicy {
    tag_filter: String,
}

impl FeePolicy {
    pub fn new(tag_filter: impl Into<String>) -> Self {
        Self {
            tag_filter: tag_filter.into().to_lowercase(),
        }
    }

    /// `Unavailable` when the profile lists no fee at all. Rows that exist but
    /// are all filtered out give an empty value.
    pub fn apply(&self, rows: &[FeeRow]) -> Extraction {
        if rows.is_empty() {
            return Extraction::Unavailable;
        }

        let kept: Vec<String> = rows
            .iter()
            .filter(|row| row.tag.to_lowercase().contains(&self.tag_filter))
            .map(|row| format!("{}: {}", row.label.trim(), row.tag.trim()))
            .collect();

        Extraction::Value(kept.join(FEE_SEPARATOR))
    }
}

/// Outcome of one Listing → Detail → Listing round trip
pub struct DetailVisit<N> {
    pub fees: Extraction,
    /// Fresh cards when the round trip navigated; `None` when the tab never
    /// left the listing and the previous cards are still valid
    pub cards: Option<Vec<Card<N>>>,
}

impl<N> DetailVisit<N> {
    fn stayed(fees: Extraction) -> Self {
        Self { fees, cards: None }
    }
}

/// Drives the profile round trip of a single card.
///
/// The only error it returns is `SessionFatal` (or a misuse error such as
/// a stale card): click and render failures degrade to an unavailable fee.
pub struct DetailNavigator {
    selectors: Arc<Selectors>,
    policy: FeePolicy,
}

impl DetailNavigator {
    pub fn new(selectors: Arc<Selectors>, policy: FeePolicy) -> Self {
        Self { selectors, policy }
    }

    pub async fn visit<D: Driver>(
        &self,
        session: &mut BrowserSession<D>,
        collector: &CardCollector,
        card: &Card<D::Node>,
    ) -> Result<DetailVisit<D::Node>> {
        session.require(ListingState::Listing, "open a profile")?;
        session.check_card(card)?;

        let Some(link) = self.find_link(session, card).await else {
            debug!("Card has no profile link");
            return Ok(DetailVisit::stayed(Extraction::Unavailable));
        };

        if !self.click_link(session, card, &link).await {
            return Ok(DetailVisit::stayed(Extraction::Unavailable));
        }

        let profile = self.selectors.profile.as_str();
        let timeout = session.config().detail_timeout();
        let rendered = match session.wait_for(profile, timeout).await {
            Ok(()) => true,
            Err(e) => {
                if self.still_on_listing(session).await {
                    warn!("Click did not open the profile: {}", e);
                    return Ok(DetailVisit::stayed(Extraction::Unavailable));
                }
                warn!("Profile did not render: {}", e);
                false
            }
        };
        session.enter(ListingState::Detail);

        let fees = if rendered {
            self.read_fees(session).await
        } else {
            Extraction::Unavailable
        };

        let cards = self.return_to_listing(session, collector).await?;
        Ok(DetailVisit {
            fees,
            cards: Some(cards),
        })
    }

    async fn find_link<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        card: &Card<D::Node>,
    ) -> Option<String> {
        for selector in self.selectors.detail_link.iter() {
            match session.driver().exists_within(card.node(), selector).await {
                Ok(true) => return Some(selector.to_string()),
                Ok(false) => {}
                Err(e) => debug!(selector, "Link lookup failed: {}", e),
            }
        }
        None
    }

    /// Interactive click, then one forced click if the first was intercepted
    async fn click_link<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        card: &Card<D::Node>,
        link: &str,
    ) -> bool {
        let driver = session.driver();

        if let Err(e) = driver.scroll_into_view(card.node(), link).await {
            debug!("Could not scroll profile link into view: {}", e);
        }

        match driver.click_within(card.node(), link, ClickMode::Interactive).await {
            Ok(()) => true,
            Err(ScrapeError::ClickIntercepted(target)) => {
                warn!(target, "Click intercepted, retrying with a forced click");
                match driver.click_within(card.node(), link, ClickMode::Forced).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Forced click failed: {}", e);
                        false
                    }
                }
            }
            Err(e) => {
                warn!("Could not click profile link: {}", e);
                false
            }
        }
    }

    async fn still_on_listing<D: Driver>(&self, session: &BrowserSession<D>) -> bool {
        let driver = session.driver();
        let listing = driver.exists(&self.selectors.card).await.unwrap_or(false);
        let profile = driver.exists(&self.selectors.profile).await.unwrap_or(false);
        listing && !profile
    }

    async fn read_fees<D: Driver>(&self, session: &BrowserSession<D>) -> Extraction {
        match session.driver().fee_rows(&self.selectors.fee).await {
            Ok(rows) => {
                debug!(rows = rows.len(), "Read fee rows");
                self.policy.apply(&rows)
            }
            Err(e) => {
                warn!("Could not read fees: {}", e);
                Extraction::Unavailable
            }
        }
    }

    /// Go back and re-collect, retrying the back-navigation once.
    async fn return_to_listing<D: Driver>(
        &self,
        session: &mut BrowserSession<D>,
        collector: &CardCollector,
    ) -> Result<Vec<Card<D::Node>>> {
        let mut last_error = None;

        for attempt in 1..=2 {
            // A previous attempt may have navigated back but timed out
            // waiting for the listing; going back again would leave the results
            if attempt == 1 || !self.listing_present(session, collector).await {
                if let Err(e) = session.driver().go_back().await {
                    warn!(attempt, "Back-navigation failed: {}", e);
                    last_error = Some(e);
                    continue;
                }
            }
            tokio::time::sleep(session.config().back_settle()).await;

            match self.confirm_listing(session, collector).await {
                Ok(cards) => {
                    if attempt > 1 {
                        info!("Listing restored on second attempt");
                    }
                    return Ok(cards);
                }
                Err(e) => {
                    warn!(attempt, "Listing did not come back: {}", e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Err(ScrapeError::SessionFatal(format!(
            "could not return to the listing: {}",
            reason
        )))
    }

    /// The profile region may never have rendered, so only the listing
    /// container tells whether the tab is back
    async fn listing_present<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        collector: &CardCollector,
    ) -> bool {
        session
            .driver()
            .exists(collector.container())
            .await
            .unwrap_or(false)
    }

    async fn confirm_listing<D: Driver>(
        &self,
        session: &mut BrowserSession<D>,
        collector: &CardCollector,
    ) -> Result<Vec<Card<D::Node>>> {
        let timeout = session.config().back_timeout();
        session.wait_for(collector.container(), timeout).await?;
        session.enter(ListingState::Listing);

        let cards = collector.collect(session).await?;
        if cards.is_empty() {
            session.enter(ListingState::Detail);
            return Err(ScrapeError::ElementNotFound(collector.container().to_string()));
        }
        Ok(cards)
    }
}
