use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::app::{Result, ScrapeError};
use crate::domain::ListingState;
use crate::scraper::cards::Card;
use crate::scraper::config::ScraperConfig;
use crate::scraper::selectors::Selectors;
use crate::scraper::Driver;

/// The single browser tab of a run, plus the listing state machine around it.
///
/// `generation` is bumped on every navigation; cards remember the
/// generation they were collected in and are rejected once it moved on.
pub struct BrowserSession<D: Driver> {
    driver: D,
    config: ScraperConfig,
    selectors: Arc<Selectors>,
    state: ListingState,
    generation: u64,
}

impl<D: Driver> BrowserSession<D> {
    pub fn new(driver: D, config: ScraperConfig, selectors: Arc<Selectors>) -> Self {
        Self {
            driver,
            config,
            selectors,
            state: ListingState::Listing,
            generation: 0,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn state(&self) -> ListingState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a navigation to `state`; every card collected so far goes stale
    pub(crate) fn enter(&mut self, state: ListingState) {
        trace!(from = %self.state, to = %state, generation = self.generation + 1, "Navigation");
        self.state = state;
        self.generation += 1;
    }

    pub(crate) fn check_card(&self, card: &Card<D::Node>) -> Result<()> {
        if card.generation() != self.generation {
            return Err(ScrapeError::StaleCard {
                card: card.generation(),
                current: self.generation,
            });
        }
        Ok(())
    }

    pub(crate) fn require(&self, state: ListingState, action: &str) -> Result<()> {
        if self.state != state {
            return Err(ScrapeError::InvalidState(format!(
                "cannot {} while on the {} view",
                action, self.state
            )));
        }
        Ok(())
    }

    /// Navigate to `url` and wait for the document to become interactive
    pub async fn open(&mut self, url: &str) -> Result<()> {
        let url = url::Url::parse(url)?;
        info!(%url, "Opening listing site");

        self.driver.navigate(url.as_str()).await?;
        self.enter(ListingState::Listing);

        let driver = &self.driver;
        self.poll_until("document ready", self.config.page_timeout(), move || async move {
            let state = driver.ready_state().await?;
            Ok::<_, ScrapeError>(state == "interactive" || state == "complete")
        })
        .await
    }

    /// Reject the consent banner if one shows up within the consent timeout.
    ///
    /// Never fails: no banner is the expected outcome on many runs. Returns
    /// true only when the banner was clicked and then went away.
    pub async fn dismiss_consent_if_present(&mut self) -> bool {
        let selector = self.selectors.consent_reject.clone();
        let timeout = self.config.consent_timeout();

        if let Err(e) = self.wait_for(&selector, timeout).await {
            debug!("No consent banner: {}", e);
            return false;
        }

        if let Err(e) = self.driver.click(&selector).await {
            warn!("Consent banner present but could not be dismissed: {}", e);
            return false;
        }

        let driver = &self.driver;
        let banner = selector.as_str();
        let gone = self
            .poll_until("consent banner to close", timeout, move || async move {
                Ok::<_, ScrapeError>(!driver.exists(banner).await?)
            })
            .await;
        match gone {
            Ok(()) => {
                info!("Consent banner dismissed");
                true
            }
            Err(e) => {
                warn!("Consent banner still visible after click: {}", e);
                false
            }
        }
    }

    /// Type `place` into the search field, submit, and wait for results
    pub async fn submit_location_query(&mut self, place: &str) -> Result<()> {
        let input = self.selectors.search_input.clone();
        let submit = self.selectors.search_submit.clone();
        let results = self.selectors.results_count.clone();

        self.wait_for(&input, self.config.page_timeout()).await?;
        self.driver.fill(&input, place).await?;

        // The field is controlled by the page's framework; only submit once
        // the value actually landed
        let driver = &self.driver;
        let input_ref = input.as_str();
        self.poll_until("search field value", self.config.page_timeout(), move || async move {
            let value = driver.input_value(input_ref).await?;
            Ok::<_, ScrapeError>(value.is_some_and(|v| v.contains(place)))
        })
        .await?;

        self.wait_for(&submit, self.config.page_timeout()).await?;
        self.driver.click(&submit).await?;
        self.wait_for(&results, self.config.search_timeout()).await?;
        self.enter(ListingState::Listing);

        match self.driver.text(&results).await {
            Ok(Some(count)) => info!(place, results = %count, "Search results ready"),
            _ => info!(place, "Search results ready"),
        }
        Ok(())
    }

    /// Wait until `selector` matches on the current page
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let driver = &self.driver;
        self.poll_until(selector, timeout, move || async move {
            driver.exists(selector).await
        })
        .await
    }

    /// Check the page every poll interval until `check` reports true.
    ///
    /// Check errors count as "not yet": the page may be mid-navigation.
    pub(crate) async fn poll_until<F, Fut>(
        &self,
        what: &str,
        timeout: Duration,
        mut check: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let interval = self.config.poll_interval();

        let waited = tokio::time::timeout(timeout, async {
            loop {
                match check().await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => trace!(what, "Check failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        })
        .await;

        waited.map_err(|_| ScrapeError::NavigationTimeout {
            what: what.to_string(),
            after: timeout,
        })
    }

    /// Close the browser
    pub async fn close(&mut self) -> Result<()> {
        debug!("Closing browser session");
        self.driver.close().await
    }
}
