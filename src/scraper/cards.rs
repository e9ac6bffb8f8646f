use tracing::debug;

use crate::app::Result;
use crate::domain::{IdentityKey, ListingState};
use crate::scraper::extractor::FieldExtractor;
use crate::scraper::session::BrowserSession;
use crate::scraper::Driver;

/// Handle to one listing item.
///
/// Only valid on the listing render it was collected from: the session
/// rejects it once any navigation happened.
pub struct Card<N> {
    node: N,
    generation: u64,
}

impl<N> Card<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Finds the repeated result cards on the current listing page
#[derive(Debug, Clone)]
pub struct CardCollector {
    container: String,
}

impl CardCollector {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Every card currently rendered. Empty when the listing has no result.
    pub async fn collect<D: Driver>(&self, session: &BrowserSession<D>) -> Result<Vec<Card<D::Node>>> {
        session.require(ListingState::Listing, "collect cards")?;

        let generation = session.generation();
        let nodes = session.driver().find_all(&self.container).await?;
        debug!(count = nodes.len(), generation, "Collected listing cards");

        Ok(nodes
            .into_iter()
            .map(|node| Card { node, generation })
            .collect())
    }

    /// Collect and pair each card with its identity key.
    ///
    /// Cards without a name nor a specialty have no identity and are left out.
    pub async fn keyed<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        extractor: &FieldExtractor,
    ) -> Result<Vec<(IdentityKey, Card<D::Node>)>> {
        let cards = self.collect(session).await?;
        Ok(self.identify(session, extractor, cards).await)
    }

    /// Pair already collected cards with their identity key, dropping those
    /// without one
    pub async fn identify<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        extractor: &FieldExtractor,
        cards: Vec<Card<D::Node>>,
    ) -> Vec<(IdentityKey, Card<D::Node>)> {
        let mut keyed = Vec::with_capacity(cards.len());

        for card in cards {
            if let Some(key) = extractor.identity(session, &card).await {
                keyed.push((key, card));
            }
        }

        keyed
    }
}
