use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::domain::{ConsultationType, IdentityKey};
use crate::scraper::cards::Card;
use crate::scraper::selectors::{Extraction, SelectorChain, Selectors};
use crate::scraper::session::BrowserSession;
use crate::scraper::Driver;

/// Listing-level fields of one card, before fees are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    pub name: Extraction,
    pub specialty: Extraction,
    pub address: Extraction,
    pub insurance: Extraction,
    pub availability: Extraction,
    pub consultation: ConsultationType,
}

/// `None` when neither name nor specialty could be read
fn identity_of(name: &Extraction, specialty: &Extraction) -> Option<IdentityKey> {
    if !name.is_available() && !specialty.is_available() {
        return None;
    }
    Some(IdentityKey::new(
        name.value().unwrap_or_default(),
        specialty.value().unwrap_or_default(),
    ))
}

/// Evaluates selector chains against a card
pub struct FieldExtractor {
    selectors: Arc<Selectors>,
}

impl FieldExtractor {
    pub fn new(selectors: Arc<Selectors>) -> Self {
        Self { selectors }
    }

    /// First non-blank text produced by the chain's selectors, in order.
    ///
    /// Lookup failures are treated as "no match" and never escape.
    pub async fn evaluate<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        card: &Card<D::Node>,
        chain: &SelectorChain,
    ) -> Extraction {
        if let Err(e) = session.check_card(card) {
            warn!("Refusing to read from a stale card: {}", e);
            return Extraction::Unavailable;
        }

        for selector in chain.iter() {
            match session.driver().texts_within(card.node(), selector).await {
                Ok(texts) => {
                    if let Some(value) = chain.pick(&texts) {
                        trace!(selector, "Selector matched");
                        return Extraction::Value(value);
                    }
                }
                Err(e) => debug!(selector, "Lookup failed: {}", e),
            }
        }

        Extraction::Unavailable
    }

    pub async fn identity<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        card: &Card<D::Node>,
    ) -> Option<IdentityKey> {
        let name = self.evaluate(session, card, &self.selectors.name).await;
        let specialty = self.evaluate(session, card, &self.selectors.specialty).await;
        identity_of(&name, &specialty)
    }

    pub async fn listing_fields<D: Driver>(
        &self,
        session: &BrowserSession<D>,
        card: &Card<D::Node>,
    ) -> ListingFields {
        let s = &self.selectors;

        let consultation = match self.evaluate(session, card, &s.visio).await {
            Extraction::Value(_) => ConsultationType::Visio,
            Extraction::Unavailable => ConsultationType::InPerson,
        };

        ListingFields {
            name: self.evaluate(session, card, &s.name).await,
            specialty: self.evaluate(session, card, &s.specialty).await,
            address: self.evaluate(session, card, &s.address).await,
            insurance: self.evaluate(session, card, &s.insurance).await,
            availability: self.evaluate(session, card, &s.availability).await,
            consultation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListingState;
    use crate::scraper::fake::{FakeCard, FakeSite};
    use crate::scraper::CardCollector;

    async fn first_card(
        site: FakeSite,
    ) -> (
        BrowserSession<crate::scraper::fake::FakeDriver>,
        Card<crate::scraper::fake::FakeNode>,
        FieldExtractor,
    ) {
        let session = site.listing_session().await;
        let collector = CardCollector::new(&session.selectors().card);
        let card = collector
            .collect(&session)
            .await
            .unwrap()
            .into_iter()
            .next()
            .expect("one card");
        let extractor = FieldExtractor::new(session.selectors().clone().into());
        (session, card, extractor)
    }

    #[tokio::test]
    async fn test_first_matching_selector_wins() {
        let mut site = FakeSite::new();
        let chain = SelectorChain::new([".a", ".b", ".c"]);
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")
            .with(".b", &["from b"])
            .with(".c", &["from c"])];
        let (session, card, extractor) = first_card(site).await;

        let value = extractor.evaluate(&session, &card, &chain).await;
        assert_eq!(value, Extraction::Value("from b".into()));
    }

    #[tokio::test]
    async fn test_blank_match_falls_through() {
        let mut site = FakeSite::new();
        let chain = SelectorChain::new([".a", ".b"]);
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")
            .with(".a", &["   "])
            .with(".b", &["  kept  "])];
        let (session, card, extractor) = first_card(site).await;

        let value = extractor.evaluate(&session, &card, &chain).await;
        assert_eq!(value, Extraction::Value("kept".into()));
    }

    #[tokio::test]
    async fn test_lookup_error_falls_through() {
        let mut site = FakeSite::new();
        let chain = SelectorChain::new([".broken", ".b"]);
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre").with(".b", &["ok"])];
        site.failing_selectors = vec![".broken".into()];
        let (session, card, extractor) = first_card(site).await;

        let value = extractor.evaluate(&session, &card, &chain).await;
        assert_eq!(value, Extraction::Value("ok".into()));
    }

    #[tokio::test]
    async fn test_no_match_is_unavailable() {
        let mut site = FakeSite::new();
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")];
        let (session, card, extractor) = first_card(site).await;

        let chain = SelectorChain::new([".missing", ".absent"]);
        let value = extractor.evaluate(&session, &card, &chain).await;
        assert_eq!(value, Extraction::Unavailable);
    }

    #[tokio::test]
    async fn test_stale_card_is_unavailable() {
        let mut site = FakeSite::new();
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")];
        let (mut session, card, extractor) = first_card(site).await;

        session.enter(ListingState::Listing);
        let name = extractor
            .evaluate(&session, &card, &session.selectors().name.clone())
            .await;
        assert_eq!(name, Extraction::Unavailable);
    }

    #[tokio::test]
    async fn test_listing_fields_and_consultation_type() {
        let selectors = crate::scraper::Selectors::default();
        let mut site = FakeSite::new();
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")
            .with(&selectors.address.selectors[1], &["3 place de la Comédie"])
            .with(&selectors.availability.selectors[0], &["lun. 9:00", "lun. 9:30"])
            .with(&selectors.visio.selectors[2], &["Vidéo"])];
        let (session, card, extractor) = first_card(site).await;

        let fields = extractor.listing_fields(&session, &card).await;
        assert_eq!(fields.name, Extraction::Value("Dr A".into()));
        assert_eq!(fields.address, Extraction::Value("3 place de la Comédie".into()));
        assert_eq!(fields.insurance, Extraction::Unavailable);
        assert_eq!(
            fields.availability,
            Extraction::Value("lun. 9:00 | lun. 9:30".into())
        );
        assert_eq!(fields.consultation, ConsultationType::Visio);
        assert_eq!(
            identity_of(&fields.name, &fields.specialty),
            extractor.identity(&session, &card).await
        );
    }

    #[tokio::test]
    async fn test_no_visio_indicator_means_in_person() {
        let mut site = FakeSite::new();
        site.cards = vec![FakeCard::new("Dr A", "Pédiatre")];
        let (session, card, extractor) = first_card(site).await;

        let fields = extractor.listing_fields(&session, &card).await;
        assert_eq!(fields.consultation, ConsultationType::InPerson);
    }

    #[test]
    fn test_identity_needs_name_or_specialty() {
        assert_eq!(identity_of(&Extraction::Unavailable, &Extraction::Unavailable), None);
        assert_eq!(
            identity_of(&Extraction::Value("Dr A".into()), &Extraction::Unavailable),
            Some(IdentityKey::new("Dr A", ""))
        );
    }
}
