//! Scripted in-memory site used by the unit tests.
//!
//! Simulates a home page with an optional consent banner, a listing of
//! cards and one profile page per card, with knobs for the failure modes
//! the navigator has to survive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::app::{Result, ScrapeError};
use crate::scraper::{
    BrowserSession, ClickMode, Driver, FeeRow, FeeSelectors, ScraperConfig, Selectors,
};

/// How a card's profile link reacts to clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeLink {
    Normal,
    Missing,
    /// Interactive click is covered by an overlay, forced click works
    Intercepted,
    /// Neither click works
    Blocked,
    /// Click succeeds but nothing navigates
    Inert,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeCard {
    texts: HashMap<String, Vec<String>>,
    link: FakeLink,
    fees: Vec<FeeRow>,
}

impl FakeCard {
    pub(crate) fn new(name: &str, specialty: &str) -> Self {
        let selectors = Selectors::default();
        Self::anonymous()
            .with(&selectors.name.selectors[0], &[name])
            .with(&selectors.specialty.selectors[0], &[specialty])
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            texts: HashMap::new(),
            link: FakeLink::Normal,
            fees: Vec::new(),
        }
    }

    pub(crate) fn many(n: usize) -> Vec<Self> {
        (1..=n)
            .map(|i| {
                Self::new(&format!("Dr Praticien {i}"), "Médecin généraliste").with_fees(vec![
                    FeeRow {
                        label: "Consultation".into(),
                        tag: format!("{} € conventionné", 20 + i),
                    },
                ])
            })
            .collect()
    }

    pub(crate) fn with(mut self, selector: &str, texts: &[&str]) -> Self {
        self.texts.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_link(mut self, link: FakeLink) -> Self {
        self.link = link;
        self
    }

    pub(crate) fn with_fees(mut self, fees: Vec<FeeRow>) -> Self {
        self.fees = fees;
        self
    }
}

/// What the fake site looks like and how it misbehaves
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSite {
    pub cards: Vec<FakeCard>,
    pub consent_banner: bool,
    pub never_ready: bool,
    pub results_never_render: bool,
    /// Reverse the card order on every other collection
    pub shuffle_on_collect: bool,
    /// Selectors whose lookups error out
    pub failing_selectors: Vec<String>,
    /// 1-based indices of `go_back` calls that silently do nothing
    pub ignored_backs: Vec<usize>,
    /// Profile pages load but their main region never shows up
    pub profile_never_renders: bool,
    /// The consent banner stays up after its reject button is clicked
    pub sticky_consent: bool,
}

impl FakeSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn config() -> ScraperConfig {
        ScraperConfig {
            page_timeout_secs: 1,
            consent_timeout_ms: 50,
            search_timeout_secs: 1,
            detail_timeout_secs: 1,
            back_timeout_secs: 1,
            back_settle_ms: 0,
            poll_interval_ms: 5,
            ..ScraperConfig::default()
        }
    }

    pub(crate) fn driver(self) -> FakeDriver {
        FakeDriver {
            selectors: Selectors::default(),
            site: self,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub(crate) fn session(self) -> BrowserSession<FakeDriver> {
        BrowserSession::new(self.driver(), Self::config(), Arc::new(Selectors::default()))
    }

    /// A session already sitting on the search results
    pub(crate) async fn listing_session(self) -> BrowserSession<FakeDriver> {
        let mut session = self.session();
        session
            .open("https://www.doctolib.fr/")
            .await
            .expect("open fake site");
        session
            .submit_location_query("Montpellier")
            .await
            .expect("search fake site");
        session
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FakePage {
    #[default]
    Blank,
    Home,
    Listing,
    Detail(usize),
}

#[derive(Debug, Default)]
struct FakeState {
    page: FakePage,
    history: Vec<FakePage>,
    epoch: u64,
    consent_visible: bool,
    typed: String,
    clicks: Vec<ClickMode>,
    back_calls: usize,
    collect_calls: usize,
    closed: bool,
}

impl FakeState {
    fn go(&mut self, page: FakePage) {
        self.history.push(self.page);
        self.page = page;
        self.epoch += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FakeNode {
    epoch: u64,
    index: usize,
}

pub(crate) struct FakeDriver {
    site: FakeSite,
    selectors: Selectors,
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub(crate) fn consent_visible(&self) -> bool {
        self.state.lock().unwrap().consent_visible
    }

    pub(crate) fn typed(&self) -> String {
        self.state.lock().unwrap().typed.clone()
    }

    pub(crate) fn clicks(&self) -> Vec<ClickMode> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub(crate) fn back_calls(&self) -> usize {
        self.state.lock().unwrap().back_calls
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn check_selector(&self, selector: &str) -> Result<()> {
        if self.site.failing_selectors.iter().any(|s| s == selector) {
            return Err(ScrapeError::Browser(format!("lookup failed for {selector}")));
        }
        Ok(())
    }

    fn card(&self, state: &FakeState, node: &FakeNode) -> Result<&FakeCard> {
        if node.epoch != state.epoch {
            return Err(ScrapeError::Browser("node is detached".into()));
        }
        self.site
            .cards
            .get(node.index)
            .ok_or_else(|| ScrapeError::ElementNotFound(format!("card {}", node.index)))
    }

    fn page_has(&self, state: &FakeState, selector: &str) -> bool {
        let s = &self.selectors;
        match state.page {
            FakePage::Blank => false,
            FakePage::Home => {
                (selector == s.consent_reject && state.consent_visible)
                    || selector == s.search_input
                    || selector == s.search_submit
            }
            FakePage::Listing => {
                selector == s.results_count || (selector == s.card && !self.site.cards.is_empty())
            }
            FakePage::Detail(_) => selector == s.profile && !self.site.profile_never_renders,
        }
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Node = FakeNode;

    async fn navigate(&self, _url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.go(FakePage::Home);
        state.consent_visible = self.site.consent_banner;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String> {
        let state = if self.site.never_ready { "loading" } else { "complete" };
        Ok(state.to_string())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.check_selector(selector)?;
        let state = self.state.lock().unwrap();
        Ok(self.page_has(&state, selector))
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if state.page == FakePage::Listing && selector == self.selectors.results_count {
            return Ok(Some(format!("{} résultats", self.site.cards.len())));
        }
        Ok(None)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.page_has(&state, selector) {
            return Err(ScrapeError::ElementNotFound(selector.to_string()));
        }
        if selector == self.selectors.consent_reject {
            state.consent_visible = self.site.sticky_consent;
        } else if selector == self.selectors.search_submit && !self.site.results_never_render {
            state.go(FakePage::Listing);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.page_has(&state, selector) {
            return Err(ScrapeError::ElementNotFound(selector.to_string()));
        }
        state.typed = value.to_string();
        Ok(())
    }

    async fn input_value(&self, _selector: &str) -> Result<Option<String>> {
        Ok(Some(self.state.lock().unwrap().typed.clone()))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeNode>> {
        let mut state = self.state.lock().unwrap();
        if state.page != FakePage::Listing || selector != self.selectors.card {
            return Ok(Vec::new());
        }

        state.collect_calls += 1;
        let epoch = state.epoch;
        let mut nodes: Vec<FakeNode> = (0..self.site.cards.len())
            .map(|index| FakeNode { epoch, index })
            .collect();
        if self.site.shuffle_on_collect && state.collect_calls % 2 == 0 {
            nodes.reverse();
        }
        Ok(nodes)
    }

    async fn texts_within(&self, node: &FakeNode, selector: &str) -> Result<Vec<String>> {
        self.check_selector(selector)?;
        let state = self.state.lock().unwrap();
        let card = self.card(&state, node)?;
        Ok(card.texts.get(selector).cloned().unwrap_or_default())
    }

    async fn exists_within(&self, node: &FakeNode, selector: &str) -> Result<bool> {
        self.check_selector(selector)?;
        let state = self.state.lock().unwrap();
        let card = self.card(&state, node)?;
        if selector == self.selectors.detail_link.selectors[0] {
            return Ok(card.link != FakeLink::Missing);
        }
        Ok(card.texts.contains_key(selector))
    }

    async fn scroll_into_view(&self, node: &FakeNode, _selector: &str) -> Result<()> {
        let state = self.state.lock().unwrap();
        self.card(&state, node).map(|_| ())
    }

    async fn click_within(&self, node: &FakeNode, selector: &str, mode: ClickMode) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let link = self.card(&state, node)?.link;
        state.clicks.push(mode);

        match (link, mode) {
            (FakeLink::Missing, _) => Err(ScrapeError::ElementNotFound(selector.to_string())),
            (FakeLink::Inert, _) => Ok(()),
            (FakeLink::Intercepted | FakeLink::Blocked, ClickMode::Interactive) => {
                Err(ScrapeError::ClickIntercepted(selector.to_string()))
            }
            (FakeLink::Blocked, ClickMode::Forced) => {
                Err(ScrapeError::Browser("element is not clickable".into()))
            }
            (FakeLink::Normal, _) | (FakeLink::Intercepted, ClickMode::Forced) => {
                state.go(FakePage::Detail(node.index));
                Ok(())
            }
        }
    }

    async fn fee_rows(&self, _selectors: &FeeSelectors) -> Result<Vec<FeeRow>> {
        let state = self.state.lock().unwrap();
        match state.page {
            FakePage::Detail(index) => Ok(self.site.cards[index].fees.clone()),
            _ => Err(ScrapeError::ElementNotFound("fee section".into())),
        }
    }

    async fn go_back(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.back_calls += 1;
        if self.site.ignored_backs.contains(&state.back_calls) {
            return Ok(());
        }
        if let Some(previous) = state.history.pop() {
            state.page = previous;
            state.epoch += 1;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}
