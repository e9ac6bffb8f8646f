use serde::{Deserialize, Serialize};

/// Ordered alternative queries for one logical field.
///
/// Evaluation stops at the first selector that yields non-blank text;
/// later selectors are never consulted once one has matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorChain {
    pub selectors: Vec<String>,

    /// When set, every non-blank text matched by the winning selector is
    /// joined with this separator instead of keeping only the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
}

impl SelectorChain {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            join: None,
        }
    }

    pub fn joined(mut self, separator: impl Into<String>) -> Self {
        self.join = Some(separator.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(String::as_str)
    }

    /// Reduce the texts matched by one selector to the field value.
    ///
    /// Returns `None` when every text is blank, so the caller moves on to
    /// the next selector.
    pub fn pick(&self, texts: &[String]) -> Option<String> {
        let mut kept = texts.iter().map(|t| t.trim()).filter(|t| !t.is_empty());

        match &self.join {
            None => kept.next().map(str::to_string),
            Some(separator) => {
                let all: Vec<&str> = kept.collect();
                (!all.is_empty()).then(|| all.join(separator))
            }
        }
    }
}

/// Value-or-sentinel result of evaluating a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Value(String),
    Unavailable,
}

impl Extraction {
    pub fn value(&self) -> Option<&str> {
        match self {
            Extraction::Value(v) => Some(v),
            Extraction::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Extraction::Value(_))
    }

    pub fn or_sentinel(self, sentinel: &str) -> String {
        match self {
            Extraction::Value(v) => v,
            Extraction::Unavailable => sentinel.to_string(),
        }
    }
}

/// Selectors for the fee section of a profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSelectors {
    /// One fee entry
    pub row: String,
    /// Label inside a row, e.g. "Consultation"
    pub label: String,
    /// Tag inside a row carrying the price and coverage
    pub tag: String,
}

impl Default for FeeSelectors {
    fn default() -> Self {
        Self {
            row: ".dl-profile-fee".to_string(),
            label: ".dl-profile-fee-name".to_string(),
            tag: ".dl-profile-fee-tag".to_string(),
        }
    }
}

/// Every selector the pipeline uses, page-level first, then per-field chains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub consent_reject: String,
    pub search_input: String,
    pub search_submit: String,
    pub results_count: String,
    pub card: String,
    pub profile: String,
    pub fee: FeeSelectors,

    pub name: SelectorChain,
    pub specialty: SelectorChain,
    pub address: SelectorChain,
    pub insurance: SelectorChain,
    pub availability: SelectorChain,
    /// Matches only on cards offering video consultations
    pub visio: SelectorChain,
    pub detail_link: SelectorChain,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            consent_reject: "#didomi-notice-disagree-button".to_string(),
            search_input: "input.searchbar-input.searchbar-place-input".to_string(),
            search_submit: "button.searchbar-submit-button.dl-button-primary".to_string(),
            results_count: "div[data-test='total-number-of-results']".to_string(),
            card: ".dl-card-content".to_string(),
            profile: "#main-content .dl-profile-wrapper".to_string(),
            fee: FeeSelectors::default(),

            name: SelectorChain::new([
                ".dl-text.dl-text-body.dl-text-bold.dl-text-s.dl-text-primary-110",
                "h2",
            ]),
            specialty: SelectorChain::new([
                ".dl-doctor-card-speciality-title",
                "[data-test='doctor-card-speciality']",
            ]),
            address: SelectorChain::new([
                "[data-test='doctor-card-address']",
                ".dl-doctor-card-address",
                "address",
            ]),
            insurance: SelectorChain::new([
                "[data-test='doctor-card-convention']",
                ".dl-doctor-card-convention",
                "[data-test='sector']",
            ]),
            // Cards with open slots, then "next availability" hints in
            // either color variant
            availability: SelectorChain::new([
                ".Tappable-inactive.availabilities-slot.availabilities-slot-desktop",
                ".dl-text.dl-text-body.dl-text-regular.dl-text-s.dl-text-left.dl-text-primary-110",
                ".dl-text.dl-text-body.dl-text-regular.dl-text-s.dl-text-left.dl-text-neutral-130",
            ])
            .joined(" | "),
            visio: SelectorChain::new([
                "[data-test='telehealth-badge']",
                "[data-icon-name='regular/video']",
                ".dl-doctor-card-telehealth",
            ]),
            detail_link: SelectorChain::new([
                "a.dl-p-doctor-result-link",
                "a[data-test='doctor-card-link']",
                "h2 a",
            ]),
        }
    }
}
