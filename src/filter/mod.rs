//! Post-run filtering of a results table.
//!
//! Text criteria are case-insensitive substrings. The price range is applied
//! to the first amount found in the fee column; records whose fees carry no
//! amount (e.g. `Indisponible`) are not range-filtered and stay in.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{ConsultationType, Record};

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*€").expect("price pattern is valid")
});

/// First euro amount in a fee string
pub fn extract_price(fees: &str) -> Option<f64> {
    PRICE_RE
        .captures(fees)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Criteria left at `None` don't constrain anything
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub specialty: Option<String>,
    pub insurance: Option<String>,
    pub consultation: Option<ConsultationType>,
    pub address_include: Option<String>,
    pub address_exclude: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if !contains(&record.specialty, self.specialty.as_deref()) {
            return false;
        }
        if !contains(&record.insurance, self.insurance.as_deref()) {
            return false;
        }
        if !contains(&record.address, self.address_include.as_deref()) {
            return false;
        }
        if let Some(excluded) = self.address_exclude.as_deref().filter(|s| !s.is_empty()) {
            if contains(&record.address, Some(excluded)) {
                return false;
            }
        }
        if self.consultation.is_some_and(|c| c != record.consultation) {
            return false;
        }

        match extract_price(&record.fees) {
            Some(price) => {
                self.min_price.map_or(true, |min| price >= min)
                    && self.max_price.map_or(true, |max| price <= max)
            }
            None => true,
        }
    }

    /// Keep the matching records, in order
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}
