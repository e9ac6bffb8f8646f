use std::collections::HashSet;

use tracing::debug;

use crate::domain::{IdentityKey, Record, AVAILABILITY_UNAVAILABLE, FEES_UNAVAILABLE};
use crate::scraper::{Extraction, ListingFields};

pub const DEFAULT_MAX_ROWS: usize = 10;

/// Maximum number of records one run emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBudget(usize);

impl RunBudget {
    pub fn new(max_rows: usize) -> Self {
        Self(max_rows)
    }

    pub fn max_rows(&self) -> usize {
        self.0
    }
}

impl Default for RunBudget {
    fn default() -> Self {
        Self(DEFAULT_MAX_ROWS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Key already emitted; the candidate was dropped
    Duplicate,
    /// Budget reached; the candidate was dropped
    Full,
}

/// Collects unique records, in order, up to the run budget
#[derive(Debug, Default)]
pub struct RowAssembler {
    budget: RunBudget,
    seen: HashSet<IdentityKey>,
    records: Vec<Record>,
}

impl RowAssembler {
    pub fn new(budget: RunBudget) -> Self {
        Self {
            budget,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Build the canonical record, substituting each field's sentinel
    pub fn merge(fields: ListingFields, fees: Extraction) -> Record {
        Record {
            name: fields.name.or_sentinel(""),
            specialty: fields.specialty.or_sentinel(""),
            address: fields.address.or_sentinel(""),
            insurance: fields.insurance.or_sentinel(""),
            availability: fields.availability.or_sentinel(AVAILABILITY_UNAVAILABLE),
            consultation: fields.consultation,
            fees: fees.or_sentinel(FEES_UNAVAILABLE),
        }
    }

    pub fn add(&mut self, record: Record) -> AddOutcome {
        let key = record.key();
        if self.seen.contains(&key) {
            debug!(%key, "Dropping duplicate record");
            return AddOutcome::Duplicate;
        }
        if self.is_full() {
            return AddOutcome::Full;
        }

        self.seen.insert(key);
        self.records.push(record);
        AddOutcome::Added
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.budget.max_rows()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
