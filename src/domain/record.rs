use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column headers of the output table, in order
pub const COLUMNS: [&str; 7] = [
    "Nom",
    "Spécialité",
    "Adresse",
    "Assurance",
    "Disponibilités",
    "Type de consultation",
    "Tarifs",
];

/// Placeholder written when no fee information could be read
pub const FEES_UNAVAILABLE: &str = "Indisponible";

/// Placeholder written when a card shows no slot and no "next availability" hint
pub const AVAILABILITY_UNAVAILABLE: &str = "Aucune disponibilité";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsultationType {
    #[serde(rename = "Visio")]
    Visio,
    #[serde(rename = "Présentiel")]
    InPerson,
}

impl ConsultationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationType::Visio => "Visio",
            ConsultationType::InPerson => "Présentiel",
        }
    }
}

impl fmt::Display for ConsultationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultationType {
    type Err = String;

    /// Case-insensitive; the accent on "présentiel" is optional
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visio" => Ok(ConsultationType::Visio),
            "présentiel" | "presentiel" => Ok(ConsultationType::InPerson),
            other => Err(format!(
                "unknown consultation type '{}', expected Visio or Présentiel",
                other
            )),
        }
    }
}

/// (Name, Specialty) pair identifying a practitioner within one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub name: String,
    pub specialty: String,
}

impl IdentityKey {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.specialty)
    }
}

/// One canonical output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Nom")]
    pub name: String,
    #[serde(rename = "Spécialité")]
    pub specialty: String,
    #[serde(rename = "Adresse")]
    pub address: String,
    #[serde(rename = "Assurance")]
    pub insurance: String,
    #[serde(rename = "Disponibilités")]
    pub availability: String,
    #[serde(rename = "Type de consultation")]
    pub consultation: ConsultationType,
    #[serde(rename = "Tarifs")]
    pub fees: String,
}

impl Record {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(self.name.clone(), self.specialty.clone())
    }
}
