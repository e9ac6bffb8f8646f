use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::DEFAULT_MAX_ROWS;

/// What one scrape run targets and where it writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Site home page holding the search bar
    pub url: String,

    /// Location typed into the search bar
    pub place: String,

    /// Maximum number of records emitted per run
    pub max_rows: usize,

    /// CSV file the records are written to
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: "https://www.doctolib.fr/".to_string(),
            place: "Montpellier".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            output: PathBuf::from("doctolib_results.csv"),
        }
    }
}
