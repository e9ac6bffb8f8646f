pub mod error;

pub use error::{Result, ScrapeError};
