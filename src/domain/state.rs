use std::fmt;

/// Which view the browser tab currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingState {
    #[default]
    Listing,
    Detail,
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingState::Listing => f.write_str("listing"),
            ListingState::Detail => f.write_str("detail"),
        }
    }
}
