pub mod record;
pub mod state;

pub use record::{
    ConsultationType, IdentityKey, Record, AVAILABILITY_UNAVAILABLE, COLUMNS, FEES_UNAVAILABLE,
};
pub use state::ListingState;
