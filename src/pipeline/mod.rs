//! District search: validate, filter, geocode at a fixed pace, draw.

mod pacing;
mod search;
mod status;

pub use pacing::{paced_lookups, LookupAttempt};
pub use search::{LocatedFacility, SearchPipeline, SearchReport, SearchState};
pub use status::{Status, StatusLevel};
