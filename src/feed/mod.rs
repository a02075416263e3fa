//! Facility feed: fetching, parsing and the in-memory record store.

mod loader;
mod parser;
mod store;

pub use loader::FeedLoader;
pub use parser::{parse_feed, FeedReport, SkipReason, SkippedRow};
pub use store::{LoadState, LoadStatus, RecordStore};
