//! Error types for feed loading, geocoding and search.

use thiserror::Error;

/// Failure to load the facility feed. Leaves the record store empty.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level failure talking to the feed host
    #[error("Feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed host answered with a non-success status
    #[error("Feed request returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Reading a local feed file failed
    #[error("Failed to read feed file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

/// Per-record lookup failure. Logged and skipped; never aborts a batch.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoder returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid geocoder URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Candidate has unparseable coordinates: lat={lat:?} lon={lon:?}")]
    Coordinates { lat: String, lon: String },
}

/// Reasons a search stops without locating anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Input was empty after trimming
    #[error("no district given")]
    InputMissing,

    /// The feed has not been loaded (or failed, or was empty)
    #[error("facility store is not ready")]
    StoreNotReady,

    /// No record's district contains the input
    #[error("no facilities in district {0:?}")]
    NoMatches(String),

    /// Matches existed but none of them could be geocoded
    #[error("none of {0} facilities could be located")]
    NoneGeocoded(usize),

    /// Another search is still running
    #[error("a search is already in progress")]
    Busy,
}
