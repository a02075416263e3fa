//! cebamap - district search over a published CEBA facility list
//!
//! This library provides shared types and modules for the serve and locate binaries.

pub mod config;
pub mod error;
pub mod feed;
pub mod geocoder;
pub mod map;
pub mod models;
pub mod pipeline;

pub use config::Config;
pub use error::{FeedError, GeocodeError, SearchError};
pub use models::{FacilityRecord, GeoPoint, MarkerKind};
pub use pipeline::{SearchPipeline, SearchReport};
