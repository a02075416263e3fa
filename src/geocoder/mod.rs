//! Forward geocoding of facility names.
//!
//! The pipeline talks to a [`Geocoder`] trait object so the transport can be
//! swapped for a mock in tests.

mod nominatim;
mod query;

pub use nominatim::NominatimGeocoder;
pub use query::QueryComposer;

use std::future::Future;
use std::pin::Pin;

use crate::error::GeocodeError;
use crate::models::GeoPoint;

pub type GeocodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<GeoPoint>, GeocodeError>> + Send + 'a>>;

/// Resolves a free-text place description to its best candidate.
pub trait Geocoder: Send + Sync {
    /// Look up `query`. `Ok(None)` means the service had no candidates.
    fn lookup<'a>(&'a self, query: &'a str) -> GeocodeFuture<'a>;
}
