//! Core data models for the facility map.

pub mod facility;
pub mod marker;

pub use facility::{FacilityRecord, GeoPoint};
pub use marker::{Camera, Marker, MarkerHandle, MarkerKind};
