//! Map markers and camera state.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Opaque marker identifier handed out by the map view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub u64);

impl std::fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker/{}", self.0)
    }
}

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// The "you are here" marker. Survives search result clearing.
    UserLocation,
    /// A geocoded facility from the latest search
    FacilityResult,
}

/// A marker placed on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub kind: MarkerKind,
    pub label: String,
    pub point: GeoPoint,
}

/// Camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: u8,
}
