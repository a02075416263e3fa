//! Map view: marker placement and camera position.

mod board;

pub use board::{MapSnapshot, MarkerBoard};

use tracing::info;

use crate::models::{GeoPoint, MarkerHandle, MarkerKind};

/// Label of the marker placed at the user's own position
pub const USER_LOCATION_LABEL: &str = "Estás aquí";

/// Marker and camera primitives the search pipeline draws with.
pub trait MapView: Send + Sync {
    fn add_marker(&self, point: GeoPoint, kind: MarkerKind, label: String) -> MarkerHandle;

    /// Returns false if `handle` was not on the map
    fn remove_marker(&self, handle: MarkerHandle) -> bool;

    fn set_view(&self, center: GeoPoint, zoom: u8);

    fn list_markers(&self) -> Vec<(MarkerHandle, MarkerKind, String)>;
}

/// Remove every marker of `kind`, returning how many went
pub fn clear_markers(map: &dyn MapView, kind: MarkerKind) -> usize {
    let mut removed = 0;
    for (handle, marker_kind, _) in map.list_markers() {
        if marker_kind == kind && map.remove_marker(handle) {
            removed += 1;
        }
    }
    removed
}

/// Place the "you are here" marker and center on it.
///
/// Replaces any previous user marker.
pub fn locate_user(map: &dyn MapView, point: GeoPoint, zoom: u8) -> MarkerHandle {
    clear_markers(map, MarkerKind::UserLocation);
    let handle = map.add_marker(
        point,
        MarkerKind::UserLocation,
        USER_LOCATION_LABEL.to_string(),
    );
    map.set_view(point, zoom);
    info!("User located at ({}, {})", point.lat, point.lon);
    handle
}
