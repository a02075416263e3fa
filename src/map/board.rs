//! In-memory map state.

use serde::Serialize;
use std::sync::{PoisonError, RwLock};

use super::MapView;
use crate::models::{Camera, GeoPoint, Marker, MarkerHandle, MarkerKind};

/// Serializable copy of the map state
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub camera: Camera,
    pub markers: Vec<Marker>,
}

struct BoardState {
    next_handle: u64,
    markers: Vec<Marker>,
    camera: Camera,
}

/// Holds markers and camera for clients to render.
pub struct MarkerBoard {
    state: RwLock<BoardState>,
}

impl MarkerBoard {
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            state: RwLock::new(BoardState {
                next_handle: 1,
                markers: Vec::new(),
                camera: Camera { center, zoom },
            }),
        }
    }

    pub fn camera(&self) -> Camera {
        self.read(|s| s.camera)
    }

    /// Markers in placement order
    pub fn markers(&self) -> Vec<Marker> {
        self.read(|s| s.markers.clone())
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.read(|s| MapSnapshot {
            camera: s.camera,
            markers: s.markers.clone(),
        })
    }

    fn read<T>(&self, f: impl FnOnce(&BoardState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut BoardState) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl MapView for MarkerBoard {
    fn add_marker(&self, point: GeoPoint, kind: MarkerKind, label: String) -> MarkerHandle {
        self.write(|s| {
            let handle = MarkerHandle(s.next_handle);
            s.next_handle += 1;
            s.markers.push(Marker {
                handle,
                kind,
                label,
                point,
            });
            handle
        })
    }

    fn remove_marker(&self, handle: MarkerHandle) -> bool {
        self.write(|s| {
            let before = s.markers.len();
            s.markers.retain(|m| m.handle != handle);
            s.markers.len() != before
        })
    }

    fn set_view(&self, center: GeoPoint, zoom: u8) {
        self.write(|s| s.camera = Camera { center, zoom });
    }

    fn list_markers(&self) -> Vec<(MarkerHandle, MarkerKind, String)> {
        self.read(|s| {
            s.markers
                .iter()
                .map(|m| (m.handle, m.kind, m.label.clone()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{clear_markers, locate_user, USER_LOCATION_LABEL};

    fn board() -> MarkerBoard {
        MarkerBoard::new(GeoPoint::new(-9.19, -75.015), 6)
    }

    #[test]
    fn test_handles_are_unique() {
        let board = board();
        let a = board.add_marker(GeoPoint::new(0.0, 0.0), MarkerKind::FacilityResult, "a".into());
        let b = board.add_marker(GeoPoint::new(1.0, 1.0), MarkerKind::FacilityResult, "b".into());
        assert_ne!(a, b);
        assert_eq!(board.list_markers().len(), 2);

        assert!(board.remove_marker(a));
        assert!(!board.remove_marker(a));
        assert_eq!(board.list_markers(), vec![(b, MarkerKind::FacilityResult, "b".to_string())]);
    }

    #[test]
    fn test_clear_keeps_user_marker() {
        let board = board();
        locate_user(&board, GeoPoint::new(-12.05, -77.04), 12);
        board.add_marker(GeoPoint::new(-12.0, -77.0), MarkerKind::FacilityResult, "x".into());
        board.add_marker(GeoPoint::new(-12.1, -77.1), MarkerKind::FacilityResult, "y".into());

        assert_eq!(clear_markers(&board, MarkerKind::FacilityResult), 2);

        let markers = board.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::UserLocation);
        assert_eq!(markers[0].label, USER_LOCATION_LABEL);
    }

    #[test]
    fn test_locate_user_replaces_and_recenters() {
        let board = board();
        locate_user(&board, GeoPoint::new(-12.05, -77.04), 12);
        let second = locate_user(&board, GeoPoint::new(-16.4, -71.5), 12);

        let markers = board.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].handle, second);
        assert_eq!(
            board.camera(),
            Camera {
                center: GeoPoint::new(-16.4, -71.5),
                zoom: 12
            }
        );
    }
}
