//! Facility records parsed from the feed and the points they resolve to.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// A single facility row from the feed.
///
/// Both fields are trimmed and non-empty. The district is stored lowercased
/// so that filtering can compare it without re-normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub district: String,
}

impl FacilityRecord {
    /// Build a record from raw feed fields, rejecting blanks.
    pub fn new(name: &str, district: &str) -> Option<Self> {
        let name = name.trim();
        let district = district.trim().to_lowercase();
        if name.is_empty() || district.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            district,
        })
    }

    /// Case-insensitive substring match on the district.
    pub fn in_district(&self, needle: &str) -> bool {
        self.district.contains(&needle.to_lowercase())
    }

    /// Popup label for a map marker
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.district)
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other)) / 1000.0
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_normalizes_fields() {
        let record = FacilityRecord::new("  CEBA Norte ", " Lima Este ").unwrap();
        assert_eq!(record.name, "CEBA Norte");
        assert_eq!(record.district, "lima este");
    }

    #[test]
    fn test_record_rejects_blank_fields() {
        assert!(FacilityRecord::new("", "lima").is_none());
        assert!(FacilityRecord::new("CEBA Norte", "   ").is_none());
    }

    #[test]
    fn test_district_match_is_case_insensitive_substring() {
        let record = FacilityRecord::new("CEBA Este", "Lima Este").unwrap();
        assert!(record.in_district("Lima"));
        assert!(record.in_district("ESTE"));
        assert!(!record.in_district("callao"));
    }

    #[test]
    fn test_distance_lima_to_callao() {
        let lima = GeoPoint::new(-12.0464, -77.0428);
        let callao = GeoPoint::new(-12.0566, -77.1181);
        let d = lima.distance_km(&callao);
        assert!(d > 7.0 && d < 9.0, "unexpected distance {d}");
    }
}
