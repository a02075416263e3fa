//! Runtime configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::models::GeoPoint;

pub const DEFAULT_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vSQADDmts-FWnd3fIM6oLrPVonUMFsyMGojDJjj6Ke3DLqJuU8EvEEzMA1WLXuV4G3KJ4mUDnM-LD5A/pub?output=csv";
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub geocoder: GeocoderConfig,
    pub search: SearchConfig,
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// `http(s)://` URL or local file path
    pub url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub country: String,
    /// Token stripped from the front of facility names before lookup
    pub name_prefix: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            country: "Perú".to_string(),
            name_prefix: "CEBA".to_string(),
            user_agent: concat!("cebamap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Wait between consecutive geocoder requests
    pub pacing_ms: u64,
    /// Zoom used when centering on the first located facility
    pub result_zoom: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1000,
            result_zoom: 13,
        }
    }
}

impl SearchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    /// Zoom used when centering on the user's location
    pub user_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        // Whole of Peru
        Self {
            center_lat: -9.19,
            center_lon: -75.015,
            zoom: 6,
            user_zoom: 12,
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.pacing(), Duration::from_secs(1));
        assert_eq!(config.search.result_zoom, 13);
        assert_eq!(config.geocoder.country, "Perú");
        assert_eq!(config.map.zoom, 6);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[feed]
url = "facilities.csv"

[search]
pacing_ms = 1500
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.feed.url, "facilities.csv");
        assert_eq!(config.search.pacing_ms, 1500);
        assert_eq!(config.search.result_zoom, 13);
        assert_eq!(config.geocoder.endpoint, DEFAULT_GEOCODER_ENDPOINT);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\npacing_ms = \"soon\"").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_path_uses_defaults() {
        let config = Config::load_or_default(None::<&Path>).unwrap();
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
    }
}
