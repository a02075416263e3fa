//! Nominatim `search` endpoint client.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GeocodeFuture, Geocoder};
use crate::error::GeocodeError;
use crate::models::GeoPoint;

/// Forward geocoder backed by an OSM Nominatim instance
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
}

/// One search candidate. Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()?,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Request URL for `query`, asking for a single JSON candidate
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", "1");
        url
    }

    async fn search(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let url = self.search_url(query);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let candidates: Vec<Candidate> = response.json().await?;
        first_point(candidates)
    }
}

impl Geocoder for NominatimGeocoder {
    fn lookup<'a>(&'a self, query: &'a str) -> GeocodeFuture<'a> {
        Box::pin(self.search(query))
    }
}

fn first_point(candidates: Vec<Candidate>) -> Result<Option<GeoPoint>, GeocodeError> {
    let Some(first) = candidates.into_iter().next() else {
        return Ok(None);
    };

    match (first.lat.trim().parse::<f64>(), first.lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Ok(Some(GeoPoint::new(lat, lon))),
        _ => Err(GeocodeError::Coordinates {
            lat: first.lat,
            lon: first.lon,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let candidates: Vec<Candidate> = serde_json::from_str(body).unwrap();
        first_point(candidates)
    }

    #[test]
    fn test_search_url_params() {
        let geocoder = NominatimGeocoder::new(
            "https://nominatim.openstreetmap.org/search",
            "cebamap-test",
            Duration::from_secs(5),
        )
        .unwrap();

        let url = geocoder.search_url("Norte, lima, Perú");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "json".to_string()),
                ("q".to_string(), "Norte, lima, Perú".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(url.path(), "/search");
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let result = NominatimGeocoder::new("not a url", "cebamap-test", Duration::from_secs(5));
        assert!(matches!(result, Err(GeocodeError::Url(_))));
    }

    #[test]
    fn test_first_candidate_wins() {
        let body = r#"[
            {"lat": "-12.0464", "lon": "-77.0428", "display_name": "Lima"},
            {"lat": "0", "lon": "0"}
        ]"#;
        let point = parse(body).unwrap().unwrap();
        assert_eq!(point, GeoPoint::new(-12.0464, -77.0428));
    }

    #[test]
    fn test_no_candidates_is_absent() {
        assert!(parse("[]").unwrap().is_none());
    }

    #[test]
    fn test_garbage_coordinates_is_error() {
        let result = parse(r#"[{"lat": "north", "lon": "-77.0"}]"#);
        assert!(matches!(result, Err(GeocodeError::Coordinates { .. })));
    }
}
