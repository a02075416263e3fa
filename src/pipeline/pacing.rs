//! Paced, strictly sequential geocoding.
//!
//! Lookups are produced as a stream so the caller can draw each result as it
//! arrives. Consecutive requests are separated by at least the pacing
//! interval, whether or not the previous lookup succeeded.

use futures::stream::{self, Stream};
use std::time::Duration;
use tracing::{info, warn};

use crate::geocoder::{Geocoder, QueryComposer};
use crate::models::{FacilityRecord, GeoPoint};

/// Outcome of geocoding one matched record
#[derive(Debug, Clone)]
pub struct LookupAttempt {
    /// Position in filter order
    pub index: usize,
    pub record: FacilityRecord,
    pub query: String,
    pub point: Option<GeoPoint>,
}

/// One lookup per record, in order, `pacing` apart.
pub fn paced_lookups<'a>(
    records: Vec<FacilityRecord>,
    geocoder: &'a dyn Geocoder,
    composer: &'a QueryComposer,
    pacing: Duration,
) -> impl Stream<Item = LookupAttempt> + Send + 'a {
    stream::unfold(
        records.into_iter().enumerate(),
        move |mut remaining| async move {
            let Some((index, record)) = remaining.next() else {
                return None;
            };
            if index > 0 {
                tokio::time::sleep(pacing).await;
            }

            let query = composer.compose(&record);
            let point = lookup_or_log(geocoder, &record, &query).await;

            Some((
                LookupAttempt {
                    index,
                    record,
                    query,
                    point,
                },
                remaining,
            ))
        },
    )
}

/// Collapse lookup errors into absence; a failed record never stops the batch.
async fn lookup_or_log(
    geocoder: &dyn Geocoder,
    record: &FacilityRecord,
    query: &str,
) -> Option<GeoPoint> {
    info!("Geocoding {:?}", query);
    match geocoder.lookup(query).await {
        Ok(Some(point)) => {
            info!(
                "Located {:?} at ({}, {})",
                record.name, point.lat, point.lon
            );
            Some(point)
        }
        Ok(None) => {
            warn!("No coordinates found for {:?}", record.name);
            None
        }
        Err(e) => {
            warn!("Geocoding failed for {:?}: {}", query, e);
            None
        }
    }
}
