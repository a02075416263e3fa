//! The district search state machine.
//!
//! `Idle -> Validating -> Filtering -> Geocoding(i) -> Done`. Validation
//! failures stop before filtering; facility markers from the previous search
//! are cleared once filtering starts, even when nothing matches.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{paced_lookups, Status};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::feed::RecordStore;
use crate::geocoder::{Geocoder, QueryComposer};
use crate::map::{clear_markers, locate_user, MapView};
use crate::models::{FacilityRecord, GeoPoint, MarkerHandle, MarkerKind};

/// Where the current (or last) search stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Validating,
    Filtering,
    /// `index` is the last record attempted, in filter order
    Geocoding { index: usize, total: usize },
    Done,
}

/// A matched facility that was placed on the map
#[derive(Debug, Clone, Serialize)]
pub struct LocatedFacility {
    pub name: String,
    pub district: String,
    pub point: GeoPoint,
    pub marker: MarkerHandle,
    /// Distance from the user, when their location is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Everything one search invocation produced
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub input: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Number located, or why the search stopped
    pub outcome: Result<usize, SearchError>,
    pub status: Status,
    /// Matches that got a marker, in filter order
    pub located: Vec<LocatedFacility>,
    /// Matches the geocoder could not place
    pub missed: Vec<FacilityRecord>,
    /// Where the camera was moved, if anywhere
    pub camera_target: Option<GeoPoint>,
    /// Geocoder requests issued
    pub lookups: usize,
}

impl SearchReport {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            outcome: Ok(0),
            status: Status::idle(),
            located: Vec::new(),
            missed: Vec::new(),
            camera_target: None,
            lookups: 0,
        }
    }
}

/// Runs district searches against the record store and draws on the map.
///
/// Searches do not overlap: a search started while another is in flight is
/// rejected with [`SearchError::Busy`] and touches nothing.
pub struct SearchPipeline {
    store: Arc<RecordStore>,
    map: Arc<dyn MapView>,
    geocoder: Arc<dyn Geocoder>,
    composer: QueryComposer,
    settings: SearchConfig,
    user_location: RwLock<Option<GeoPoint>>,
    state: RwLock<SearchState>,
    status: RwLock<Status>,
    running: Mutex<()>,
}

impl SearchPipeline {
    pub fn new(
        store: Arc<RecordStore>,
        map: Arc<dyn MapView>,
        geocoder: Arc<dyn Geocoder>,
        composer: QueryComposer,
        settings: SearchConfig,
    ) -> Self {
        Self {
            store,
            map,
            geocoder,
            composer,
            settings,
            user_location: RwLock::new(None),
            state: RwLock::new(SearchState::Idle),
            status: RwLock::new(Status::idle()),
            running: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SearchState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Status of the current or last search
    pub fn status(&self) -> Status {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user_location(&self) -> Option<GeoPoint> {
        *self.user_location.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the user's position and show it on the map
    pub fn locate_user(&self, point: GeoPoint, zoom: u8) -> MarkerHandle {
        *self
            .user_location
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(point);
        locate_user(self.map.as_ref(), point, zoom)
    }

    /// Search for facilities whose district contains `input`.
    pub async fn run(&self, input: &str) -> SearchReport {
        let mut report = SearchReport::new(input);
        let start = Instant::now();

        let Ok(_guard) = self.running.try_lock() else {
            warn!("Search for {:?} rejected: another search is running", input);
            report.outcome = Err(SearchError::Busy);
            report.status = Status::from_error(&SearchError::Busy);
            return report;
        };

        self.set_status(Status::searching());
        info!("Starting district search for {:?}", input);

        let outcome = self.execute(input, &mut report).await;
        report.outcome = outcome;
        report.elapsed = start.elapsed();
        report.status = Status::from_outcome(&report.outcome);

        match &report.outcome {
            Ok(count) => info!(
                "{} facilities located and drawn in {:?}",
                count, report.elapsed
            ),
            Err(e) => warn!("Search for {:?} ended: {}", input, e),
        }

        self.set_status(report.status.clone());
        self.set_state(SearchState::Done);
        report
    }

    async fn execute(&self, input: &str, report: &mut SearchReport) -> Result<usize, SearchError> {
        self.set_state(SearchState::Validating);
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SearchError::InputMissing);
        }
        let records = self.store.snapshot().ok_or(SearchError::StoreNotReady)?;

        self.set_state(SearchState::Filtering);
        let matches: Vec<FacilityRecord> = records
            .iter()
            .filter(|r| r.in_district(&needle))
            .cloned()
            .collect();
        info!(
            "{} of {} facilities match district {:?}",
            matches.len(),
            records.len(),
            needle
        );

        let cleared = clear_markers(self.map.as_ref(), MarkerKind::FacilityResult);
        debug!("Cleared {} markers from the previous search", cleared);

        if matches.is_empty() {
            return Err(SearchError::NoMatches(needle));
        }

        let total = matches.len();
        let user = self.user_location();
        let mut lookups = std::pin::pin!(paced_lookups(
            matches,
            self.geocoder.as_ref(),
            &self.composer,
            self.settings.pacing(),
        ));

        while let Some(attempt) = lookups.next().await {
            self.set_state(SearchState::Geocoding {
                index: attempt.index,
                total,
            });
            report.lookups += 1;

            let Some(point) = attempt.point else {
                report.missed.push(attempt.record);
                continue;
            };

            let marker = self.map.add_marker(
                point,
                MarkerKind::FacilityResult,
                attempt.record.label(),
            );
            if report.camera_target.is_none() {
                report.camera_target = Some(point);
            }
            report.located.push(LocatedFacility {
                name: attempt.record.name,
                district: attempt.record.district,
                point,
                marker,
                distance_km: user.map(|u| u.distance_km(&point)),
            });
        }

        let Some(target) = report.camera_target else {
            return Err(SearchError::NoneGeocoded(total));
        };
        self.map.set_view(target, self.settings.result_zoom);
        Ok(report.located.len())
    }

    fn set_state(&self, state: SearchState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn set_status(&self, status: Status) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}
