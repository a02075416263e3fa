//! In-memory facility store with an explicit load state.

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};

use super::{FeedLoader, FeedReport};
use crate::error::FeedError;
use crate::models::FacilityRecord;

/// Where the startup feed load stands
#[derive(Debug, Clone)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded(Arc<Vec<FacilityRecord>>),
    Failed(String),
}

/// Serializable summary of [`LoadState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    NotLoaded,
    Loading,
    Loaded { records: usize },
    Failed { reason: String },
}

/// Facility records shared between the loader and searches.
///
/// Written only by the loader. Searches take a cheap snapshot.
pub struct RecordStore {
    state: RwLock<LoadState>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LoadState::NotLoaded),
        }
    }

    /// Store pre-loaded with `records`
    pub fn with_records(records: Vec<FacilityRecord>) -> Self {
        Self {
            state: RwLock::new(LoadState::Loaded(Arc::new(records))),
        }
    }

    pub fn begin_loading(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = LoadState::Loading;
    }

    /// Publish the outcome of a feed load
    pub fn finish(&self, result: Result<FeedReport, FeedError>) {
        let next = match result {
            Ok(report) => {
                info!(
                    "{} facilities loaded from feed ({} rows skipped)",
                    report.records.len(),
                    report.skipped.len()
                );
                if report.records.is_empty() {
                    warn!("Feed contained no usable facility rows");
                }
                LoadState::Loaded(Arc::new(report.records))
            }
            Err(e) => {
                error!("Failed to load facility feed: {}", e);
                LoadState::Failed(e.to_string())
            }
        };

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Run a full load through `loader`, moving through `Loading` first
    pub async fn load_from(&self, loader: &FeedLoader, source: &str) {
        self.begin_loading();
        let result = loader.load(source).await;
        self.finish(result);
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            LoadState::NotLoaded => LoadStatus::NotLoaded,
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Loaded(records) => LoadStatus::Loaded {
                records: records.len(),
            },
            LoadState::Failed(reason) => LoadStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    /// Records available for searching. `None` unless loaded and non-empty.
    pub fn snapshot(&self) -> Option<Arc<Vec<FacilityRecord>>> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            LoadState::Loaded(records) if !records.is_empty() => Some(Arc::clone(records)),
            _ => None,
        }
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_not_ready() {
        let store = RecordStore::new();
        assert_eq!(store.status(), LoadStatus::NotLoaded);
        assert!(store.snapshot().is_none());

        store.begin_loading();
        assert_eq!(store.status(), LoadStatus::Loading);
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_finish_ok_publishes_records() {
        let store = RecordStore::new();
        store.begin_loading();
        store.finish(Ok(FeedReport {
            records: vec![FacilityRecord::new("CEBA Norte", "Lima").unwrap()],
            skipped: vec![],
        }));

        assert_eq!(store.status(), LoadStatus::Loaded { records: 1 });
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_finish_err_leaves_store_empty() {
        let store = RecordStore::new();
        store.finish(Err(FeedError::Status(reqwest::StatusCode::NOT_FOUND)));

        assert!(matches!(store.status(), LoadStatus::Failed { .. }));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_loaded_but_empty_is_not_ready() {
        let store = RecordStore::with_records(vec![]);
        assert_eq!(store.status(), LoadStatus::Loaded { records: 0 });
        assert!(store.snapshot().is_none());
    }
}
