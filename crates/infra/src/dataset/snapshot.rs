use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use stockcast_core::{EngineError, ProductId};
use stockcast_inventory::{DemandRecord, ProductState, TimeSeriesStore};

use super::error::DatasetError;
use super::source::{LoadedHistory, load_forecast, load_history};

/// Monotonic version of a loaded dataset. Used as the memoization key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(pub u64);

impl core::fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Immutable view of one load of the input datasets.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    version: SnapshotVersion,
    loaded_at: DateTime<Utc>,
    store: TimeSeriesStore,
    states: HashMap<ProductId, ProductState>,
    rejected: HashMap<ProductId, EngineError>,
}

impl DatasetSnapshot {
    pub fn new(
        version: SnapshotVersion,
        store: TimeSeriesStore,
        states: HashMap<ProductId, ProductState>,
    ) -> Self {
        Self {
            version,
            loaded_at: Utc::now(),
            store,
            states,
            rejected: HashMap::new(),
        }
    }

    /// Attach products whose stock state failed validation at load time.
    pub fn with_rejected(mut self, rejected: HashMap<ProductId, EngineError>) -> Self {
        self.rejected = rejected;
        self
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn states(&self) -> &HashMap<ProductId, ProductState> {
        &self.states
    }

    pub fn state_of(&self, product_id: &ProductId) -> Option<&ProductState> {
        self.states.get(product_id)
    }

    /// Load-time error of a product, if its stock state was rejected.
    pub fn rejection(&self, product_id: &ProductId) -> Option<&EngineError> {
        self.rejected.get(product_id)
    }

    /// Every product seen in either dataset.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.store.product_ids()
    }
}

/// Read both CSV files into (history, forecast).
pub fn read_dataset_files(
    history_path: &Path,
    forecast_path: &Path,
) -> Result<(LoadedHistory, Vec<DemandRecord>), DatasetError> {
    let history_file =
        File::open(history_path).map_err(|e| DatasetError::io(history_path, e))?;
    let forecast_file =
        File::open(forecast_path).map_err(|e| DatasetError::io(forecast_path, e))?;

    let history = load_history(history_file)?;
    let forecast = load_forecast(forecast_file)?;
    Ok((history, forecast))
}

/// Holder of the current snapshot.
///
/// Readers get an `Arc` to a complete snapshot and keep it for as long as they
/// need; a refresh swaps the whole dataset, never mutating one in use.
/// Versions are assigned under the write lock, so installs are totally
/// ordered and `current()` never goes back to an older version.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<DatasetSnapshot>>,
}

impl Default for SnapshotHandle {
    fn default() -> Self {
        Self::new(TimeSeriesStore::default(), HashMap::new())
    }
}

impl SnapshotHandle {
    /// Start at version 1 with the given data.
    pub fn new(store: TimeSeriesStore, states: HashMap<ProductId, ProductState>) -> Self {
        let first = DatasetSnapshot::new(SnapshotVersion(1), store, states);
        Self {
            current: RwLock::new(Arc::new(first)),
        }
    }

    pub fn current(&self) -> Arc<DatasetSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install new data as the next version and return it.
    pub fn replace(
        &self,
        store: TimeSeriesStore,
        states: HashMap<ProductId, ProductState>,
    ) -> Arc<DatasetSnapshot> {
        self.install(|version| DatasetSnapshot::new(version, store, states))
    }

    /// Install freshly loaded records as the next version.
    pub fn refresh(&self, history: LoadedHistory, forecast: Vec<DemandRecord>) -> Arc<DatasetSnapshot> {
        let store = TimeSeriesStore::new(history.records, forecast);
        self.install(|version| {
            DatasetSnapshot::new(version, store, history.states).with_rejected(history.rejected)
        })
    }

    fn install<F>(&self, build: F) -> Arc<DatasetSnapshot>
    where
        F: FnOnce(SnapshotVersion) -> DatasetSnapshot,
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let version = SnapshotVersion(guard.version.0 + 1);
        let snapshot = Arc::new(build(version));
        *guard = Arc::clone(&snapshot);
        drop(guard);

        info!(
            version = %version,
            products = snapshot.states.len(),
            rejected = snapshot.rejected.len(),
            "dataset snapshot replaced"
        );
        snapshot
    }

    /// Load both CSV files and install them. On failure the current snapshot
    /// stays in place.
    pub fn reload_from_files(
        &self,
        history_path: &Path,
        forecast_path: &Path,
    ) -> Result<Arc<DatasetSnapshot>, DatasetError> {
        let (history, forecast) = read_dataset_files(history_path, forecast_path)?;
        Ok(self.refresh(history, forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_core::YearMonth;

    fn loaded(pid: &str, stock: f64) -> LoadedHistory {
        let id = ProductId::new(pid);
        let mut states = HashMap::new();
        states.insert(id.clone(), ProductState::new(id.clone(), stock, 0.0).unwrap());
        LoadedHistory {
            records: vec![DemandRecord::new(id, "2024-01".parse::<YearMonth>().unwrap(), 1.0)],
            states,
            rejected: HashMap::new(),
        }
    }

    #[test]
    fn refresh_bumps_version_and_keeps_old_readers_intact() {
        let handle = SnapshotHandle::default();
        assert_eq!(handle.current().version(), SnapshotVersion(1));

        let before = handle.current();
        let after = handle.refresh(loaded("1", 10.0), vec![]);

        assert_eq!(after.version(), SnapshotVersion(2));
        assert_eq!(handle.current().version(), SnapshotVersion(2));
        // The reader that started earlier still sees its own data.
        assert!(before.states().is_empty());
        assert_eq!(handle.current().state_of(&ProductId::new("1")).unwrap().current_stock, 10.0);
    }

    #[test]
    fn missing_file_leaves_current_snapshot() {
        let handle = SnapshotHandle::default();
        handle.refresh(loaded("1", 10.0), vec![]);

        let err = handle
            .reload_from_files(Path::new("/nonexistent/history.csv"), Path::new("/nonexistent/forecast.csv"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert_eq!(handle.current().version(), SnapshotVersion(2));
    }

    #[test]
    fn concurrent_installs_hand_out_increasing_versions() {
        let handle = Arc::new(SnapshotHandle::default());

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..50 {
                        let installed = handle.replace(TimeSeriesStore::default(), HashMap::new());
                        // Whatever is current now is at least what this thread installed.
                        assert!(handle.current().version() >= installed.version());
                        seen.push(installed.version());
                    }
                    seen
                })
            })
            .collect();

        let mut versions: Vec<SnapshotVersion> = writers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        versions.sort();
        versions.dedup();

        assert_eq!(versions.len(), 400);
        assert_eq!(versions.first(), Some(&SnapshotVersion(2)));
        assert_eq!(versions.last(), Some(&SnapshotVersion(401)));
        assert_eq!(handle.current().version(), SnapshotVersion(401));
    }

    #[test]
    fn rejected_products_travel_with_the_snapshot() {
        let handle = SnapshotHandle::default();
        let mut history = loaded("1", 10.0);
        let bad = ProductId::new("2");
        history
            .rejected
            .insert(bad.clone(), EngineError::malformed("line 3: negative stock"));

        let snapshot = handle.refresh(history, vec![]);
        assert!(snapshot.rejection(&ProductId::new("1")).is_none());
        assert!(matches!(snapshot.rejection(&bad), Some(EngineError::MalformedRecord(_))));
    }
}
