//! Snapshot + cache + planner wired together.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use stockcast_core::{EngineResult, ProductId};
use stockcast_inventory::{DemandRecord, InventoryPlanner, ProductOutcome, ProductState, TimeSeriesStore};

use crate::batch::{BatchReport, BatchRunner};
use crate::cache::PlanCache;
use crate::dataset::{DatasetSnapshot, LoadedHistory, SnapshotHandle, SnapshotVersion};
use crate::views::Dashboard;

/// Entry point used by callers (CLI, presentation layer).
///
/// Holds the current dataset snapshot and memoizes per-product outcomes
/// against its version. A refresh swaps the snapshot and drops stale cache
/// entries; nothing else is mutable.
#[derive(Debug)]
pub struct ProjectionService {
    snapshots: SnapshotHandle,
    cache: Arc<PlanCache>,
    runner: BatchRunner,
}

impl ProjectionService {
    pub fn new(planner: InventoryPlanner) -> Self {
        let cache = Arc::new(PlanCache::new());
        Self {
            snapshots: SnapshotHandle::default(),
            runner: BatchRunner::new(planner).with_cache(Arc::clone(&cache)),
            cache,
        }
    }

    pub fn snapshot(&self) -> Arc<DatasetSnapshot> {
        self.snapshots.current()
    }

    pub fn version(&self) -> SnapshotVersion {
        self.snapshots.current().version()
    }

    /// Install new inputs; returns the new snapshot version.
    pub fn replace(
        &self,
        store: TimeSeriesStore,
        states: HashMap<ProductId, ProductState>,
    ) -> SnapshotVersion {
        let snapshot = self.snapshots.replace(store, states);
        self.evict_stale(snapshot.version());
        snapshot.version()
    }

    pub fn refresh(&self, history: LoadedHistory, forecast: Vec<DemandRecord>) -> SnapshotVersion {
        let snapshot = self.snapshots.refresh(history, forecast);
        self.evict_stale(snapshot.version());
        snapshot.version()
    }

    /// Trajectory, plan and risk of one product (memoized).
    pub fn project(&self, product_id: &ProductId) -> EngineResult<Arc<ProductOutcome>> {
        let snapshot = self.snapshots.current();
        self.runner.plan_one(&snapshot, product_id)
    }

    pub fn run_batch(&self) -> BatchReport {
        let snapshot = self.snapshots.current();
        self.runner.run(&snapshot)
    }

    /// Run a batch and wrap it with its snapshot for presentation queries.
    pub fn dashboard(&self) -> Dashboard {
        let snapshot = self.snapshots.current();
        let report = self.runner.run(&snapshot);
        Dashboard::new(snapshot, report)
    }

    fn evict_stale(&self, version: SnapshotVersion) {
        let before = self.cache.len();
        self.cache.retain_version(version);
        info!(
            version = %version,
            evicted = before.saturating_sub(self.cache.len()),
            "plan cache pruned"
        );
    }
}
