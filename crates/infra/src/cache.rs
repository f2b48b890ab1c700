//! Memoized per-product outcomes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockcast_core::{EngineResult, ProductId};
use stockcast_inventory::ProductOutcome;

use crate::dataset::SnapshotVersion;

/// Outcome cache keyed by (product, snapshot version).
///
/// Entries are disposable: a new snapshot version simply misses, and
/// `retain_version` drops everything computed from older data. It also raises
/// the floor below which inserts are ignored, so a computation that started on
/// an older snapshot cannot repopulate the cache after a refresh. Failures are
/// never cached.
#[derive(Debug, Default)]
pub struct PlanCache {
    inner: RwLock<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    floor: Option<SnapshotVersion>,
    outcomes: HashMap<(ProductId, SnapshotVersion), Arc<ProductOutcome>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, product_id: &ProductId, version: SnapshotVersion) -> Option<Arc<ProductOutcome>> {
        let entries = self.inner.read().ok()?;
        entries.outcomes.get(&(product_id.clone(), version)).cloned()
    }

    pub fn insert(&self, version: SnapshotVersion, outcome: Arc<ProductOutcome>) {
        if let Ok(mut entries) = self.inner.write() {
            if entries.floor.is_some_and(|floor| version < floor) {
                return;
            }
            entries
                .outcomes
                .insert((outcome.product_id().clone(), version), outcome);
        }
    }

    /// Return the cached outcome, or compute, store and return it.
    pub fn get_or_compute<F>(
        &self,
        product_id: &ProductId,
        version: SnapshotVersion,
        compute: F,
    ) -> EngineResult<Arc<ProductOutcome>>
    where
        F: FnOnce() -> EngineResult<ProductOutcome>,
    {
        if let Some(hit) = self.get(product_id, version) {
            return Ok(hit);
        }
        let outcome = Arc::new(compute()?);
        self.insert(version, Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Drop every entry computed from a version older than `version` and
    /// refuse later inserts for those versions.
    pub fn retain_version(&self, version: SnapshotVersion) {
        if let Ok(mut entries) = self.inner.write() {
            let floor = entries.floor.map_or(version, |f| f.max(version));
            entries.floor = Some(floor);
            entries.outcomes.retain(|(_, v), _| *v >= floor);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|e| e.outcomes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
