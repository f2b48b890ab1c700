//! Batch planning over every product in a snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use stockcast_core::{EngineError, EngineResult, ProductId, RunId};
use stockcast_inventory::{InventoryPlanEntry, InventoryPlanner, InventoryRiskEntry, ProductOutcome};

use crate::cache::PlanCache;
use crate::dataset::{DatasetSnapshot, SnapshotVersion};

/// A product that could not be planned, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFailure {
    pub product_id: ProductId,
    pub error: EngineError,
}

/// Result of one batch run. Outcomes and failures are sorted by product.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: RunId,
    pub version: SnapshotVersion,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<Arc<ProductOutcome>>,
    pub failures: Vec<ProductFailure>,
}

impl BatchReport {
    pub fn plan_entries(&self) -> impl Iterator<Item = &InventoryPlanEntry> {
        self.outcomes.iter().map(|o| &o.plan)
    }

    pub fn risk_entries(&self) -> impl Iterator<Item = &InventoryRiskEntry> {
        self.outcomes.iter().map(|o| &o.risk)
    }

    pub fn outcome(&self, product_id: &ProductId) -> Option<&ProductOutcome> {
        self.outcomes
            .binary_search_by(|o| o.product_id().cmp(product_id))
            .ok()
            .map(|idx| self.outcomes[idx].as_ref())
    }

    pub fn failed_product_ids(&self) -> Vec<&ProductId> {
        self.failures.iter().map(|f| &f.product_id).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Plans every product of a snapshot.
///
/// Products are independent, so the map runs on the rayon pool unless
/// `sequential()` is requested; both give identical reports. A failing
/// product never aborts the others.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    planner: InventoryPlanner,
    cache: Option<Arc<PlanCache>>,
    parallel: bool,
}

impl BatchRunner {
    pub fn new(planner: InventoryPlanner) -> Self {
        Self {
            planner,
            cache: None,
            parallel: true,
        }
    }

    pub fn with_cache(mut self, cache: Arc<PlanCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn planner(&self) -> &InventoryPlanner {
        &self.planner
    }

    /// Plan one product, going through the cache when one is attached.
    ///
    /// A product whose stock state was rejected at load time fails with that
    /// load error.
    pub fn plan_one(
        &self,
        snapshot: &DatasetSnapshot,
        product_id: &ProductId,
    ) -> EngineResult<Arc<ProductOutcome>> {
        if let Some(error) = snapshot.rejection(product_id) {
            return Err(error.clone());
        }
        let compute = || {
            self.planner
                .plan_product(snapshot.store(), snapshot.states(), product_id)
        };
        match &self.cache {
            Some(cache) => cache.get_or_compute(product_id, snapshot.version(), compute),
            None => compute().map(Arc::new),
        }
    }

    pub fn run(&self, snapshot: &DatasetSnapshot) -> BatchReport {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let span = info_span!("batch_run", run_id = %run_id, version = %snapshot.version());
        let _guard = span.enter();

        let ids = snapshot.product_ids();
        debug!(products = ids.len(), parallel = self.parallel, "planning products");

        let results: Vec<(ProductId, EngineResult<Arc<ProductOutcome>>)> = if self.parallel {
            ids.par_iter()
                .map(|id| (id.clone(), self.plan_one(snapshot, id)))
                .collect()
        } else {
            ids.iter()
                .map(|id| (id.clone(), self.plan_one(snapshot, id)))
                .collect()
        };

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (product_id, result) in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    warn!(product_id = %product_id, kind = error.kind(), error = %error, "product planning failed");
                    failures.push(ProductFailure { product_id, error });
                }
            }
        }

        info!(
            planned = outcomes.len(),
            failed = failures.len(),
            elapsed_ms = (Utc::now() - started_at).num_milliseconds(),
            "batch run finished"
        );

        BatchReport {
            run_id,
            version: snapshot.version(),
            started_at,
            outcomes,
            failures,
        }
    }
}
