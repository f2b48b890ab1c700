//! Read-only queries backing the dashboard pages.
//!
//! Nothing here renders anything; these return the records a presentation
//! layer needs for the product page, the risk overview and the raw table
//! previews. Unknown products and empty filters come back as `None` / empty.

use std::sync::Arc;

use serde::Serialize;

use stockcast_core::ProductId;
use stockcast_inventory::{
    DemandRecord, DepletionTrajectory, InventoryPlanEntry, InventoryRiskEntry, RiskLevel,
};

use crate::batch::BatchReport;
use crate::dataset::DatasetSnapshot;

/// Default row count for table previews.
pub const DEFAULT_PREVIEW_ROWS: usize = 200;

/// Everything shown for one product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView<'a> {
    pub product_id: &'a ProductId,
    pub history: &'a [DemandRecord],
    pub forecast: &'a [DemandRecord],
    pub reorder_level: f64,
    pub trajectory: &'a DepletionTrajectory,
    pub plan: &'a InventoryPlanEntry,
    pub risk: &'a InventoryRiskEntry,
}

/// First rows of each table.
#[derive(Debug, Clone, Serialize)]
pub struct TablePreview<'a> {
    pub history: Vec<&'a DemandRecord>,
    pub forecast: Vec<&'a DemandRecord>,
    pub plan: Vec<&'a InventoryPlanEntry>,
    pub risk: Vec<&'a InventoryRiskEntry>,
}

/// A batch report paired with the snapshot it was computed from.
#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Arc<DatasetSnapshot>,
    report: BatchReport,
}

impl Dashboard {
    pub fn new(snapshot: Arc<DatasetSnapshot>, report: BatchReport) -> Self {
        Self { snapshot, report }
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    /// Products with history, sorted (the product selector).
    pub fn product_ids(&self) -> Vec<&ProductId> {
        let mut ids: Vec<&ProductId> = self.snapshot.states().keys().collect();
        ids.sort();
        ids
    }

    pub fn product(&self, product_id: &ProductId) -> Option<ProductView<'_>> {
        let outcome = self.report.outcome(product_id)?;
        let state = self.snapshot.state_of(product_id)?;
        let store = self.snapshot.store();
        Some(ProductView {
            product_id: &outcome.plan.product_id,
            history: store.history_of(product_id).ok()?,
            forecast: store.forecast_of(product_id).ok()?,
            reorder_level: state.reorder_level,
            trajectory: &outcome.trajectory,
            plan: &outcome.plan,
            risk: &outcome.risk,
        })
    }

    /// Products per tier, most urgent first. Tiers with no products are omitted.
    pub fn risk_distribution(&self) -> Vec<(RiskLevel, usize)> {
        RiskLevel::ALL
            .into_iter()
            .map(|level| {
                let count = self
                    .report
                    .risk_entries()
                    .filter(|e| e.risk_level == level)
                    .count();
                (level, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Risk rows in one tier; `None` selects all of them.
    pub fn filter_by_risk(&self, level: Option<RiskLevel>) -> Vec<&InventoryRiskEntry> {
        self.report
            .risk_entries()
            .filter(|e| level.is_none_or(|l| e.risk_level == l))
            .collect()
    }

    pub fn preview(&self, rows: usize) -> TablePreview<'_> {
        let store = self.snapshot.store();
        TablePreview {
            history: store.history_records().take(rows).collect(),
            forecast: store.forecast_records().take(rows).collect(),
            plan: self.report.plan_entries().take(rows).collect(),
            risk: self.report.risk_entries().take(rows).collect(),
        }
    }
}
