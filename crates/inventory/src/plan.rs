//! Per-product inventory plan and risk summaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockcast_core::{EngineResult, ProductId, YearMonth};

use crate::config::EngineConfig;
use crate::depletion::{DepletionSimulator, DepletionTrajectory};
use crate::record::ProductState;
use crate::risk::RiskLevel;
use crate::series::TimeSeriesStore;

/// Stockout/reorder timing and order size for one product.
///
/// Built by `InventoryPlanner::plan_entry`, which keeps the stockout month and
/// its month count consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPlanEntry {
    pub product_id: ProductId,
    pub current_stock: f64,
    pub stockout_month: Option<YearMonth>,
    pub reorder_month: Option<YearMonth>,
    pub recommended_reorder_qty: f64,
    months_to_stockout: Option<u32>,
}

impl InventoryPlanEntry {
    /// Calendar months from the horizon start to the stockout, where the
    /// first forecast month counts as 1.
    pub fn months_to_stockout(&self) -> Option<u32> {
        self.months_to_stockout
    }
}

/// Risk tier of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRiskEntry {
    pub product_id: ProductId,
    pub risk_level: RiskLevel,
}

/// Everything derived for one product in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOutcome {
    pub trajectory: DepletionTrajectory,
    pub plan: InventoryPlanEntry,
    pub risk: InventoryRiskEntry,
}

impl ProductOutcome {
    pub fn product_id(&self) -> &ProductId {
        &self.plan.product_id
    }
}

/// Turns trajectories into plan and risk entries under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct InventoryPlanner {
    config: EngineConfig,
}

impl InventoryPlanner {
    /// Fails with `Configuration` when the config does not validate.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn plan_entry(&self, trajectory: &DepletionTrajectory) -> InventoryPlanEntry {
        let stockout_month = trajectory.stockout_month();
        let months_to_stockout = match (trajectory.horizon_start(), stockout_month) {
            (Some(start), Some(stockout)) => u32::try_from(start.months_until(stockout) + 1).ok(),
            _ => None,
        };

        InventoryPlanEntry {
            product_id: trajectory.product_id.clone(),
            current_stock: trajectory.starting_stock,
            stockout_month,
            reorder_month: trajectory.reorder_month(),
            recommended_reorder_qty: self.config.reorder.recommend(trajectory),
            months_to_stockout,
        }
    }

    pub fn risk_entry(&self, plan: &InventoryPlanEntry) -> InventoryRiskEntry {
        InventoryRiskEntry {
            product_id: plan.product_id.clone(),
            risk_level: self.config.risk.classify(plan),
        }
    }

    pub fn outcome(&self, trajectory: DepletionTrajectory) -> ProductOutcome {
        let plan = self.plan_entry(&trajectory);
        let risk = self.risk_entry(&plan);
        ProductOutcome {
            trajectory,
            plan,
            risk,
        }
    }

    /// Project and summarise a single product.
    pub fn plan_product(
        &self,
        store: &TimeSeriesStore,
        states: &HashMap<ProductId, ProductState>,
        product_id: &ProductId,
    ) -> EngineResult<ProductOutcome> {
        let trajectory = DepletionSimulator::new(store, states).project(product_id)?;
        Ok(self.outcome(trajectory))
    }
}
