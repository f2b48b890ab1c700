//! Month-by-month inventory depletion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockcast_core::{EngineError, EngineResult, ProductId, YearMonth};

use crate::record::{DemandRecord, ProductState};
use crate::series::TimeSeriesStore;

/// One month of a projected trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub month: YearMonth,
    /// Forecast quantity consumed in this month.
    pub demand: f64,
    /// Stock left after this month's demand.
    pub projected_stock: f64,
}

/// Projected stock levels over a product's forecast horizon.
///
/// Invariant: `points[i].projected_stock == starting_stock - sum(demand[0..=i])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionTrajectory {
    pub product_id: ProductId,
    pub starting_stock: f64,
    pub reorder_level: f64,
    pub points: Vec<TrajectoryPoint>,
}

impl DepletionTrajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First forecast month, if any.
    pub fn horizon_start(&self) -> Option<YearMonth> {
        self.points.first().map(|p| p.month)
    }

    /// Index of the first point at or below zero.
    pub fn stockout_index(&self) -> Option<usize> {
        self.points.iter().position(|p| p.projected_stock <= 0.0)
    }

    /// Index of the first point at or below the reorder level.
    ///
    /// When the starting stock is already at or below the level this is the
    /// first forecast month.
    pub fn reorder_index(&self) -> Option<usize> {
        if !self.points.is_empty() && self.starting_stock <= self.reorder_level {
            return Some(0);
        }
        self.points
            .iter()
            .position(|p| p.projected_stock <= self.reorder_level)
    }

    pub fn stockout_month(&self) -> Option<YearMonth> {
        self.stockout_index().map(|i| self.points[i].month)
    }

    pub fn reorder_month(&self) -> Option<YearMonth> {
        self.reorder_index().map(|i| self.points[i].month)
    }

    /// Projected stock values only, in month order.
    pub fn levels(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.projected_stock).collect()
    }
}

/// Fold a (sorted) forecast against a product's stock state.
///
/// No look-ahead: each point depends only on the running total and the
/// current month's quantity.
pub fn simulate(state: &ProductState, forecast: &[DemandRecord]) -> DepletionTrajectory {
    let mut stock = state.current_stock;
    let points = forecast
        .iter()
        .map(|record| {
            stock -= record.monthly_qty;
            TrajectoryPoint {
                month: record.year_month,
                demand: record.monthly_qty,
                projected_stock: stock,
            }
        })
        .collect();

    DepletionTrajectory {
        product_id: state.product_id.clone(),
        starting_stock: state.current_stock,
        reorder_level: state.reorder_level,
        points,
    }
}

/// Projects trajectories from a store plus per-product stock states.
#[derive(Debug, Clone, Copy)]
pub struct DepletionSimulator<'a> {
    store: &'a TimeSeriesStore,
    states: &'a HashMap<ProductId, ProductState>,
}

impl<'a> DepletionSimulator<'a> {
    pub fn new(store: &'a TimeSeriesStore, states: &'a HashMap<ProductId, ProductState>) -> Self {
        Self { store, states }
    }

    /// Depletion trajectory of one product.
    ///
    /// Fails with `MissingProduct` when the product is unknown to the store or
    /// has no stock state.
    pub fn project(&self, product_id: &ProductId) -> EngineResult<DepletionTrajectory> {
        if !self.store.contains(product_id) {
            return Err(EngineError::missing_product(product_id));
        }
        let state = self
            .states
            .get(product_id)
            .ok_or_else(|| EngineError::missing_product(product_id))?;
        let forecast = self.store.forecast_of(product_id)?;
        Ok(simulate(state, forecast))
    }
}
