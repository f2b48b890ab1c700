use serde::{Deserialize, Serialize};

use stockcast_core::{EngineError, EngineResult, ProductId, YearMonth};

/// One month of demand for one product (historical or forecast).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub product_id: ProductId,
    pub year_month: YearMonth,
    /// Negative values are allowed (returns increase stock).
    pub monthly_qty: f64,
}

impl DemandRecord {
    pub fn new(product_id: ProductId, year_month: YearMonth, monthly_qty: f64) -> Self {
        Self {
            product_id,
            year_month,
            monthly_qty,
        }
    }
}

/// Stock position of a product as of its last historical month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductState {
    pub product_id: ProductId,
    pub current_stock: f64,
    pub reorder_level: f64,
}

impl ProductState {
    /// Build a state, rejecting negative or non-finite levels.
    pub fn new(product_id: ProductId, current_stock: f64, reorder_level: f64) -> EngineResult<Self> {
        if !(current_stock.is_finite() && current_stock >= 0.0) {
            return Err(EngineError::malformed(format!(
                "product {product_id}: current_stock must be a finite non-negative number, got {current_stock}"
            )));
        }
        if !(reorder_level.is_finite() && reorder_level >= 0.0) {
            return Err(EngineError::malformed(format!(
                "product {product_id}: reorder_level must be a finite non-negative number, got {reorder_level}"
            )));
        }
        Ok(Self {
            product_id,
            current_stock,
            reorder_level,
        })
    }
}
