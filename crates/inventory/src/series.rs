//! Per-product demand series (historical + forecast).

use std::collections::BTreeMap;

use stockcast_core::{EngineError, EngineResult, ProductId};

use crate::record::DemandRecord;

/// Read-only view over loaded demand records.
///
/// Records are grouped per product and sorted by month on construction; input
/// order is never trusted. Equal months keep their input order (stable sort).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesStore {
    history: BTreeMap<ProductId, Vec<DemandRecord>>,
    forecast: BTreeMap<ProductId, Vec<DemandRecord>>,
}

impl TimeSeriesStore {
    pub fn new(
        history: impl IntoIterator<Item = DemandRecord>,
        forecast: impl IntoIterator<Item = DemandRecord>,
    ) -> Self {
        Self {
            history: group_sorted(history),
            forecast: group_sorted(forecast),
        }
    }

    /// Historical demand of a product, ascending by month.
    pub fn history_of(&self, product_id: &ProductId) -> EngineResult<&[DemandRecord]> {
        self.history
            .get(product_id)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::not_found(product_id))
    }

    /// Forecast demand of a product, ascending by month.
    ///
    /// Requires history (a product without history cannot be seeded). An
    /// empty slice is returned when the product has history but no forecast.
    pub fn forecast_of(&self, product_id: &ProductId) -> EngineResult<&[DemandRecord]> {
        self.history_of(product_id)?;
        Ok(self
            .forecast
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Whether the product appears in either series.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.history.contains_key(product_id) || self.forecast.contains_key(product_id)
    }

    /// Every product seen in either series, sorted and deduplicated.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .history
            .keys()
            .chain(self.forecast.keys())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// All historical records, product by product.
    pub fn history_records(&self) -> impl Iterator<Item = &DemandRecord> {
        self.history.values().flatten()
    }

    /// All forecast records, product by product.
    pub fn forecast_records(&self) -> impl Iterator<Item = &DemandRecord> {
        self.forecast.values().flatten()
    }
}

fn group_sorted(records: impl IntoIterator<Item = DemandRecord>) -> BTreeMap<ProductId, Vec<DemandRecord>> {
    let mut grouped: BTreeMap<ProductId, Vec<DemandRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.product_id.clone())
            .or_default()
            .push(record);
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|r| r.year_month);
    }
    grouped
}
