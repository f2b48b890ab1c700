//! CSV demand data loader.
//!
//! Expected columns (extra columns are ignored):
//!   history:  product_id, year_month, monthly_qty, current_stock, reorder_level
//!   forecast: product_id, year_month, monthly_qty

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use tracing::warn;

use stockcast_core::{EngineError, EngineResult, ProductId, YearMonth};
use stockcast_inventory::{DemandRecord, ProductState};

#[derive(Debug, Deserialize)]
struct HistoryRow {
    product_id: String,
    year_month: YearMonth,
    monthly_qty: f64,
    current_stock: f64,
    reorder_level: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastRow {
    product_id: String,
    year_month: YearMonth,
    monthly_qty: f64,
}

/// Parsed historical dataset: demand records plus the stock state per product.
///
/// Products whose latest row carries an invalid stock state land in
/// `rejected` instead of `states`; their demand records are still kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedHistory {
    pub records: Vec<DemandRecord>,
    pub states: HashMap<ProductId, ProductState>,
    pub rejected: HashMap<ProductId, EngineError>,
}

/// Load historical demand.
///
/// Each product's `ProductState` comes from its latest month; when a month is
/// repeated the later row wins. Unreadable rows fail the whole load, while an
/// out-of-contract stock state only rejects its own product.
pub fn load_history<R: Read>(reader: R) -> EngineResult<LoadedHistory> {
    let mut latest: HashMap<ProductId, (YearMonth, f64, f64, usize)> = HashMap::new();
    let mut records = Vec::new();

    for (line, row) in rows::<HistoryRow, R>(reader) {
        let row = row?;
        let product_id = parse_product_id(&row.product_id, line)?;
        let qty = finite_qty(row.monthly_qty, line)?;

        match latest.get(&product_id) {
            Some((month, ..)) if *month > row.year_month => {}
            _ => {
                latest.insert(
                    product_id.clone(),
                    (row.year_month, row.current_stock, row.reorder_level, line),
                );
            }
        }

        records.push(DemandRecord::new(product_id, row.year_month, qty));
    }

    let mut states = HashMap::with_capacity(latest.len());
    let mut rejected = HashMap::new();
    for (product_id, (_, stock, reorder, line)) in latest {
        match ProductState::new(product_id.clone(), stock, reorder) {
            Ok(state) => {
                states.insert(product_id, state);
            }
            Err(e) => {
                let error = at_line(line, e);
                warn!(product_id = %product_id, error = %error, "stock state rejected");
                rejected.insert(product_id, error);
            }
        }
    }

    Ok(LoadedHistory {
        records,
        states,
        rejected,
    })
}

/// Load forecast demand.
pub fn load_forecast<R: Read>(reader: R) -> EngineResult<Vec<DemandRecord>> {
    rows::<ForecastRow, R>(reader)
        .map(|(line, row)| -> EngineResult<DemandRecord> {
            let row = row?;
            let product_id = parse_product_id(&row.product_id, line)?;
            let qty = finite_qty(row.monthly_qty, line)?;
            Ok(DemandRecord::new(product_id, row.year_month, qty))
        })
        .collect()
}

/// Deserialize rows, tagging each with its 1-based CSV line (header is line 1).
fn rows<T, R>(reader: R) -> impl Iterator<Item = (usize, EngineResult<T>)>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<T>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2;
            (
                line,
                result.map_err(|e| EngineError::malformed(format!("line {line}: {e}"))),
            )
        })
}

fn parse_product_id(raw: &str, line: usize) -> EngineResult<ProductId> {
    raw.parse().map_err(|e| at_line(line, e))
}

fn finite_qty(qty: f64, line: usize) -> EngineResult<f64> {
    if qty.is_finite() {
        Ok(qty)
    } else {
        Err(EngineError::malformed(format!(
            "line {line}: monthly_qty must be numeric, got {qty}"
        )))
    }
}

fn at_line(line: usize, err: EngineError) -> EngineError {
    match err {
        EngineError::MalformedRecord(msg) => EngineError::malformed(format!("line {line}: {msg}")),
        other => other,
    }
}
