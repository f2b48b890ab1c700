//! CSV writers for the derived plan and risk tables.

use std::io::Write;

use serde::Serialize;

use stockcast_core::{ProductId, YearMonth};
use stockcast_inventory::{InventoryPlanEntry, InventoryRiskEntry, RiskLevel};

use super::error::DatasetError;

#[derive(Debug, Serialize)]
struct PlanRow<'a> {
    product_id: &'a ProductId,
    current_stock: f64,
    stockout_month: Option<YearMonth>,
    reorder_month: Option<YearMonth>,
    recommended_reorder_qty: f64,
}

#[derive(Debug, Serialize)]
struct RiskRow<'a> {
    product_id: &'a ProductId,
    risk_level: RiskLevel,
}

/// Write the inventory plan table. Absent months become empty cells.
pub fn write_plan<'a, W: Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a InventoryPlanEntry>,
) -> Result<(), DatasetError> {
    let mut out = csv::Writer::from_writer(writer);
    for e in entries {
        out.serialize(PlanRow {
            product_id: &e.product_id,
            current_stock: e.current_stock,
            stockout_month: e.stockout_month,
            reorder_month: e.reorder_month,
            recommended_reorder_qty: e.recommended_reorder_qty,
        })?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the inventory risk table.
pub fn write_risk<'a, W: Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a InventoryRiskEntry>,
) -> Result<(), DatasetError> {
    let mut out = csv::Writer::from_writer(writer);
    for e in entries {
        out.serialize(RiskRow {
            product_id: &e.product_id,
            risk_level: e.risk_level,
        })?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use stockcast_inventory::{DemandRecord, EngineConfig, InventoryPlanner, ProductState, simulate};

    fn plan(pid: &str, stock: f64, reorder: f64, qtys: &[f64]) -> InventoryPlanEntry {
        let state = ProductState::new(ProductId::new(pid), stock, reorder).unwrap();
        let mut month: YearMonth = "2024-01".parse().unwrap();
        let forecast: Vec<DemandRecord> = qtys
            .iter()
            .map(|q| {
                let rec = DemandRecord::new(ProductId::new(pid), month, *q);
                month = month.succ();
                rec
            })
            .collect();
        InventoryPlanner::new(EngineConfig::default().with_lead_time_months(2))
            .unwrap()
            .plan_entry(&simulate(&state, &forecast))
    }

    #[test]
    fn plan_rows_leave_absent_months_empty() {
        let entries = vec![
            plan("1", 100.0, 20.0, &[30.0, 30.0, 30.0, 30.0]),
            plan("2", 50.0, 10.0, &[5.0, 5.0, 5.0]),
        ];

        let mut buf = Vec::new();
        write_plan(&mut buf, &entries).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "product_id,current_stock,stockout_month,reorder_month,recommended_reorder_qty",
                "1,100.0,2024-04,2024-03,60.0",
                "2,50.0,,,0.0",
            ]
        );
    }

    #[test]
    fn risk_rows_use_tier_names() {
        let entries = vec![InventoryRiskEntry {
            product_id: ProductId::new("9"),
            risk_level: RiskLevel::Critical,
        }];

        let mut buf = Vec::new();
        write_risk(&mut buf, &entries).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "product_id,risk_level\n9,Critical\n"
        );
    }
}
