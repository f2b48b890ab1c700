//! Reorder quantity recommendation.

use serde::{Deserialize, Serialize};

use stockcast_core::{EngineError, EngineResult};

use crate::depletion::DepletionTrajectory;

/// Window used to size a replenishment order.
///
/// The order covers forecast demand from the reorder month for
/// `lead_time_months`, plus `target_service_months` of safety buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderPolicy {
    pub lead_time_months: u32,
    pub target_service_months: u32,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            lead_time_months: 1,
            target_service_months: 0,
        }
    }
}

impl ReorderPolicy {
    pub fn new(lead_time_months: u32, target_service_months: u32) -> EngineResult<Self> {
        let policy = Self {
            lead_time_months,
            target_service_months,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.lead_time_months == 0 {
            return Err(EngineError::configuration(
                "lead_time_months must be positive",
            ));
        }
        Ok(())
    }

    /// Number of forecast months the order must cover.
    pub fn coverage_months(&self) -> usize {
        self.lead_time_months as usize + self.target_service_months as usize
    }

    pub fn recommend(&self, trajectory: &DepletionTrajectory) -> f64 {
        recommend(trajectory, self.lead_time_months, self.target_service_months)
    }
}

/// Recommended reorder quantity for a trajectory.
///
/// Zero when the reorder level is never reached. Otherwise the forecast demand
/// summed over `lead_time_months + target_service_months` calendar months
/// starting at the reorder month, truncated at the end of the horizon and
/// floored at zero.
pub fn recommend(
    trajectory: &DepletionTrajectory,
    lead_time_months: u32,
    target_service_months: u32,
) -> f64 {
    let Some(start) = trajectory.reorder_index() else {
        return 0.0;
    };

    // Calendar window [reorder_month, reorder_month + span); missing forecast
    // months contribute nothing.
    let reorder_month = trajectory.points[start].month;
    let span = i64::from(lead_time_months) + i64::from(target_service_months);
    let demand: f64 = trajectory.points[start..]
        .iter()
        .take_while(|p| reorder_month.months_until(p.month) < span)
        .map(|p| p.demand)
        .sum();

    demand.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depletion::simulate;
    use crate::record::{DemandRecord, ProductState};
    use proptest::prelude::*;
    use stockcast_core::{ProductId, YearMonth};

    fn trajectory(stock: f64, reorder: f64, qtys: &[f64]) -> DepletionTrajectory {
        let state = ProductState::new(ProductId::new("p"), stock, reorder).unwrap();
        let mut month: YearMonth = "2024-01".parse().unwrap();
        let forecast: Vec<DemandRecord> = qtys
            .iter()
            .map(|q| {
                let rec = DemandRecord::new(ProductId::new("p"), month, *q);
                month = month.succ();
                rec
            })
            .collect();
        simulate(&state, &forecast)
    }

    #[test]
    fn covers_lead_time_from_reorder_month() {
        // Reorder at index 2; lead time 2 covers indices 2 and 3.
        let t = trajectory(100.0, 20.0, &[30.0, 30.0, 30.0, 30.0]);
        assert_eq!(recommend(&t, 2, 0), 60.0);
        assert_eq!(recommend(&t, 1, 0), 30.0);
    }

    #[test]
    fn service_months_extend_the_window() {
        let t = trajectory(100.0, 60.0, &[10.0, 20.0, 30.0, 40.0, 50.0]);
        // Reorder at index 2 (stock 40 <= 60).
        assert_eq!(t.reorder_index(), Some(2));
        assert_eq!(recommend(&t, 1, 1), 70.0);
    }

    #[test]
    fn window_is_truncated_at_horizon_end() {
        let t = trajectory(100.0, 20.0, &[30.0, 30.0, 30.0, 30.0]);
        assert_eq!(recommend(&t, 12, 6), 60.0);
    }

    #[test]
    fn window_counts_calendar_months_across_gaps() {
        let state = ProductState::new(ProductId::new("p"), 10.0, 5.0).unwrap();
        let forecast = vec![
            DemandRecord::new(ProductId::new("p"), "2024-01".parse().unwrap(), 10.0),
            DemandRecord::new(ProductId::new("p"), "2024-05".parse().unwrap(), 100.0),
        ];
        let t = simulate(&state, &forecast);

        assert_eq!(t.reorder_month(), Some("2024-01".parse().unwrap()));
        // [2024-01, 2024-03) holds only the January demand.
        assert_eq!(recommend(&t, 2, 0), 10.0);
        // Lead time plus service reaches May.
        assert_eq!(recommend(&t, 2, 3), 110.0);
    }

    #[test]
    fn no_reorder_means_no_order() {
        let t = trajectory(50.0, 10.0, &[5.0, 5.0, 5.0]);
        assert_eq!(recommend(&t, 3, 3), 0.0);
    }

    #[test]
    fn net_returns_never_order_negative_quantity() {
        let t = trajectory(5.0, 10.0, &[-20.0, 1.0]);
        assert_eq!(t.reorder_index(), Some(0));
        assert_eq!(recommend(&t, 2, 0), 0.0);
    }

    #[test]
    fn zero_lead_time_is_a_configuration_error() {
        assert!(matches!(
            ReorderPolicy::new(0, 2),
            Err(EngineError::Configuration(_))
        ));
        assert_eq!(ReorderPolicy::new(2, 1).unwrap().coverage_months(), 3);
    }

    proptest! {
        /// Property: the recommendation is zero whenever no reorder is triggered.
        #[test]
        fn zero_without_reorder_month(
            stock in 0u32..2_000,
            reorder in 0u32..500,
            qtys in prop::collection::vec(0u32..100, 0..12),
            lead in 1u32..6,
            service in 0u32..6
        ) {
            let qtys: Vec<f64> = qtys.into_iter().map(f64::from).collect();
            let t = trajectory(stock.into(), reorder.into(), &qtys);
            let qty = recommend(&t, lead, service);
            if t.reorder_index().is_none() {
                prop_assert_eq!(qty, 0.0);
            } else {
                prop_assert!(qty >= 0.0);
            }
        }
    }
}
