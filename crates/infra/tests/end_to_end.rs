use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use stockcast_core::{EngineError, ProductId};
use stockcast_infra::dataset::{load_forecast, load_history, write_plan, write_risk};
use stockcast_infra::{ProjectionService, SnapshotVersion};
use stockcast_inventory::{EngineConfig, InventoryPlanner, RiskLevel};

const HISTORY: &str = "\
product_id,year_month,monthly_qty,current_stock,reorder_level
1,2023-11-01,25,120,20
1,2023-12-01,28,100,20
2,2023-12-01,4,50,10
3,2023-12-01,9,10,15
";

// Deliberately out of order; product 4 has no history.
const FORECAST: &str = "\
product_id,year_month,monthly_qty
1,2024-03-01,30
1,2024-01-01,30
1,2024-04-01,30
1,2024-02-01,30
2,2024-01-01,5
2,2024-02-01,5
2,2024-03-01,5
3,2024-01-01,1
4,2024-01-01,7
";

fn loaded_service(config: EngineConfig) -> ProjectionService {
    let service = ProjectionService::new(InventoryPlanner::new(config).unwrap());
    let history = load_history(HISTORY.as_bytes()).unwrap();
    let forecast = load_forecast(FORECAST.as_bytes()).unwrap();
    service.refresh(history, forecast);
    service
}

#[test]
fn csv_to_plan_and_risk_tables() {
    let service = loaded_service(EngineConfig::default().with_lead_time_months(2));
    let report = service.run_batch();

    assert_eq!(report.failed_product_ids(), vec![&ProductId::new("4")]);
    assert!(matches!(report.failures[0].error, EngineError::MissingProduct(_)));

    let one = report.outcome(&ProductId::new("1")).unwrap();
    assert_eq!(one.trajectory.levels(), vec![70.0, 40.0, 10.0, -20.0]);
    assert_eq!(one.plan.recommended_reorder_qty, 60.0);

    let three = report.outcome(&ProductId::new("3")).unwrap();
    assert_eq!(three.plan.reorder_month, Some("2024-01".parse().unwrap()));
    assert_eq!(three.risk.risk_level, RiskLevel::None);

    let mut plan = Vec::new();
    write_plan(&mut plan, report.plan_entries()).unwrap();
    assert_eq!(
        String::from_utf8(plan).unwrap(),
        "product_id,current_stock,stockout_month,reorder_month,recommended_reorder_qty\n\
         1,100.0,2024-04,2024-03,60.0\n\
         2,50.0,,,0.0\n\
         3,10.0,,2024-01,1.0\n"
    );

    let mut risk = Vec::new();
    write_risk(&mut risk, report.risk_entries()).unwrap();
    assert_eq!(
        String::from_utf8(risk).unwrap(),
        "product_id,risk_level\n1,Medium\n2,None\n3,None\n"
    );
}

#[test]
fn bad_stock_state_fails_one_product_not_the_load() {
    let history = "\
product_id,year_month,monthly_qty,current_stock,reorder_level
1,2023-12-01,28,100,20
2,2023-12-01,4,-1,10
";
    let service = ProjectionService::new(InventoryPlanner::new(EngineConfig::default()).unwrap());
    service.refresh(
        load_history(history.as_bytes()).unwrap(),
        load_forecast(FORECAST.as_bytes()).unwrap(),
    );
    let report = service.run_batch();

    assert!(report.outcome(&ProductId::new("1")).is_some());
    assert_eq!(report.failures[0].product_id, ProductId::new("2"));
    assert!(matches!(
        &report.failures[0].error,
        EngineError::MalformedRecord(msg) if msg.starts_with("line 3:")
    ));
    assert!(matches!(
        service.project(&ProductId::new("2")),
        Err(EngineError::MalformedRecord(_))
    ));
}

#[test]
fn thresholds_come_from_configuration() {
    let strict = EngineConfig::default()
        .with_risk_thresholds(stockcast_inventory::RiskThresholds::new(2, 4, 8).unwrap());
    let service = loaded_service(strict);

    let one = service.project(&ProductId::new("1")).unwrap();
    assert_eq!(one.risk.risk_level, RiskLevel::High);
}

#[test]
fn dashboard_queries_follow_the_batch() {
    let service = loaded_service(EngineConfig::default());
    let dashboard = service.dashboard();

    let ids: Vec<&str> = dashboard.product_ids().into_iter().map(ProductId::as_str).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(
        dashboard.risk_distribution(),
        vec![(RiskLevel::Medium, 1), (RiskLevel::None, 2)]
    );
    assert!(dashboard.product(&ProductId::new("4")).is_none());
}

#[test]
fn readers_see_whole_snapshots_during_refresh() {
    let service = Arc::new(loaded_service(EngineConfig::default()));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = service.snapshot();
                    let report = service.run_batch();
                    assert!(report.version >= snapshot.version());
                    // Every snapshot ever installed holds the same three products.
                    assert_eq!(snapshot.states().len(), 3);
                }
            })
        })
        .collect();

    for _ in 0..10 {
        let history = load_history(HISTORY.as_bytes()).unwrap();
        let forecast = load_forecast(FORECAST.as_bytes()).unwrap();
        service.refresh(history, forecast);
    }

    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(service.version(), SnapshotVersion(12));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: every planned product's trajectory has one point per
    /// forecast month, whatever order the CSV rows arrive in.
    #[test]
    fn trajectory_length_matches_forecast(
        qtys in prop::collection::vec((1u8..4, 0u32..200), 0..30)
    ) {
        let mut forecast = String::from("product_id,year_month,monthly_qty\n");
        let mut per_product = [0usize; 4];
        for (pid, qty) in &qtys {
            // Distinct months per product, written in reverse order.
            let idx = per_product[*pid as usize];
            per_product[*pid as usize] += 1;
            let year = 2030 - (idx / 12) as i32;
            let month = 12 - (idx % 12);
            forecast.push_str(&format!("{pid},{year}-{month:02},{qty}\n"));
        }

        let service = ProjectionService::new(InventoryPlanner::new(EngineConfig::default()).unwrap());
        service.refresh(
            load_history(HISTORY.as_bytes()).unwrap(),
            load_forecast(forecast.as_bytes()).unwrap(),
        );
        let report = service.run_batch();

        for outcome in &report.outcomes {
            let pid: usize = outcome.product_id().as_str().parse().unwrap();
            prop_assert_eq!(outcome.trajectory.len(), per_product[pid]);
            for pair in outcome.trajectory.points.windows(2) {
                prop_assert!(pair[0].month < pair[1].month);
            }
        }
    }
}
