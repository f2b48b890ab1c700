use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;

use stockcast_infra::dataset::{read_dataset_files, write_plan, write_risk};
use stockcast_infra::{ProjectionService, config};
use stockcast_inventory::InventoryPlanner;

const HISTORY_FILE: &str = "dfm.csv";
const FORECAST_FILE: &str = "future_forecast.csv";
const PLAN_FILE: &str = "inventory_plan.csv";
const RISK_FILE: &str = "inventory_risk.csv";

fn dir_from_env(key: &str) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or_else(|_| {
        tracing::warn!("{key} not set; using the current directory");
        PathBuf::from(".")
    })
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn main() -> anyhow::Result<()> {
    stockcast_observability::init();

    let data_dir = dir_from_env("STOCKCAST_DATA_DIR");
    let out_dir = dir_from_env("STOCKCAST_OUT_DIR");
    let config_file = std::env::var("STOCKCAST_CONFIG").ok().map(PathBuf::from);

    let engine_config =
        config::load(config_file.as_deref()).context("failed to load engine configuration")?;
    tracing::info!(
        lead_time_months = engine_config.reorder.lead_time_months,
        target_service_months = engine_config.reorder.target_service_months,
        critical_within_months = engine_config.risk.critical_within_months,
        high_within_months = engine_config.risk.high_within_months,
        medium_within_months = engine_config.risk.medium_within_months,
        "engine configured"
    );

    let (history, forecast) =
        read_dataset_files(&data_dir.join(HISTORY_FILE), &data_dir.join(FORECAST_FILE))
            .context("failed to load demand datasets")?;

    let service = ProjectionService::new(InventoryPlanner::new(engine_config)?);
    service.refresh(history, forecast);
    let report = service.run_batch();

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let plan_path = out_dir.join(PLAN_FILE);
    write_plan(create(&plan_path)?, report.plan_entries())
        .with_context(|| format!("failed to write {}", plan_path.display()))?;

    let risk_path = out_dir.join(RISK_FILE);
    write_risk(create(&risk_path)?, report.risk_entries())
        .with_context(|| format!("failed to write {}", risk_path.display()))?;

    if !report.is_complete() {
        let failed: Vec<String> = report
            .failed_product_ids()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        tracing::warn!(
            run_id = %report.run_id,
            failed = failed.len(),
            products = %failed.join(","),
            "some products could not be planned"
        );
    }

    tracing::info!(
        run_id = %report.run_id,
        planned = report.outcomes.len(),
        plan = %plan_path.display(),
        risk = %risk_path.display(),
        "inventory plan written"
    );

    Ok(())
}
