//! Configuration loading and representation.
//!
//! An `EngineConfig` is assembled from (lowest to highest precedence):
//! built-in defaults, an optional JSON file, and `STOCKCAST_*` environment
//! variables. The result is always validated before it is handed out.

use std::path::Path;

use tracing::debug;

use stockcast_core::{EngineError, EngineResult};
use stockcast_inventory::EngineConfig;

pub const ENV_LEAD_TIME_MONTHS: &str = "STOCKCAST_LEAD_TIME_MONTHS";
pub const ENV_SERVICE_MONTHS: &str = "STOCKCAST_SERVICE_MONTHS";
pub const ENV_RISK_CRITICAL_MONTHS: &str = "STOCKCAST_RISK_CRITICAL_MONTHS";
pub const ENV_RISK_HIGH_MONTHS: &str = "STOCKCAST_RISK_HIGH_MONTHS";
pub const ENV_RISK_MEDIUM_MONTHS: &str = "STOCKCAST_RISK_MEDIUM_MONTHS";

/// Parse a JSON config document. Missing fields keep their defaults.
pub fn from_json_str(json: &str) -> EngineResult<EngineConfig> {
    serde_json::from_str(json)
        .map_err(|e| EngineError::configuration(format!("invalid config JSON: {e}")))
}

pub fn from_json_file(path: &Path) -> EngineResult<EngineConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        EngineError::configuration(format!("cannot read config file {}: {e}", path.display()))
    })?;
    from_json_str(&text)
}

/// Apply overrides from a variable lookup (the process environment in
/// production, a map in tests).
pub fn apply_overrides<F>(mut config: EngineConfig, lookup: F) -> EngineResult<EngineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut u32); 5] = [
        (ENV_LEAD_TIME_MONTHS, &mut config.reorder.lead_time_months),
        (ENV_SERVICE_MONTHS, &mut config.reorder.target_service_months),
        (ENV_RISK_CRITICAL_MONTHS, &mut config.risk.critical_within_months),
        (ENV_RISK_HIGH_MONTHS, &mut config.risk.high_within_months),
        (ENV_RISK_MEDIUM_MONTHS, &mut config.risk.medium_within_months),
    ];

    for (key, slot) in targets {
        if let Some(raw) = lookup(key) {
            *slot = raw.trim().parse().map_err(|_| {
                EngineError::configuration(format!(
                    "{key} must be a non-negative whole number of months, got '{raw}'"
                ))
            })?;
            debug!(key = key, value = *slot, "config override applied");
        }
    }

    Ok(config)
}

/// Defaults, then the optional file, then the environment; validated.
pub fn load(file: Option<&Path>) -> EngineResult<EngineConfig> {
    let base = match file {
        Some(path) => from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let config = apply_overrides(base, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
