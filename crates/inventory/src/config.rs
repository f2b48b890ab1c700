use serde::{Deserialize, Serialize};

use stockcast_core::EngineResult;

use crate::reorder::ReorderPolicy;
use crate::risk::RiskThresholds;

/// Tunables for planning: reorder window and risk tier boundaries.
///
/// Defaults: lead time 1 month, no safety buffer, tiers at 1/3/6 months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reorder: ReorderPolicy,
    pub risk: RiskThresholds,
}

impl EngineConfig {
    pub fn with_lead_time_months(mut self, months: u32) -> Self {
        self.reorder.lead_time_months = months;
        self
    }

    pub fn with_target_service_months(mut self, months: u32) -> Self {
        self.reorder.target_service_months = months;
        self
    }

    pub fn with_risk_thresholds(mut self, risk: RiskThresholds) -> Self {
        self.risk = risk;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.reorder.validate()?;
        self.risk.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_core::EngineError;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "reorder": { "lead_time_months": 3 } }"#).unwrap();
        assert_eq!(cfg.reorder.lead_time_months, 3);
        assert_eq!(cfg.reorder.target_service_months, 0);
        assert_eq!(cfg.risk, RiskThresholds::default());
    }

    #[test]
    fn builder_values_are_validated() {
        let err = EngineConfig::default()
            .with_lead_time_months(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
