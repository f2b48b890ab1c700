//! Risk tier classification.

use serde::{Deserialize, Serialize};

use stockcast_core::{EngineError, EngineResult};

use crate::plan::InventoryPlanEntry;

/// Risk tier, ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    /// No stockout within the forecast horizon.
    None,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
        RiskLevel::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::None => "None",
        }
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RiskLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::malformed(format!("unknown risk level '{s}'")))
    }
}

/// Months-until-stockout boundaries for each tier (inclusive).
///
/// The first forecast month counts as 1 month out. A stockout at month `m`
/// is `Critical` when `m <= critical_within_months`, `High` when
/// `m <= high_within_months`, `Medium` when `m <= medium_within_months`,
/// `Low` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical_within_months: u32,
    pub high_within_months: u32,
    pub medium_within_months: u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_within_months: 1,
            high_within_months: 3,
            medium_within_months: 6,
        }
    }
}

impl RiskThresholds {
    pub fn new(critical: u32, high: u32, medium: u32) -> EngineResult<Self> {
        let thresholds = Self {
            critical_within_months: critical,
            high_within_months: high,
            medium_within_months: medium,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.critical_within_months == 0
            || self.high_within_months == 0
            || self.medium_within_months == 0
        {
            return Err(EngineError::configuration(
                "risk thresholds must be positive month counts",
            ));
        }
        if !(self.critical_within_months <= self.high_within_months
            && self.high_within_months <= self.medium_within_months)
        {
            return Err(EngineError::configuration(format!(
                "risk thresholds must be non-decreasing (critical={}, high={}, medium={})",
                self.critical_within_months, self.high_within_months, self.medium_within_months
            )));
        }
        Ok(())
    }

    /// Tier for a stockout `months` out (1-based), `None` if there is none.
    ///
    /// Checks run from the most urgent tier down, so a value sitting on a
    /// boundary lands in the more urgent tier.
    pub fn tier_for(&self, months: Option<u32>) -> RiskLevel {
        match months {
            None => RiskLevel::None,
            Some(m) if m <= self.critical_within_months => RiskLevel::Critical,
            Some(m) if m <= self.high_within_months => RiskLevel::High,
            Some(m) if m <= self.medium_within_months => RiskLevel::Medium,
            Some(_) => RiskLevel::Low,
        }
    }

    pub fn classify(&self, entry: &InventoryPlanEntry) -> RiskLevel {
        self.tier_for(entry.months_to_stockout())
    }
}
