//! Inventory projection engine.
//!
//! This crate contains the planning rules, implemented purely as
//! deterministic logic (no IO, no logging, no storage):
//! demand series → depletion trajectory → reorder recommendation + risk tier.

pub mod config;
pub mod depletion;
pub mod plan;
pub mod record;
pub mod reorder;
pub mod risk;
pub mod series;

pub use config::EngineConfig;
pub use depletion::{DepletionSimulator, DepletionTrajectory, TrajectoryPoint, simulate};
pub use plan::{InventoryPlanEntry, InventoryPlanner, InventoryRiskEntry, ProductOutcome};
pub use record::{DemandRecord, ProductState};
pub use reorder::{ReorderPolicy, recommend};
pub use risk::{RiskLevel, RiskThresholds};
pub use series::TimeSeriesStore;
