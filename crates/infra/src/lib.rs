//! Infrastructure layer: CSV datasets, snapshots, caching, batch runs, config.

pub mod batch;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod service;
pub mod views;

pub use batch::{BatchReport, BatchRunner, ProductFailure};
pub use cache::PlanCache;
pub use dataset::{DatasetError, DatasetSnapshot, SnapshotHandle, SnapshotVersion};
pub use service::ProjectionService;
pub use views::Dashboard;
