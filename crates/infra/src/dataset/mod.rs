//! Input datasets: CSV loading, output export and versioned snapshots.

pub mod error;
pub mod export;
pub mod snapshot;
pub mod source;

pub use error::DatasetError;
pub use export::{write_plan, write_risk};
pub use snapshot::{DatasetSnapshot, SnapshotHandle, SnapshotVersion, read_dataset_files};
pub use source::{LoadedHistory, load_forecast, load_history};
