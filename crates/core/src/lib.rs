//! `stockcast-core` — shared building blocks for the projection engine.
//!
//! This crate contains **pure** primitives (no IO): identifiers, the calendar
//! month type and the error taxonomy.

pub mod error;
pub mod id;
pub mod month;

pub use error::{EngineError, EngineResult};
pub use id::{ProductId, RunId};
pub use month::YearMonth;
