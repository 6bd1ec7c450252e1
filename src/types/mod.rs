//! Shared data structures for bend-forming run post-processing
//!
//! - Channel schemas: raw machine channels and canonical encoder channels
//! - Run: merged per-run time series plus broadcast metadata
//! - Geometry: before/after springback angle samples
//! - Stats: per-window min/max/mean summaries

mod channels;
mod geometry;
mod run;
mod stats;

pub use channels::*;
pub use geometry::*;
pub use run::*;
pub use stats::*;
