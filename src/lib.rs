//! bendform: bend-forming simulation post-processor
//!
//! Turns per-run tube-bending simulation output into analysis artifacts.
//!
//! ## Architecture
//!
//! - **Loader**: merges the per-channel files of a run with its parameter row
//! - **Windowing**: min/max/mean of every channel around each springback
//!   geometry angle
//! - **Encoder**: group-normalized, quantized, band-offset integer channels
//!   for the visualization client
//! - **Emit**: run-keyed CSV and script artifacts
//! - **Pipeline**: parallel batch over a run-id range with per-run outcomes

pub mod config;
pub mod emit;
pub mod encoder;
pub mod loader;
pub mod pipeline;
pub mod types;
pub mod windowing;

// Re-export configuration
pub use config::{ConfigError, PipelineConfig};

// Re-export commonly used types
pub use types::{GeometryTable, Run, SampleTable, Springback, Stat, WindowStatistics};

// Re-export stage entry points
pub use encoder::{encode, encode_with, ChannelMatrix, EncodeError, EncodedChannels};
pub use loader::{LoadError, ParameterTable, RunLoader};
pub use pipeline::{BatchReport, Pipeline, PipelineError, RunOutcome, SkipReason, Stage};
pub use windowing::{aggregate, WindowPolicy};
