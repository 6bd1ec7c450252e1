//! Pipeline Configuration Module
//!
//! Dataset layout, run range and stage options loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `BENDFORM_CONFIG` environment variable (path to TOML file)
//! 2. `bendform.toml` in the current working directory
//! 3. Built-in defaults (values of the historical processing scripts)
//!
//! The loaded config is passed explicitly to the pipeline; there is no
//! process-wide config state.
//!
//! ```ignore
//! let config = PipelineConfig::load();
//! let report = Pipeline::new(config).run(Stage::All)?;
//! ```

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
