//! Run and geometry loaders.
//!
//! Reads the on-disk simulation dataset:
//!
//! ```text
//! <base>/Parameter_Simulation_01.csv              one metadata row per run (index "No.")
//! <base>/SIM_V12-07/SIM_V12-07_<channel>.csv       (time;value) per raw channel
//! <base>/SIM_V12-07/SIM_V12-07_geometry_before_springback.csv
//! <base>/SIM_V12-07/SIM_V12-07_geometry_after_springback.csv
//! ```
//!
//! Every input table is `;`-delimited. Missing resources surface as
//! [`LoadError`] so the batch driver can skip the run and keep going.

mod geometry;
mod parameters;
mod run_loader;

pub use geometry::load_geometry;
pub use parameters::ParameterTable;
pub use run_loader::RunLoader;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("run folder not found: {0}")]
    MissingRunFolder(PathBuf),

    #[error("missing input file: {0}")]
    MissingFile(PathBuf),

    #[error("parameter table not found: {0}")]
    MissingParameterTable(PathBuf),

    #[error("column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("no metadata row for run {0}")]
    MissingMetadata(u32),

    #[error("channel {channel} has {found} rows, expected {expected}")]
    ChannelLengthMismatch {
        channel: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Run folder name, zero-padded to two digits (`SIM_V12-07`, `SIM_V12-120`).
pub fn folder_name(prefix: &str, run_id: u32) -> String {
    format!("{prefix}{run_id:02}")
}

/// Parse a numeric cell, returning `None` when it is not a number.
pub(crate) fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

fn semicolon_reader(path: &std::path::Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::ReaderBuilder::new()
        .delimiter(crate::config::defaults::INPUT_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}
