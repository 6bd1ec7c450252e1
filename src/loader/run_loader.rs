//! Merges the twelve per-channel files of a run into one [`Run`].

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{folder_name, parse_cell, semicolon_reader, LoadError, ParameterTable};
use crate::types::{RawChannel, Run, RAW_CHANNELS};

/// Loads runs from `<base_dir>/<prefix><id:02>/`.
#[derive(Debug, Clone)]
pub struct RunLoader {
    base_dir: PathBuf,
    folder_prefix: String,
}

/// One channel file: time column and value column.
struct ChannelSeries {
    time: Vec<f64>,
    values: Vec<f64>,
    coerced: usize,
}

impl RunLoader {
    pub fn new(base_dir: impl Into<PathBuf>, folder_prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            folder_prefix: folder_prefix.into(),
        }
    }

    /// Folder of `run_id`.
    pub fn run_dir(&self, run_id: u32) -> PathBuf {
        self.base_dir.join(folder_name(&self.folder_prefix, run_id))
    }

    /// Load and merge one run.
    ///
    /// Any missing channel file invalidates the whole run. Time is taken
    /// from the angle channel; every channel must have the same row count.
    pub fn load(&self, run_id: u32, parameters: &ParameterTable) -> Result<Run, LoadError> {
        let folder = folder_name(&self.folder_prefix, run_id);
        let dir = self.base_dir.join(&folder);
        if !dir.is_dir() {
            return Err(LoadError::MissingRunFolder(dir));
        }

        // Resolve every file first so a partial run is rejected before any
        // parsing work.
        let paths: Vec<PathBuf> = RAW_CHANNELS
            .iter()
            .map(|c| dir.join(c.file_name(&folder)))
            .collect();
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(LoadError::MissingFile(missing.clone()));
        }

        let metadata = parameters.metadata_for(run_id)?;

        let mut time = Vec::new();
        let mut channels = Vec::with_capacity(RAW_CHANNELS.len());
        let mut coerced_cells = 0;

        for (i, (channel, path)) in RAW_CHANNELS.iter().zip(&paths).enumerate() {
            let series = read_channel(path, channel)?;
            if i == 0 {
                time = series.time;
            } else if series.values.len() != time.len() {
                return Err(LoadError::ChannelLengthMismatch {
                    channel: channel.name,
                    expected: time.len(),
                    found: series.values.len(),
                });
            }
            coerced_cells += series.coerced;
            channels.push(series.values);
        }

        debug!(run = run_id, samples = time.len(), coerced_cells, "Loaded run");
        Ok(Run {
            id: run_id,
            time,
            channels,
            metadata,
            coerced_cells,
        })
    }
}

/// Read a `(time;value)` channel file, skipping its header row.
fn read_channel(path: &Path, channel: &RawChannel) -> Result<ChannelSeries, LoadError> {
    let mut rdr = semicolon_reader(path)?;
    let mut series = ChannelSeries {
        time: Vec::new(),
        values: Vec::new(),
        coerced: 0,
    };

    for record in rdr.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let t = cell(record.get(0), &mut series.coerced);
        let mut v = cell(record.get(1), &mut series.coerced);
        if channel.radians {
            v = v.to_degrees();
        }
        series.time.push(t);
        series.values.push(v);
    }

    Ok(series)
}

/// Numeric value of a cell; non-numeric or absent cells count as coerced 0.
fn cell(raw: Option<&str>, coerced: &mut usize) -> f64 {
    raw.and_then(parse_cell).unwrap_or_else(|| {
        *coerced += 1;
        0.0
    })
}
