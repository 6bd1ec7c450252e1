//! Artifact writers.
//!
//! Every artifact is keyed by run id, so parallel runs never share a file.
//! Files are written next to their target and renamed into place, leaving
//! either the previous artifact or the complete new one if a batch is
//! interrupted.
//!
//! | artifact                               | contents                                  |
//! |----------------------------------------|-------------------------------------------|
//! | `Simulation_<id>.csv`                  | merged run table                          |
//! | `sim_<id>_<variant>_stats.csv`         | `Angle[degree]` + `_min`/`_max`/`_avg`    |
//! | `dta<id>.js`                           | `var <channel>=[...];` + `var info='...'` |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::encoder::EncodedChannels;
use crate::types::{
    Run, Springback, WindowStatistics, GEOMETRY_ANGLE_COLUMN, RAW_CHANNELS, TIME_COLUMN,
};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl EmitError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| EmitError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| EmitError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// `Simulation_<id>.csv`
pub fn merged_table_name(run_id: u32) -> String {
    format!("Simulation_{run_id}.csv")
}

/// `sim_<id>_<variant>_stats.csv`
pub fn stats_file_name(run_id: u32, variant: Springback) -> String {
    format!("sim_{run_id}_{}_stats.csv", variant.label())
}

/// `dta<id>.js`
pub fn script_file_name(run_id: u32) -> String {
    format!("dta{run_id}.js")
}

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), EmitError> {
    std::fs::create_dir_all(dir).map_err(EmitError::io(dir))
}

/// Write to `<path>.tmp`, then rename over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<PathBuf, EmitError>
where
    F: FnOnce(&mut BufWriter<File>, &Path) -> Result<(), EmitError>,
{
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = File::create(&tmp).map_err(EmitError::io(&tmp))?;
    let mut out = BufWriter::new(file);
    let result = write(&mut out, &tmp).and_then(|()| out.flush().map_err(EmitError::io(&tmp)));
    drop(out);

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path).map_err(EmitError::io(path))?;
    Ok(path.to_path_buf())
}

/// Write the merged run table: optional `Time`, the twelve raw channels,
/// then the metadata columns with their raw parameter-table text.
pub fn write_merged_table(dir: &Path, run: &Run, include_time: bool) -> Result<PathBuf, EmitError> {
    let path = dir.join(merged_table_name(run.id));
    write_atomic(&path, |out, tmp| {
        let mut w = csv::Writer::from_writer(out);

        let mut header: Vec<&str> = Vec::new();
        if include_time {
            header.push(TIME_COLUMN);
        }
        header.extend(RAW_CHANNELS.iter().map(|c| c.name));
        header.extend(run.metadata.iter().map(|m| m.name.as_str()));
        w.write_record(&header).map_err(EmitError::csv(tmp))?;

        let mut record: Vec<String> = Vec::with_capacity(header.len());
        for i in 0..run.len() {
            record.clear();
            if include_time {
                record.push(run.time[i].to_string());
            }
            record.extend(run.channels.iter().map(|c| c[i].to_string()));
            record.extend(run.metadata.iter().map(|m| m.raw.clone()));
            w.write_record(&record).map_err(EmitError::csv(tmp))?;
        }
        w.flush().map_err(EmitError::io(tmp))
    })
}

/// Write window statistics: `Angle[degree]`, then every column's `_min`,
/// then every `_max`, then every `_avg`.
pub fn write_window_stats(
    dir: &Path,
    run_id: u32,
    variant: Springback,
    stats: &WindowStatistics,
) -> Result<PathBuf, EmitError> {
    let path = dir.join(stats_file_name(run_id, variant));
    write_atomic(&path, |out, tmp| {
        let mut w = csv::Writer::from_writer(out);

        let mut header = vec![GEOMETRY_ANGLE_COLUMN.to_string()];
        for suffix in ["min", "max", "avg"] {
            header.extend(stats.columns.iter().map(|c| format!("{c}_{suffix}")));
        }
        w.write_record(&header).map_err(EmitError::csv(tmp))?;

        for row in &stats.rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.angle.to_string());
            record.extend(row.stats.iter().map(|s| s.min.to_string()));
            record.extend(row.stats.iter().map(|s| s.max.to_string()));
            record.extend(row.stats.iter().map(|s| s.avg.to_string()));
            w.write_record(&record).map_err(EmitError::csv(tmp))?;
        }
        w.flush().map_err(EmitError::io(tmp))
    })
}

/// Write the encoded channel script for the visualization client.
pub fn write_encoded_script(
    dir: &Path,
    run_id: u32,
    encoded: &EncodedChannels,
    caption: &str,
) -> Result<PathBuf, EmitError> {
    let path = dir.join(script_file_name(run_id));
    write_atomic(&path, |out, tmp| {
        render_script(out, encoded, caption).map_err(EmitError::io(tmp))
    })
}

/// Render the script body.
pub fn render_script<W: Write>(out: &mut W, encoded: &EncodedChannels, caption: &str) -> std::io::Result<()> {
    for channel in &encoded.channels {
        write!(out, "var {}=[", channel.name)?;
        for (i, v) in channel.values.iter().enumerate() {
            if i > 0 {
                out.write_all(b",")?;
            }
            write!(out, "{v}")?;
        }
        out.write_all(b"];\n")?;
    }
    write!(out, "var info='{caption}';")
}
