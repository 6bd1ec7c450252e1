//! Batch driver.
//!
//! Runs are independent: each one is loaded, windowed and encoded on the
//! rayon pool and produces its own artifacts. A run that cannot be processed
//! is recorded as skipped with a reason and never stops the batch. Only a
//! missing parameter table or an unusable output directory aborts it.
//!
//! ```text
//! prepare  channel files + parameters ──► Simulation_<id>.csv
//! windows  run + geometry (x2)        ──► sim_<id>_<variant>_stats.csv
//! encode   Simulation_<id>.csv        ──► dta<id>.js
//! all      every step above, encoding the in-memory run
//! ```

mod report;

pub use report::{BatchReport, RunOutcome, RunStatus, RunSummary, SkipReason, VariantSummary};

use std::path::PathBuf;

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, PipelineConfig};
use crate::emit::{self, EmitError};
use crate::encoder::{self, ChannelMatrix};
use crate::loader::{self, LoadError, ParameterTable, RunLoader};
use crate::types::{Run, Springback};
use crate::windowing;

/// Which artifacts a batch produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prepare,
    Windows,
    Encode,
    All,
}

impl Stage {
    const fn loads_runs(self) -> bool {
        !matches!(self, Stage::Encode)
    }

    const fn writes_merged(self) -> bool {
        matches!(self, Stage::Prepare | Stage::All)
    }

    const fn windows(self) -> bool {
        matches!(self, Stage::Windows | Stage::All)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Windows => "windows",
            Stage::Encode => "encode",
            Stage::All => "all",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Batch-level failures. Per-run problems become [`SkipReason`]s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Shared read-only state of one batch.
struct BatchContext {
    loader: RunLoader,
    parameters: Option<ParameterTable>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every run id in the configured range.
    pub fn run(&self, stage: Stage) -> Result<BatchReport, PipelineError> {
        self.config.validate()?;
        let started_at = Utc::now();
        let paths = &self.config.paths;

        let parameters = if stage.loads_runs() {
            let table = ParameterTable::load(&self.config.parameter_path())?;
            info!(runs = table.len(), columns = table.columns().len(), "Parameter table loaded");
            Some(table)
        } else {
            None
        };

        if stage != Stage::Encode {
            emit::ensure_dir(&paths.output_dir)?;
        }
        if matches!(stage, Stage::Encode | Stage::All) {
            emit::ensure_dir(&paths.website_dir)?;
        }

        let ctx = BatchContext {
            loader: RunLoader::new(&paths.base_dir, &paths.folder_prefix),
            parameters,
        };

        info!(
            %stage,
            start = self.config.runs.start,
            end = self.config.runs.end,
            method = %self.config.windowing.method,
            "Starting batch"
        );

        let outcomes: Vec<RunOutcome> = self
            .config
            .runs
            .ids()
            .into_par_iter()
            .map(|run_id| self.process(&ctx, stage, run_id))
            .collect();

        let report = BatchReport {
            stage,
            method: self.config.windowing.method,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        let processed = report.processed_count();
        if processed == 0 {
            warn!(%stage, skipped = report.skipped_count(), "No run was processed");
        } else {
            info!(
                %stage,
                processed,
                skipped = report.skipped_count(),
                skipped_variants = report.skipped_variant_count(),
                elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
                "Batch complete"
            );
        }
        for (kind, count) in report.skip_counts() {
            info!(kind, count, "Skipped runs");
        }

        Ok(report)
    }

    fn process(&self, ctx: &BatchContext, stage: Stage, run_id: u32) -> RunOutcome {
        let result = if stage.loads_runs() {
            self.process_loaded(ctx, stage, run_id)
        } else {
            self.encode_merged(run_id)
        };

        match result {
            Ok(summary) => {
                debug!(run = run_id, artifacts = summary.artifacts.len(), "Run processed");
                RunOutcome::processed(run_id, summary)
            }
            Err(reason) => {
                warn!(run = run_id, kind = reason.kind(), %reason, "Run skipped");
                RunOutcome::skipped(run_id, reason)
            }
        }
    }

    /// `prepare`, `windows` and `all`: work from the raw channel files.
    fn process_loaded(&self, ctx: &BatchContext, stage: Stage, run_id: u32) -> Result<RunSummary, SkipReason> {
        let Some(parameters) = ctx.parameters.as_ref() else {
            return Err(SkipReason::MissingMetadata);
        };
        let run = ctx.loader.load(run_id, parameters)?;
        if run.is_empty() {
            return Err(SkipReason::EmptyRun);
        }
        if run.coerced_cells > 0 {
            debug!(run = run_id, cells = run.coerced_cells, "Non-numeric channel cells read as 0");
        }

        let mut summary = RunSummary {
            samples: run.len(),
            coerced_cells: run.coerced_cells,
            ..RunSummary::default()
        };

        let paths = &self.config.paths;
        if stage.writes_merged() && self.config.prepare.save_merged {
            let path = emit::write_merged_table(&paths.output_dir, &run, self.config.prepare.keep_time)?;
            summary.artifacts.push(path);
        }

        if stage.windows() {
            self.window_variants(&run, &mut summary)?;
        }

        if stage == Stage::All {
            let matrix = ChannelMatrix::from_run(&run);
            if matrix.coerced_cells() > 0 {
                debug!(run = run_id, cells = matrix.coerced_cells(), "Non-finite values encoded as 0");
            }
            summary.coerced_cells += matrix.coerced_cells();
            let path = self.encode_matrix(run_id, &matrix)?;
            summary.encoded = true;
            summary.artifacts.push(path);
        }

        Ok(summary)
    }

    /// Window statistics for both geometry variants. A variant whose
    /// geometry cannot be loaded is skipped on its own; a variant without a
    /// single non-empty window writes no file.
    fn window_variants(&self, run: &Run, summary: &mut RunSummary) -> Result<(), EmitError> {
        let paths = &self.config.paths;
        let policy = self.config.windowing.method;
        let table = run.sample_table(self.config.prepare.keep_time);

        for variant in Springback::ALL {
            let geometry = match loader::load_geometry(&paths.base_dir, &paths.folder_prefix, run.id, variant) {
                Ok(g) => g,
                Err(e) => {
                    warn!(run = run.id, %variant, error = %e, "Geometry variant skipped");
                    summary.skipped_variants.push((variant, e.into()));
                    continue;
                }
            };

            let stats = windowing::aggregate(&table, geometry.angles(), policy);
            if stats.len() < geometry.samples.len() {
                debug!(
                    run = run.id,
                    %variant,
                    empty = geometry.samples.len() - stats.len(),
                    "Geometry angles without samples in window"
                );
            }

            if stats.is_empty() {
                debug!(run = run.id, %variant, "No geometry angle selected any samples, statistics not written");
            } else if self.config.windowing.save_stats {
                let path = emit::write_window_stats(&paths.output_dir, run.id, variant, &stats)?;
                summary.artifacts.push(path);
            }
            summary.variants.push(VariantSummary {
                variant,
                geometry_samples: geometry.samples.len(),
                windows: stats.len(),
            });
        }
        Ok(())
    }

    /// `encode`: re-read a previously merged table.
    fn encode_merged(&self, run_id: u32) -> Result<RunSummary, SkipReason> {
        let source = self.merged_table_path(run_id);
        if !source.is_file() {
            return Err(SkipReason::MissingResource { path: source });
        }
        let matrix = ChannelMatrix::from_csv_path(&source).map_err(|e| SkipReason::Failed {
            detail: format!("reading {}: {e}", source.display()),
        })?;
        if matrix.coerced_cells() > 0 {
            debug!(run = run_id, cells = matrix.coerced_cells(), "Non-numeric cells encoded as 0");
        }

        let path = self.encode_matrix(run_id, &matrix)?;
        Ok(RunSummary {
            samples: matrix.len(),
            coerced_cells: matrix.coerced_cells(),
            encoded: true,
            artifacts: vec![path],
            ..RunSummary::default()
        })
    }

    fn encode_matrix(&self, run_id: u32, matrix: &ChannelMatrix) -> Result<PathBuf, SkipReason> {
        let encoded = encoder::encode_with(matrix, self.config.encoder.quant)?;
        let caption = encoder::caption(run_id, matrix.first_row());
        Ok(emit::write_encoded_script(
            &self.config.paths.website_dir,
            run_id,
            &encoded,
            &caption,
        )?)
    }

    fn merged_table_path(&self, run_id: u32) -> PathBuf {
        self.config.paths.output_dir.join(emit::merged_table_name(run_id))
    }
}
