//! Per-run outcomes and the batch report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Stage;
use crate::emit::EmitError;
use crate::encoder::EncodeError;
use crate::loader::LoadError;
use crate::types::Springback;
use crate::windowing::WindowPolicy;

/// Why a run (or one of its geometry variants) was not processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// A run folder, channel file, geometry file or merged table is absent
    MissingResource { path: PathBuf },
    /// The parameter table has no row for this run
    MissingMetadata,
    /// Channel files disagree on sample count
    InconsistentChannels { detail: String },
    /// The run has no samples to encode
    EmptyRun,
    /// Any other read or write failure
    Failed { detail: String },
}

impl SkipReason {
    /// Stable label for aggregation.
    pub const fn kind(&self) -> &'static str {
        match self {
            SkipReason::MissingResource { .. } => "missing_resource",
            SkipReason::MissingMetadata => "missing_metadata",
            SkipReason::InconsistentChannels { .. } => "inconsistent_channels",
            SkipReason::EmptyRun => "empty_run",
            SkipReason::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingResource { path } => write!(f, "missing {}", path.display()),
            SkipReason::MissingMetadata => f.write_str("no metadata row"),
            SkipReason::InconsistentChannels { detail } => write!(f, "inconsistent channels: {detail}"),
            SkipReason::EmptyRun => f.write_str("no samples"),
            SkipReason::Failed { detail } => f.write_str(detail),
        }
    }
}

impl From<LoadError> for SkipReason {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::MissingRunFolder(path)
            | LoadError::MissingFile(path)
            | LoadError::MissingParameterTable(path) => SkipReason::MissingResource { path },
            LoadError::MissingMetadata(_) => SkipReason::MissingMetadata,
            e @ LoadError::ChannelLengthMismatch { .. } => SkipReason::InconsistentChannels {
                detail: e.to_string(),
            },
            e @ (LoadError::MissingColumn { .. } | LoadError::Csv { .. }) => SkipReason::Failed {
                detail: e.to_string(),
            },
        }
    }
}

impl From<EncodeError> for SkipReason {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::EmptyRun => SkipReason::EmptyRun,
            e @ EncodeError::InvalidQuant(_) => SkipReason::Failed {
                detail: e.to_string(),
            },
        }
    }
}

impl From<EmitError> for SkipReason {
    fn from(err: EmitError) -> Self {
        SkipReason::Failed {
            detail: err.to_string(),
        }
    }
}

/// Window statistics produced for one geometry variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSummary {
    pub variant: Springback,
    /// Geometry samples in the table
    pub geometry_samples: usize,
    /// Non-empty windows (statistics rows)
    pub windows: usize,
}

/// What a processed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub samples: usize,
    pub coerced_cells: usize,
    pub variants: Vec<VariantSummary>,
    /// Geometry variants that could not be processed
    pub skipped_variants: Vec<(Springback, SkipReason)>,
    pub encoded: bool,
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Processed(RunSummary),
    Skipped { reason: SkipReason },
}

/// Outcome of one run id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub run_id: u32,
    #[serde(flatten)]
    pub status: RunStatus,
}

impl RunOutcome {
    pub const fn processed(run_id: u32, summary: RunSummary) -> Self {
        Self {
            run_id,
            status: RunStatus::Processed(summary),
        }
    }

    pub fn skipped(run_id: u32, reason: impl Into<SkipReason>) -> Self {
        Self {
            run_id,
            status: RunStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub const fn is_processed(&self) -> bool {
        matches!(self.status, RunStatus::Processed(_))
    }

    pub const fn summary(&self) -> Option<&RunSummary> {
        match &self.status {
            RunStatus::Processed(s) => Some(s),
            RunStatus::Skipped { .. } => None,
        }
    }

    pub const fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.status {
            RunStatus::Processed(_) => None,
            RunStatus::Skipped { reason } => Some(reason),
        }
    }
}

/// Aggregated result of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stage: Stage,
    pub method: WindowPolicy,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Sorted by run id
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_processed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.processed_count()
    }

    /// Skipped runs per reason kind.
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.outcomes.iter().filter_map(RunOutcome::skip_reason) {
            *counts.entry(reason.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Total geometry variants skipped inside processed runs.
    pub fn skipped_variant_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(RunOutcome::summary)
            .map(|s| s.skipped_variants.len())
            .sum()
    }

    pub fn outcome(&self, run_id: u32) -> Option<&RunOutcome> {
        self.outcomes.iter().find(|o| o.run_id == run_id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<RunOutcome>) -> BatchReport {
        let now = Utc::now();
        BatchReport {
            stage: Stage::All,
            method: WindowPolicy::MiddleSmall,
            started_at: now,
            finished_at: now,
            outcomes,
        }
    }

    #[test]
    fn counts_by_reason_kind() {
        let r = report(vec![
            RunOutcome::processed(1, RunSummary::default()),
            RunOutcome::skipped(2, LoadError::MissingMetadata(2)),
            RunOutcome::skipped(3, LoadError::MissingRunFolder("SIM_V12-03".into())),
            RunOutcome::skipped(4, LoadError::MissingFile("x.csv".into())),
            RunOutcome::skipped(5, EncodeError::EmptyRun),
        ]);

        assert_eq!(r.processed_count(), 1);
        assert_eq!(r.skipped_count(), 4);
        let counts = r.skip_counts();
        assert_eq!(counts.get("missing_resource"), Some(&2));
        assert_eq!(counts.get("missing_metadata"), Some(&1));
        assert_eq!(counts.get("empty_run"), Some(&1));
    }

    #[test]
    fn json_report_tags_status_and_reason() {
        let r = report(vec![RunOutcome::skipped(7, LoadError::MissingMetadata(7))]);
        let json = r.to_json().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let outcome = &value["outcomes"][0];
        assert_eq!(outcome["run_id"], 7);
        assert_eq!(outcome["status"], "skipped");
        assert_eq!(outcome["reason"]["kind"], "missing_metadata");
        assert_eq!(value["method"], "middle_small");
    }
}
