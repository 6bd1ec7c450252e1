//! bendform - bend-forming simulation post-processor
//!
//! # Usage
//!
//! ```bash
//! # Merge channel files, window statistics and encoded scripts for every run
//! bendform all
//!
//! # Only window statistics for runs 80..=95, wider window
//! bendform windows --start 80 --end 95 --method middle_large
//!
//! # Re-encode previously merged tables and keep a JSON report
//! bendform --report report.json encode --quant 200
//!
//! # Print the effective configuration
//! bendform config show
//! ```
//!
//! # Environment Variables
//!
//! - `BENDFORM_CONFIG`: Path to the TOML config (default: ./bendform.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bendform::config::PipelineConfig;
use bendform::pipeline::{Pipeline, Stage};
use bendform::windowing::WindowPolicy;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "bendform")]
#[command(about = "Bend-forming simulation post-processor")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides ./bendform.toml)
    #[arg(long, global = true, env = "BENDFORM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the batch report as JSON
    #[arg(long, global = true, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Merge the channel files of each run into Simulation_<id>.csv
    Prepare(RunArgs),

    /// Window statistics against both springback geometries
    Windows(RunArgs),

    /// Encode merged tables into dta<id>.js scripts
    Encode(RunArgs),

    /// Prepare, window and encode in one pass
    All(RunArgs),

    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(clap::Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
}

/// Per-batch overrides of config values.
#[derive(clap::Args, Debug)]
struct RunArgs {
    /// First run id
    #[arg(long)]
    start: Option<u32>,

    /// Last run id (inclusive)
    #[arg(long)]
    end: Option<u32>,

    /// Window policy (before, after, middle_small, middle_large, middle_extra_large)
    #[arg(long)]
    method: Option<WindowPolicy>,

    /// Quantization step
    #[arg(long)]
    quant: Option<i64>,

    /// Dataset root
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Output directory for merged tables and statistics
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output directory for encoded scripts
    #[arg(long, value_name = "DIR")]
    website_dir: Option<PathBuf>,

    /// Keep the Time column in merged tables and statistics
    #[arg(long)]
    keep_time: bool,
}

impl RunArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(start) = self.start {
            config.runs.start = start;
        }
        if let Some(end) = self.end {
            config.runs.end = end;
        }
        if let Some(method) = self.method {
            config.windowing.method = method;
        }
        if let Some(quant) = self.quant {
            config.encoder.quant = quant;
        }
        if let Some(dir) = self.base_dir {
            config.paths.base_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.paths.output_dir = dir;
        }
        if let Some(dir) = self.website_dir {
            config.paths.website_dir = dir;
        }
        if self.keep_time {
            config.prepare.keep_time = true;
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    // An explicit path must load; the search order only applies without one.
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::load(),
    };

    let (stage, overrides) = match args.command {
        SubCommand::Config(ConfigCommand::Show) => {
            print!("{}", config.to_toml().context("Failed to serialize config")?);
            return Ok(());
        }
        SubCommand::Prepare(a) => (Stage::Prepare, a),
        SubCommand::Windows(a) => (Stage::Windows, a),
        SubCommand::Encode(a) => (Stage::Encode, a),
        SubCommand::All(a) => (Stage::All, a),
    };
    overrides.apply(&mut config);

    let report = Pipeline::new(config)
        .run(stage)
        .with_context(|| format!("{stage} batch failed"))?;

    if let Some(path) = &args.report {
        let json = report.to_json().context("Failed to serialize batch report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "Batch report written");
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn run_args_override_config() {
        let args = CliArgs::parse_from([
            "bendform", "windows", "--start", "80", "--end", "95", "--method", "middle_large", "--keep-time",
        ]);
        let SubCommand::Windows(run_args) = args.command else {
            panic!("expected windows subcommand");
        };
        let mut config = PipelineConfig::default();
        run_args.apply(&mut config);
        assert_eq!(config.runs.ids(), 80..=95);
        assert_eq!(config.windowing.method, WindowPolicy::MiddleLarge);
        assert!(config.prepare.keep_time);
        assert_eq!(config.encoder.quant, 100);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let parsed = CliArgs::try_parse_from(["bendform", "all", "--method", "sideways"]);
        assert!(parsed.is_err());
    }
}
