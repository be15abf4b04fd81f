//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for supplymap using clap's derive API.
//!
//! # Commands
//!
//! - `analyze`: Upstream/downstream sets, roles, impact and the filtered view
//! - `impact`: Impact metrics only
//! - `nodes`: Nodes in focus-picker order
//! - `diagnostics`: Dataset health checks
//! - `export`: Write the edge list as JSONL or CSV
//!
//! # Global Flags
//!
//! - `-D/--dataset`, `-c/--config`: where to read from
//! - `--json`: Output in JSON format (applies to all commands)
//! - `-v`: More logging (repeatable)
//!
//! # Example
//!
//! ```bash
//! supplymap --dataset data/acme analyze "Smelter" --depth 2 --view both
//! supplymap impact N-12 --depth 3 --json
//! supplymap export --format csv --output edges.csv
//! ```

mod args;
mod execute;
mod types;
mod validators;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{AnalyzeArgs, DiagnosticsArgs, ExportArgs, ImpactArgs, NodesArgs};
pub use execute::Context;
pub use types::{ExportFormatArg, ViewModeArg};
pub use validators::{validate_focus, validate_min_weight, validate_region};

/// Supplymap - supply-chain dependency and disruption impact analysis
///
/// Reads a dataset directory (nodes.jsonl, matrix.jsonl and optionally
/// meta.jsonl and edges.jsonl) and answers "what does this node depend on,
/// and what breaks if it fails?"
#[derive(Parser, Debug)]
#[command(name = "supplymap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Dataset directory (defaults to `dataset:` in the config, then the current directory)
    #[arg(short = 'D', long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Configuration file (defaults to ./supplymap.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fail on edges that reference unknown nodes instead of skipping them
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze dependencies around a focus node
    ///
    /// Lists upstream suppliers and downstream dependents within the given
    /// depth, their roles, the impact metrics and what the view filter keeps.
    Analyze(AnalyzeArgs),

    /// Show disruption impact metrics for a focus node
    Impact(ImpactArgs),

    /// List nodes, largest first
    Nodes(NodesArgs),

    /// Check the dataset for missing coordinates, isolated nodes and weight outliers
    Diagnostics(DiagnosticsArgs),

    /// Export the edge list (matrix edges followed by user edges)
    Export(ExportArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Tracing filter directive for the `-v` count.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any configuration, loading, analysis or output error.
    pub fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let working_dir = std::env::current_dir()?;
        let mut ctx = Context::new(
            &working_dir,
            self.config.as_deref(),
            self.dataset.as_deref(),
            self.strict,
            output_mode,
        )?;

        match &self.command {
            Commands::Analyze(args) => execute::execute_analyze(&mut ctx, args),
            Commands::Impact(args) => execute::execute_impact(&mut ctx, args),
            Commands::Nodes(args) => execute::execute_nodes(&mut ctx, args),
            Commands::Diagnostics(args) => execute::execute_diagnostics(&mut ctx, args),
            Commands::Export(args) => execute::execute_export(&mut ctx, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["supplymap", "nodes", "--json", "-vv", "--dataset", "d"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_level(), "debug");
        assert_eq!(cli.dataset, Some(PathBuf::from("d")));
        assert!(matches!(cli.command, Commands::Nodes(_)));
    }

    #[test]
    fn test_parse_analyze_full() {
        let cli = Cli::try_parse_from([
            "supplymap",
            "analyze",
            "Smelter",
            "--depth",
            "3",
            "--view",
            "both",
            "--region",
            "EU,APAC",
            "--region",
            "NA",
            "--min-weight",
            "2.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.focus, "Smelter");
                assert_eq!(args.depth, Some(3));
                assert_eq!(args.view, Some(ViewModeArg::Both));
                assert_eq!(args.region, vec!["EU", "APAC", "NA"]);
                assert_eq!(args.min_weight, Some(2.5));
            }
            other => panic!("Expected Analyze command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_analyze_defaults_left_unset() {
        let cli = Cli::try_parse_from(["supplymap", "analyze", "A"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.depth, None);
                assert_eq!(args.view, None);
                assert!(args.region.is_empty());
                assert_eq!(args.min_weight, None);
            }
            other => panic!("Expected Analyze command, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["supplymap", "impact", "A", "--depth", "0"]).is_err());
        assert!(Cli::try_parse_from(["supplymap", "impact", "A", "--depth", "6"]).is_err());
        assert!(Cli::try_parse_from(["supplymap", "impact", "A", "--depth", "5"]).is_ok());
    }

    #[test]
    fn test_parse_export_and_diagnostics_defaults() {
        let cli = Cli::try_parse_from(["supplymap", "export"]).unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.format, ExportFormatArg::Jsonl);
                assert!(args.output.is_none());
            }
            other => panic!("Expected Export command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["supplymap", "diagnostics"]).unwrap();
        match cli.command {
            Commands::Diagnostics(args) => assert_eq!(args.top, 10),
            other => panic!("Expected Diagnostics command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_dataset_and_depth_flags_coexist() {
        let cli = Cli::try_parse_from(["supplymap", "-D", "data", "analyze", "A", "-d", "2"])
            .unwrap();
        assert_eq!(cli.dataset, Some(PathBuf::from("data")));
        match cli.command {
            Commands::Analyze(args) => assert_eq!(args.depth, Some(2)),
            other => panic!("Expected Analyze command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["supplymap", "impact", "A", "-d", "3", "-D", "data"])
            .unwrap();
        assert_eq!(cli.dataset, Some(PathBuf::from("data")));
        match cli.command {
            Commands::Impact(args) => assert_eq!(args.depth, Some(3)),
            other => panic!("Expected Impact command, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["supplymap"]).is_err());
    }

    #[test]
    fn test_blank_focus_rejected() {
        assert!(Cli::try_parse_from(["supplymap", "analyze", "  "]).is_err());
    }
}
