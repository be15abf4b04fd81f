//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation. Options left unset fall back to the
//! configuration file, then to built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use super::types::{ExportFormatArg, ViewModeArg};
use super::validators::{validate_focus, validate_min_weight, validate_region};
use crate::config::{MAX_DEPTH, MIN_DEPTH};
use crate::diagnostics::DEFAULT_STRONGEST_EDGES;

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Focus node, by id or label
    #[arg(value_parser = validate_focus)]
    pub focus: String,

    /// Degrees of separation to follow in each direction (1-5)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(MIN_DEPTH as i64..=MAX_DEPTH as i64))]
    pub depth: Option<u8>,

    /// Which side of the focus to show
    #[arg(long, value_enum)]
    pub view: Option<ViewModeArg>,

    /// Only show nodes in these regions (repeatable or comma-separated)
    #[arg(short, long, value_delimiter = ',', value_parser = validate_region)]
    pub region: Vec<String>,

    /// Hide edges lighter than this
    #[arg(short = 'w', long, value_parser = validate_min_weight)]
    pub min_weight: Option<f64>,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// Focus node, by id or label
    #[arg(value_parser = validate_focus)]
    pub focus: String,

    /// Degrees of separation to follow in each direction (1-5)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(MIN_DEPTH as i64..=MAX_DEPTH as i64))]
    pub depth: Option<u8>,
}

/// Arguments for the `nodes` command
#[derive(Parser, Debug, Clone)]
pub struct NodesArgs {
    /// Maximum number of nodes to list
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `diagnostics` command
#[derive(Parser, Debug, Clone)]
pub struct DiagnosticsArgs {
    /// Number of strongest edges to list
    #[arg(long, default_value_t = DEFAULT_STRONGEST_EDGES)]
    pub top: usize,
}

/// Arguments for the `export` command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: ExportFormatArg,

    /// Output file (defaults to EDGES.<format> in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
