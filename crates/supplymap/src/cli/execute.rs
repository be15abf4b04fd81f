//! Command execution logic.
//!
//! Every command loads the dataset through a [`Session`], so the tables are
//! read at most once per invocation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use colored::Colorize;

use super::args::{AnalyzeArgs, DiagnosticsArgs, ExportArgs, ImpactArgs, NodesArgs};
use crate::analysis::{nodes_by_size, resolve_focus, Query, Session};
use crate::config::Config;
use crate::diagnostics::DiagnosticsReport;
use crate::domain::{Node, NodeId};
use crate::export::{export_edges, ExportFormat};
use crate::graph::ReferencePolicy;
use crate::impact::compute_impact_metrics;
use crate::output::{self, OutputMode};

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    /// Merged configuration file values
    pub config: Config,
    /// Dataset session
    pub session: Session,
    /// Output format
    pub output_mode: OutputMode,
    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,
}

impl Context {
    /// Merge command-line overrides with the configuration file.
    ///
    /// The dataset is `--dataset`, else `dataset:` from the file, else the
    /// working directory. `--strict` forces [`ReferencePolicy::Reject`].
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or discovered config file is invalid.
    pub fn new(
        working_dir: &Path,
        config_path: Option<&Path>,
        dataset: Option<&Path>,
        strict: bool,
        output_mode: OutputMode,
    ) -> Result<Self> {
        let config = Config::discover(config_path, working_dir)?;

        let dataset = dataset
            .map(Path::to_path_buf)
            .or_else(|| config.dataset.clone())
            .map_or_else(|| working_dir.to_path_buf(), |d| working_dir.join(d));

        let policy = if strict {
            ReferencePolicy::Reject
        } else {
            config.graph.reference_policy
        };

        tracing::debug!(dataset = %dataset.display(), ?policy, "Resolved dataset");

        Ok(Self {
            config,
            session: Session::new(dataset, policy),
            output_mode,
            working_dir: working_dir.to_path_buf(),
        })
    }
}

/// Resolve a focus argument, warning (not failing) when nothing matches.
///
/// An unmatched focus is passed on as written so the analysis degrades to
/// its documented empty result.
fn focus_id(nodes: &[Node], input: &str) -> NodeId {
    resolve_focus(nodes, input).unwrap_or_else(|| {
        eprintln!(
            "{}: no node with id or label '{input}'; results will be empty",
            "warning".yellow().bold()
        );
        NodeId::new(input)
    })
}

/// Execute the analyze command
pub fn execute_analyze(ctx: &mut Context, args: &AnalyzeArgs) -> Result<()> {
    let tables = ctx.session.tables().context("failed to load dataset")?;

    let mut filter = ctx.config.analysis.view_filter();
    if let Some(view) = args.view {
        filter.mode = view.into();
    }
    if !args.region.is_empty() {
        filter.regions = Some(args.region.iter().cloned().collect::<BTreeSet<_>>());
    }
    if let Some(min_weight) = args.min_weight {
        filter.min_weight = min_weight;
    }

    let query = Query {
        focus: Some(focus_id(&tables.nodes, &args.focus)),
        depth: args.depth.map_or(ctx.config.analysis.depth, usize::from),
        filter,
    };

    let analysis = ctx.session.analyze(&query)?;
    output::print_analysis(&analysis, &tables.nodes, ctx.output_mode)?;
    Ok(())
}

/// Execute the impact command
pub fn execute_impact(ctx: &mut Context, args: &ImpactArgs) -> Result<()> {
    let tables = ctx.session.tables().context("failed to load dataset")?;
    let (graph, _) = tables.graph(ctx.session.policy())?;

    let focus = focus_id(&tables.nodes, &args.focus);
    let depth = args.depth.map_or(ctx.config.analysis.depth, usize::from);
    let impact = compute_impact_metrics(&graph, &tables.nodes, Some(&focus), depth);

    output::print_impact(&focus, depth, &impact, ctx.output_mode)?;
    Ok(())
}

/// Execute the nodes command
pub fn execute_nodes(ctx: &mut Context, args: &NodesArgs) -> Result<()> {
    let tables = ctx.session.tables().context("failed to load dataset")?;

    let mut nodes = nodes_by_size(&tables.nodes);
    if let Some(limit) = args.limit {
        nodes.truncate(limit);
    }

    output::print_nodes(&nodes, ctx.output_mode)?;
    Ok(())
}

/// Execute the diagnostics command
pub fn execute_diagnostics(ctx: &mut Context, args: &DiagnosticsArgs) -> Result<()> {
    let tables = ctx.session.tables().context("failed to load dataset")?;
    let edges = tables.edges();
    let (graph, _) = tables.graph(ctx.session.policy())?;

    let report = DiagnosticsReport::build(&tables.nodes, &edges, &graph, args.top);
    output::print_diagnostics(&report, &tables.warnings, ctx.output_mode)?;
    Ok(())
}

/// Execute the export command
pub fn execute_export(ctx: &mut Context, args: &ExportArgs) -> Result<()> {
    let tables = ctx.session.tables().context("failed to load dataset")?;
    let format = ExportFormat::from(args.format);

    let path = args.output.as_ref().map_or_else(
        || format.default_path(&ctx.working_dir),
        |p| ctx.working_dir.join(p),
    );

    let rows = export_edges(&path, &tables.edges(), format)
        .with_context(|| format!("failed to export edges to {}", path.display()))?;

    output::print_export(&path, rows, ctx.output_mode)?;
    Ok(())
}
