//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON. Text
//! printers write to any `Write` so they can be exercised in tests; the
//! `print_*` dispatchers lock stdout and pick the format.
//!
//! Submodules:
//! - [`color`]: semantic role colors and styling helpers

pub mod color;

use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::analysis::Analysis;
use crate::diagnostics::DiagnosticsReport;
use crate::domain::{Node, NodeId};
use crate::impact::ImpactMetrics;
use crate::roles::{Membership, Role};
use crate::tables::TableWarning;

pub use color::{error, info, warning};

use color::{bold, colorize_role, dimmed, membership_tag};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum line width for node listings.
    pub max_width: usize,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_colors: bool) -> Self {
        Self {
            max_width,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `SUPPLYMAP_MAX_WIDTH`: Maximum line width (default: 100)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `SUPPLYMAP_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("SUPPLYMAP_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "SUPPLYMAP_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        // Respect NO_COLOR (https://no-color.org/), with SUPPLYMAP_COLOR for explicit control
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("SUPPLYMAP_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_colors,
        }
    }

    /// The narrower of the terminal and the configured maximum.
    fn line_width(&self) -> usize {
        get_terminal_width().min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

/// Cut `text` to `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a full analysis.
///
/// `nodes` is the node table, used for labels and regions in text mode.
pub fn print_analysis(analysis: &Analysis, nodes: &[Node], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            write_analysis_text(&mut handle, analysis, nodes, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, analysis),
    }
}

/// Print impact metrics for one focus.
pub fn print_impact(
    focus: &NodeId,
    depth: usize,
    impact: &ImpactMetrics,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            write_impact_text(&mut handle, focus, depth, impact, &OutputConfig::from_env())
        }
        OutputMode::Json => {
            #[derive(Serialize)]
            struct ImpactJson<'a> {
                focus: &'a NodeId,
                depth: usize,
                #[serde(flatten)]
                impact: &'a ImpactMetrics,
            }
            write_json(
                &mut handle,
                &ImpactJson {
                    focus,
                    depth,
                    impact,
                },
            )
        }
    }
}

/// Print nodes in focus-picker order.
pub fn print_nodes(nodes: &[&Node], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_nodes_text(&mut handle, nodes, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &nodes),
    }
}

/// Print a diagnostics report, including any skipped table lines.
pub fn print_diagnostics(
    report: &DiagnosticsReport,
    warnings: &[TableWarning],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            write_diagnostics_text(&mut handle, report, warnings, &OutputConfig::from_env())
        }
        OutputMode::Json => {
            #[derive(Serialize)]
            struct DiagnosticsJson<'a> {
                #[serde(flatten)]
                report: &'a DiagnosticsReport,
                warnings: &'a [TableWarning],
            }
            write_json(&mut handle, &DiagnosticsJson { report, warnings })
        }
    }
}

/// Print the result of an export.
pub fn print_export(path: &Path, rows: usize, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => writeln!(handle, "Wrote {rows} edges to {}", path.display()),
        OutputMode::Json => {
            #[derive(Serialize)]
            struct ExportJson<'a> {
                path: &'a Path,
                rows: usize,
            }
            write_json(&mut handle, &ExportJson { path, rows })
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

/// Write an analysis as text.
pub fn write_analysis_text<W: Write>(
    w: &mut W,
    analysis: &Analysis,
    nodes: &[Node],
    config: &OutputConfig,
) -> io::Result<()> {
    let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();
    let width = config.line_width();

    let Some(focus) = &analysis.focus else {
        writeln!(
            w,
            "{}: no focus node; showing all {} nodes",
            color::warning("note", config),
            analysis.view.nodes.len()
        )?;
        return write_report_notes(w, analysis, config);
    };

    let focus_label = by_id.get(focus).map_or(focus.as_str(), |n| n.display_label());
    writeln!(
        w,
        "{} {} (depth {})",
        bold("Dependency analysis for", config),
        colorize_role(focus_label, Role::Focus, config),
        analysis.depth
    )?;
    writeln!(w)?;

    for (title, ids) in [("Upstream", &analysis.upstream), ("Downstream", &analysis.downstream)] {
        writeln!(w, "  {} ({}):", bold(title, config), ids.len())?;
        if ids.is_empty() {
            writeln!(w, "    {}", dimmed("(none)", config))?;
        }
        for id in ids {
            let membership = analysis
                .membership
                .get(id)
                .copied()
                .unwrap_or(Membership::Downstream);
            let line = node_line(id, by_id.get(id).copied());
            writeln!(
                w,
                "    {} {}",
                membership_tag(membership, config),
                truncate(&line, width.saturating_sub(16))
            )?;
        }
        writeln!(w)?;
    }

    write_impact_body(w, &analysis.impact, config)?;
    writeln!(w)?;
    writeln!(
        w,
        "  {}: {} nodes, {} edges visible (induced subgraph: {} nodes, {} edges)",
        dimmed("View", config),
        analysis.view.nodes.len(),
        analysis.view.edges.len(),
        analysis.subgraph_nodes,
        analysis.subgraph_edges
    )?;

    write_report_notes(w, analysis, config)
}

fn node_line(id: &NodeId, node: Option<&Node>) -> String {
    match node {
        Some(n) => match (&n.label, &n.region) {
            (Some(label), Some(region)) => format!("{id} {label} [{region}]"),
            (Some(label), None) => format!("{id} {label}"),
            (None, Some(region)) => format!("{id} [{region}]"),
            (None, None) => id.to_string(),
        },
        None => id.to_string(),
    }
}

fn write_report_notes<W: Write>(
    w: &mut W,
    analysis: &Analysis,
    config: &OutputConfig,
) -> io::Result<()> {
    let report = &analysis.report;
    if report.is_clean() {
        return Ok(());
    }
    writeln!(w)?;
    if !report.dropped_edges.is_empty() {
        writeln!(
            w,
            "{}: {} edges dropped while building the graph (run `diagnostics` for details)",
            color::warning("warning", config),
            report.dropped_edges.len()
        )?;
    }
    if !report.duplicate_nodes.is_empty() {
        writeln!(
            w,
            "{}: {} duplicate node ids, first row kept",
            color::warning("warning", config),
            report.duplicate_nodes.len()
        )?;
    }
    Ok(())
}

/// Write impact metrics as text.
pub fn write_impact_text<W: Write>(
    w: &mut W,
    focus: &NodeId,
    depth: usize,
    impact: &ImpactMetrics,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} (depth {depth})",
        bold("Impact of a disruption at", config),
        colorize_role(focus.as_str(), Role::Focus, config)
    )?;
    writeln!(w)?;
    write_impact_body(w, impact, config)
}

fn write_impact_body<W: Write>(
    w: &mut W,
    impact: &ImpactMetrics,
    config: &OutputConfig,
) -> io::Result<()> {
    let rows = [
        ("Upstream dependencies", impact.upstream_count.to_string()),
        ("Downstream impacts", impact.downstream_count.to_string()),
        ("Regions affected", impact.regions_affected.to_string()),
        ("Total downstream weight", format_weight(impact.downstream_weight)),
    ];
    for (label, value) in rows {
        writeln!(
            w,
            "  {}: {}",
            dimmed(&format!("{label:<24}"), config),
            color::info(&value, config)
        )?;
    }
    Ok(())
}

/// Render a weight without a trailing `.0` for whole numbers.
fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < 1e15 {
        format!("{weight:.0}")
    } else {
        format!("{weight}")
    }
}

/// Write nodes (id, label, region, size) one per line.
pub fn write_nodes_text<W: Write>(
    w: &mut W,
    nodes: &[&Node],
    config: &OutputConfig,
) -> io::Result<()> {
    if nodes.is_empty() {
        return writeln!(w, "No nodes found.");
    }
    let width = config.line_width();
    for node in nodes {
        let size = node.size.map_or_else(|| "-".to_string(), format_weight);
        let line = node_line(&node.id, Some(node));
        writeln!(
            w,
            "{} {}",
            dimmed(&format!("{size:>8}"), config),
            truncate(&line, width.saturating_sub(9))
        )?;
    }
    writeln!(w)?;
    writeln!(w, "{} nodes", nodes.len())
}

/// Write a diagnostics report as text.
pub fn write_diagnostics_text<W: Write>(
    w: &mut W,
    report: &DiagnosticsReport,
    warnings: &[TableWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    let s = &report.summary;
    writeln!(w, "{}", bold("Dataset diagnostics", config))?;
    writeln!(w)?;
    writeln!(w, "  {}: {} rows, {} in graph", dimmed("Nodes", config), s.node_count, s.graph_nodes)?;
    writeln!(w, "  {}: {} rows, {} in graph", dimmed("Edges", config), s.edge_count, s.graph_edges)?;
    if s.non_positive_edges > 0 {
        writeln!(
            w,
            "  {}: {} rows left out of the graph",
            dimmed("Non-positive weights", config),
            s.non_positive_edges
        )?;
    }
    writeln!(w, "  {}: {}", dimmed("Regions", config), s.region_count)?;

    write_id_section(w, "Nodes missing coordinates", &report.missing_coords, config)?;
    write_id_section(w, "Isolated nodes", &report.isolated_nodes, config)?;

    writeln!(w)?;
    writeln!(w, "{}:", bold("Weight distribution", config))?;
    for bucket in &report.weight_distribution {
        writeln!(w, "  {:>10}  {}", format_weight(bucket.weight), bucket.count)?;
    }

    writeln!(w)?;
    writeln!(w, "{}:", bold("Strongest edges", config))?;
    for edge in &report.strongest_edges {
        writeln!(
            w,
            "  {} -> {}  {}",
            color::info(edge.from.as_str(), config),
            color::info(edge.to.as_str(), config),
            edge.weight.map_or_else(|| "-".to_string(), format_weight)
        )?;
    }

    if !warnings.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", color::warning("Skipped lines", config))?;
        for warning in warnings {
            writeln!(w, "  {}: {}", warning.table, warning.message)?;
        }
    }
    Ok(())
}

fn write_id_section<W: Write>(
    w: &mut W,
    title: &str,
    ids: &[NodeId],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), ids.len())?;
    if ids.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
    }
    for id in ids {
        writeln!(w, "  {id}")?;
    }
    Ok(())
}
