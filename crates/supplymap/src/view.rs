//! Presentation filtering of an analysis.
//!
//! A [`ViewFilter`] picks which traversal set(s) to show, restricts nodes
//! to a set of regions and hides light arcs. It never changes the
//! traversal or the metrics, only what a renderer is handed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Node, NodeId};
use crate::graph::SupplyGraph;
use crate::roles::{Role, RoleMap};
use crate::traversal::TraversalResult;

/// Default minimum arc weight shown.
pub const DEFAULT_MIN_WEIGHT: f64 = 1.0;

/// Which traversal set(s) are shown next to the focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Focus and its downstream set
    #[default]
    Downstream,
    /// Focus and its upstream set
    Upstream,
    /// Focus and both sets
    Both,
}

/// View settings for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ViewFilter {
    /// Set(s) to show
    pub mode: ViewMode,
    /// Allowed regions; `None` allows every node, even ones with no region
    pub regions: Option<BTreeSet<String>>,
    /// Arcs lighter than this are hidden
    pub min_weight: f64,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            mode: ViewMode::default(),
            regions: None,
            min_weight: DEFAULT_MIN_WEIGHT,
        }
    }
}

impl ViewFilter {
    fn allows_region(&self, node: &Node) -> bool {
        match (&self.regions, node.region.as_deref()) {
            (None, _) => true,
            (Some(allowed), Some(region)) => allowed.contains(region),
            (Some(_), None) => false,
        }
    }
}

/// A node as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleNode {
    /// Node id
    pub id: NodeId,
    /// Label, or the id when there is none
    pub label: String,
    /// Region, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// `(longitude, latitude)`, if both are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
    /// Role relative to the focus; `None` when no focus is in effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// An arc as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleEdge {
    /// Source id
    pub from: NodeId,
    /// Target id
    pub to: NodeId,
    /// Arc weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Edge type tag
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Active flag
    pub active: bool,
}

/// What survives the view filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct View {
    /// Visible nodes in graph order
    pub nodes: Vec<VisibleNode>,
    /// Visible arcs in graph order
    pub edges: Vec<VisibleEdge>,
}

/// Apply `filter` to the full graph around `focus`.
///
/// Visible ids are `{focus}` plus the set(s) chosen by the mode; when the
/// focus is unset or unknown every node is a visible id. Visible nodes are
/// the visible ids whose region is allowed. Visible arcs join two visible
/// nodes and weigh at least the minimum (a missing weight counts as 0).
#[must_use]
pub fn apply_view(
    graph: &SupplyGraph,
    focus: Option<&NodeId>,
    traversal: &TraversalResult,
    roles: &RoleMap,
    filter: &ViewFilter,
) -> View {
    let ids: BTreeSet<&NodeId> = match focus.filter(|f| graph.contains(f)) {
        Some(focus) => {
            let mut ids = BTreeSet::from([focus]);
            if matches!(filter.mode, ViewMode::Upstream | ViewMode::Both) {
                ids.extend(&traversal.upstream);
            }
            if matches!(filter.mode, ViewMode::Downstream | ViewMode::Both) {
                ids.extend(&traversal.downstream);
            }
            ids
        }
        None => graph.nodes().map(|n| &n.id).collect(),
    };

    let nodes: Vec<VisibleNode> = graph
        .nodes()
        .filter(|n| ids.contains(&n.id) && filter.allows_region(n))
        .map(|n| VisibleNode {
            id: n.id.clone(),
            label: n.display_label().to_string(),
            region: n.region.clone(),
            coordinates: n.coordinates(),
            role: roles.get(&n.id).copied(),
        })
        .collect();

    let shown: BTreeSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
    let edges: Vec<VisibleEdge> = graph
        .edges()
        .filter(|e| shown.contains(e.source) && shown.contains(e.target))
        .filter(|e| e.attrs.weight.unwrap_or(0.0) >= filter.min_weight)
        .map(|e| VisibleEdge {
            from: e.source.clone(),
            to: e.target.clone(),
            weight: e.attrs.weight,
            edge_type: e.attrs.edge_type.clone(),
            active: e.attrs.active,
        })
        .collect();

    tracing::debug!(
        mode = ?filter.mode,
        nodes = nodes.len(),
        edges = edges.len(),
        "Applied view filter"
    );

    View { nodes, edges }
}
