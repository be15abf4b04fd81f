//! One request/response analysis over a dataset.
//!
//! Each [`analyze`] call rebuilds the graph from the tables, traverses,
//! classifies, measures and filters, and returns everything as a single
//! serializable [`Analysis`]. A [`Session`] adds the table cache so that
//! repeated queries against the same dataset skip disk reads.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::TableCache;
use crate::domain::{Node, NodeId};
use crate::error::Result;
use crate::graph::{BuildReport, ReferencePolicy};
use crate::impact::{compute_impact_metrics, ImpactMetrics};
use crate::roles::{classify_membership, classify_nodes, Membership, RoleMap};
use crate::tables::Tables;
use crate::traversal::traverse;
use crate::view::{apply_view, View, ViewFilter};

/// Default traversal depth.
pub const DEFAULT_DEPTH: usize = 1;

/// Inputs of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Focus node id; `None` analyses nothing and shows the whole graph
    pub focus: Option<NodeId>,
    /// Maximum hops in each direction
    pub depth: usize,
    /// Presentation filter
    pub filter: ViewFilter,
}

impl Query {
    /// A query for `focus` with default depth and filter.
    pub fn new(focus: impl Into<NodeId>) -> Self {
        Self {
            focus: Some(focus.into()),
            ..Self::default()
        }
    }

    /// Set the depth.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set the view filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ViewFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            focus: None,
            depth: DEFAULT_DEPTH,
            filter: ViewFilter::default(),
        }
    }
}

/// Everything computed for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Focus id, `None` when unset or not in the graph
    pub focus: Option<NodeId>,
    /// Depth used for both traversal and metrics
    pub depth: usize,
    /// Upstream set
    pub upstream: BTreeSet<NodeId>,
    /// Downstream set
    pub downstream: BTreeSet<NodeId>,
    /// Single role per node, downstream winning ties
    pub roles: RoleMap,
    /// Set membership with overlap kept as `both`
    pub membership: BTreeMap<NodeId, Membership>,
    /// Impact metrics
    pub impact: ImpactMetrics,
    /// Node count of the induced subgraph
    pub subgraph_nodes: usize,
    /// Arc count of the induced subgraph
    pub subgraph_edges: usize,
    /// Filtered nodes and arcs for display
    pub view: View,
    /// Rows the graph constructor left out
    pub report: BuildReport,
}

/// Run one analysis against in-memory tables.
///
/// # Errors
///
/// Returns [`Error::UnknownNodeReference`](crate::Error::UnknownNodeReference)
/// when `policy` is [`ReferencePolicy::Reject`] and an edge names an unknown
/// node. An unknown focus is not an error.
pub fn analyze(tables: &Tables, query: &Query, policy: ReferencePolicy) -> Result<Analysis> {
    let (graph, report) = tables.graph(policy)?;
    let focus = query.focus.as_ref().filter(|f| graph.contains(f));
    if focus.is_none() {
        if let Some(requested) = &query.focus {
            tracing::debug!(focus = %requested, "Focus node not found in graph");
        }
    }

    let traversal = traverse(&graph, focus, query.depth);
    let roles = classify_nodes(focus, &traversal.upstream, &traversal.downstream);
    let membership = classify_membership(focus, &traversal.upstream, &traversal.downstream);
    let impact = compute_impact_metrics(&graph, &tables.nodes, focus, query.depth);
    let view = apply_view(&graph, focus, &traversal, &roles, &query.filter);

    Ok(Analysis {
        focus: focus.cloned(),
        depth: query.depth,
        subgraph_nodes: traversal.subgraph.node_count(),
        subgraph_edges: traversal.subgraph.edge_count(),
        upstream: traversal.upstream,
        downstream: traversal.downstream,
        roles,
        membership,
        impact,
        view,
        report,
    })
}

/// Resolve user input to a node id: an exact id first, then a label.
///
/// Labels are matched exactly, then case-insensitively; the first matching
/// row in table order wins.
#[must_use]
pub fn resolve_focus(nodes: &[Node], input: &str) -> Option<NodeId> {
    let input = input.trim();
    nodes
        .iter()
        .find(|n| n.id.as_str() == input)
        .or_else(|| nodes.iter().find(|n| n.label.as_deref() == Some(input)))
        .or_else(|| {
            nodes.iter().find(|n| {
                n.label
                    .as_deref()
                    .is_some_and(|label| label.eq_ignore_ascii_case(input))
            })
        })
        .map(|n| n.id.clone())
}

/// Nodes in focus-picker order: largest size first, unsized nodes last.
///
/// The sort is stable, so equal sizes keep table order.
#[must_use]
pub fn nodes_by_size(nodes: &[Node]) -> Vec<&Node> {
    let mut sorted: Vec<&Node> = nodes.iter().collect();
    sorted.sort_by(|a, b| match (a.size, b.size) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

/// A dataset plus its table cache.
#[derive(Debug)]
pub struct Session {
    cache: TableCache,
    dataset: PathBuf,
    policy: ReferencePolicy,
}

impl Session {
    /// Open a session on a dataset directory. Nothing is read yet.
    pub fn new(dataset: impl Into<PathBuf>, policy: ReferencePolicy) -> Self {
        Self {
            cache: TableCache::new(),
            dataset: dataset.into(),
            policy,
        }
    }

    /// Dataset directory.
    #[must_use]
    pub fn dataset(&self) -> &Path {
        &self.dataset
    }

    /// Reference policy used for every graph build.
    #[must_use]
    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    /// Cached tables, loaded on first use.
    ///
    /// # Errors
    ///
    /// Propagates table loading errors.
    pub fn tables(&mut self) -> Result<Arc<Tables>> {
        self.cache.load(&self.dataset)
    }

    /// Re-read the dataset from disk.
    ///
    /// # Errors
    ///
    /// Propagates table loading errors.
    pub fn reload(&mut self) -> Result<Arc<Tables>> {
        self.cache.reload(&self.dataset)
    }

    /// `true` if the dataset files changed since they were loaded.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a dataset file cannot be read.
    pub fn is_stale(&self) -> Result<bool> {
        self.cache.is_stale(&self.dataset)
    }

    /// Run one analysis against the cached tables.
    ///
    /// # Errors
    ///
    /// Propagates table loading and graph build errors.
    pub fn analyze(&mut self, query: &Query) -> Result<Analysis> {
        let tables = self.tables()?;
        analyze(&tables, query, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeRecord, MatrixRow};
    use crate::roles::Role;

    fn tables() -> Tables {
        Tables::new(
            vec![
                Node::new("A").with_label("Mine").with_region("APAC").with_size(3.0),
                Node::new("B").with_label("Smelter").with_region("EU"),
                Node::new("C").with_label("Plant").with_region("EU").with_size(9.0),
                Node::new("D").with_label("Store").with_region("NA").with_size(3.0),
            ],
            vec![
                MatrixRow::new("A", [("B", 5.0)]),
                MatrixRow::new("B", [("C", 2.0), ("A", 1.0)]),
                MatrixRow::new("C", [("D", 4.0)]),
            ],
        )
    }

    #[test]
    fn analysis_bundles_every_stage() {
        let analysis = analyze(
            &tables(),
            &Query::new("B").with_depth(2),
            ReferencePolicy::Skip,
        )
        .unwrap();

        assert_eq!(analysis.focus, Some(NodeId::new("B")));
        assert_eq!(analysis.upstream, BTreeSet::from([NodeId::new("A")]));
        assert_eq!(
            analysis.downstream,
            BTreeSet::from([NodeId::new("A"), NodeId::new("C"), NodeId::new("D")])
        );
        assert_eq!(analysis.roles[&NodeId::new("A")], Role::Downstream);
        assert_eq!(analysis.membership[&NodeId::new("A")], Membership::Both);
        assert_eq!(analysis.impact.downstream_count, 3);
        assert_eq!(analysis.subgraph_nodes, 4);
        assert!(analysis.report.is_clean());
    }

    #[test]
    fn unknown_focus_degrades_to_empty_analysis() {
        let analysis = analyze(&tables(), &Query::new("Z"), ReferencePolicy::Skip).unwrap();

        assert_eq!(analysis.focus, None);
        assert!(analysis.upstream.is_empty() && analysis.downstream.is_empty());
        assert_eq!(analysis.impact, ImpactMetrics::default());
        assert_eq!(analysis.subgraph_nodes, 4);
        assert_eq!(analysis.view.nodes.len(), 4);
    }

    #[test]
    fn reject_policy_surfaces_unknown_references() {
        let tables = tables().with_user_edges(vec![EdgeRecord::new("A", "GHOST", 1.0)]);
        assert!(analyze(&tables, &Query::new("A"), ReferencePolicy::Reject).is_err());

        let skipped = analyze(&tables, &Query::new("A"), ReferencePolicy::Skip).unwrap();
        assert_eq!(skipped.report.dropped_edges.len(), 1);
    }

    #[test]
    fn focus_resolves_by_id_then_label() {
        let nodes = tables().nodes;
        assert_eq!(resolve_focus(&nodes, "C"), Some(NodeId::new("C")));
        assert_eq!(resolve_focus(&nodes, "Smelter"), Some(NodeId::new("B")));
        assert_eq!(resolve_focus(&nodes, " plant "), Some(NodeId::new("C")));
        assert_eq!(resolve_focus(&nodes, "Quarry"), None);
    }

    #[test]
    fn picker_order_is_size_descending_and_stable() {
        let nodes = tables().nodes;
        let order: Vec<&str> = nodes_by_size(&nodes).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "D", "B"]);
    }
}
