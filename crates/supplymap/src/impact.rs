//! Disruption impact metrics for a focus node.
//!
//! The metrics recompute the traversal on their own rather than taking a
//! previous [`TraversalResult`](crate::traversal::TraversalResult), so
//! callers showing both must pass the same depth to each.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::{Node, NodeId};
use crate::graph::SupplyGraph;
use crate::traversal::{downstream_set, upstream_set};

/// Summary of what a disruption at the focus would touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImpactMetrics {
    /// Number of upstream nodes within the depth bound
    pub upstream_count: usize,
    /// Number of downstream nodes within the depth bound
    pub downstream_count: usize,
    /// Distinct regions among downstream nodes
    pub regions_affected: usize,
    /// Total weight on arcs from the focus or a downstream node into a downstream node
    pub downstream_weight: f64,
}

/// Compute impact metrics for `focus` at `max_depth`.
///
/// Regions are looked up in `nodes`; a downstream node with no row or no
/// region adds no region. Weight sums every arc `(u, v)` of the full graph
/// with `u` the focus or downstream and `v` downstream; an arc without a
/// weight adds 0. An unset or unknown focus yields all-zero metrics.
///
/// # Examples
///
/// ```
/// use supplymap::domain::{EdgeRecord, Node, NodeId};
/// use supplymap::graph::SupplyGraph;
/// use supplymap::impact::compute_impact_metrics;
///
/// let nodes = vec![
///     Node::new("A").with_region("EU"),
///     Node::new("B").with_region("EU"),
///     Node::new("C").with_region("NA"),
/// ];
/// let edges = vec![EdgeRecord::new("A", "B", 5.0), EdgeRecord::new("B", "C", 2.0)];
/// let graph = SupplyGraph::from_tables(&nodes, &edges);
///
/// let impact = compute_impact_metrics(&graph, &nodes, Some(&NodeId::new("A")), 2);
/// assert_eq!(impact.downstream_count, 2);
/// assert_eq!(impact.regions_affected, 2);
/// assert_eq!(impact.downstream_weight, 7.0);
/// ```
#[must_use]
pub fn compute_impact_metrics(
    graph: &SupplyGraph,
    nodes: &[Node],
    focus: Option<&NodeId>,
    max_depth: usize,
) -> ImpactMetrics {
    let Some(focus) = focus.filter(|f| graph.contains(f)) else {
        return ImpactMetrics::default();
    };

    let upstream = upstream_set(graph, focus, max_depth);
    let downstream = downstream_set(graph, focus, max_depth);

    let metrics = ImpactMetrics {
        upstream_count: upstream.len(),
        downstream_count: downstream.len(),
        regions_affected: regions_affected(nodes, &downstream),
        downstream_weight: downstream_weight(graph, focus, &downstream),
    };

    tracing::debug!(%focus, max_depth, ?metrics, "Computed impact metrics");
    metrics
}

/// Distinct non-missing regions among `ids`, looked up in the node table.
fn regions_affected(nodes: &[Node], ids: &BTreeSet<NodeId>) -> usize {
    let region_by_id: HashMap<&NodeId, &str> = nodes
        .iter()
        .filter_map(|n| n.region.as_deref().map(|r| (&n.id, r)))
        .collect();

    ids.iter()
        .filter_map(|id| region_by_id.get(id).copied())
        .collect::<BTreeSet<&str>>()
        .len()
}

/// Weight flowing within the downstream zone, including arcs out of the focus.
fn downstream_weight(graph: &SupplyGraph, focus: &NodeId, downstream: &BTreeSet<NodeId>) -> f64 {
    graph
        .edges()
        .filter(|e| (e.source == focus || downstream.contains(e.source)) && downstream.contains(e.target))
        .map(|e| e.attrs.weight.unwrap_or(0.0))
        .fold(0.0, |acc, w| acc + w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EdgeRecord;

    fn chain_nodes() -> Vec<Node> {
        vec![
            Node::new("A").with_region("EU"),
            Node::new("B").with_region("EU"),
            Node::new("C").with_region("APAC"),
            Node::new("D"),
        ]
    }

    fn chain_graph(nodes: &[Node]) -> SupplyGraph {
        SupplyGraph::from_tables(
            nodes,
            &[
                EdgeRecord::new("A", "B", 4.0),
                EdgeRecord::new("B", "C", 3.0),
                EdgeRecord::new("C", "D", 2.0),
            ],
        )
    }

    #[test]
    fn unknown_focus_yields_all_zero_metrics() {
        let nodes = chain_nodes();
        let graph = chain_graph(&nodes);

        let missing = compute_impact_metrics(&graph, &nodes, Some(&NodeId::new("Q")), 3);
        let unset = compute_impact_metrics(&graph, &nodes, None, 3);

        assert_eq!(missing, ImpactMetrics::default());
        assert_eq!(unset, ImpactMetrics::default());
    }

    #[test]
    fn counts_follow_depth() {
        let nodes = chain_nodes();
        let graph = chain_graph(&nodes);
        let b = NodeId::new("B");

        let shallow = compute_impact_metrics(&graph, &nodes, Some(&b), 1);
        assert_eq!(shallow.upstream_count, 1);
        assert_eq!(shallow.downstream_count, 1);
        assert_eq!(shallow.downstream_weight, 3.0);

        let deep = compute_impact_metrics(&graph, &nodes, Some(&b), 2);
        assert_eq!(deep.downstream_count, 2);
        assert_eq!(deep.downstream_weight, 5.0);
    }

    #[test]
    fn sink_focus_reports_positive_zero_weight() {
        let nodes = chain_nodes();
        let graph = SupplyGraph::from_tables(&nodes, &[EdgeRecord::new("A", "B", 4.0)]);

        let impact = compute_impact_metrics(&graph, &nodes, Some(&NodeId::new("B")), 2);

        assert_eq!(impact.downstream_count, 0);
        assert!(impact.downstream_weight.is_sign_positive());
        let json = serde_json::to_string(&impact).unwrap();
        assert!(json.contains("\"downstream_weight\":0.0"), "{json}");
    }

    #[test]
    fn regions_ignore_missing_values_and_missing_rows() {
        let nodes = chain_nodes();
        let graph = chain_graph(&nodes);

        // Downstream of B at depth 2 is {C (APAC), D (no region)}.
        let impact = compute_impact_metrics(&graph, &nodes, Some(&NodeId::new("B")), 2);
        assert_eq!(impact.regions_affected, 1);

        // Same graph, but the region lookup table lacks C entirely.
        let partial: Vec<Node> = nodes.iter().filter(|n| n.id.as_str() != "C").cloned().collect();
        let impact = compute_impact_metrics(&graph, &partial, Some(&NodeId::new("B")), 2);
        assert_eq!(impact.regions_affected, 0);
    }

    #[test]
    fn weight_counts_parallel_edges_and_internal_edges_not_leaving_focus() {
        let nodes: Vec<Node> = ["F", "X", "Y", "U"].into_iter().map(Node::new).collect();
        let mut unweighted = EdgeRecord::new("F", "Y", 1.0);
        unweighted.weight = None;
        let edges = vec![
            EdgeRecord::new("F", "X", 2.0),
            EdgeRecord::new("F", "X", 3.0),
            EdgeRecord::new("X", "Y", 4.0),
            unweighted,
            // Into the focus: not counted, F is not downstream.
            EdgeRecord::new("Y", "F", 100.0),
            // From upstream into downstream: not counted.
            EdgeRecord::new("U", "X", 50.0),
            EdgeRecord::new("U", "F", 1.0),
        ];
        let graph = SupplyGraph::from_tables(&nodes, &edges);

        let impact = compute_impact_metrics(&graph, &nodes, Some(&NodeId::new("F")), 1);

        assert_eq!(impact.downstream_count, 2);
        assert_eq!(impact.downstream_weight, 9.0);
    }
}
