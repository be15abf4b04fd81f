//! Dataset health checks.
//!
//! None of these feed the analysis pipeline; they help spot data problems
//! (missing coordinates, nodes with no arcs, suspicious weights) before a
//! focus is picked.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{EdgeRecord, Node, NodeId};
use crate::graph::SupplyGraph;

/// Default number of edges listed by [`strongest_edges`].
pub const DEFAULT_STRONGEST_EDGES: usize = 10;

/// Table and graph sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSummary {
    /// Rows in the node table
    pub node_count: usize,
    /// Rows in the edge list with a positive or missing weight
    pub edge_count: usize,
    /// Rows in the edge list with a zero, negative or NaN weight; never arcs
    pub non_positive_edges: usize,
    /// Nodes in the built graph
    pub graph_nodes: usize,
    /// Arcs in the built graph
    pub graph_edges: usize,
    /// Distinct non-missing regions in the node table
    pub region_count: usize,
}

/// One bucket of the weight distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightCount {
    /// Edge weight
    pub weight: f64,
    /// Number of edges with exactly this weight
    pub count: usize,
}

/// Every check, bundled for display.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    /// Table and graph sizes
    pub summary: DiagnosticsSummary,
    /// Ids of nodes lacking a coordinate
    pub missing_coords: Vec<NodeId>,
    /// Ids of nodes with no arcs
    pub isolated_nodes: Vec<NodeId>,
    /// Edge count per weight, ascending
    pub weight_distribution: Vec<WeightCount>,
    /// Heaviest edges first
    pub strongest_edges: Vec<EdgeRecord>,
}

impl DiagnosticsReport {
    /// Run every check over the tables and the graph built from them.
    #[must_use]
    pub fn build(nodes: &[Node], edges: &[EdgeRecord], graph: &SupplyGraph, top: usize) -> Self {
        Self {
            summary: diagnostics_summary(nodes, edges, graph),
            missing_coords: ids(find_nodes_with_missing_coords(nodes)),
            isolated_nodes: ids(find_isolated_nodes(graph)),
            weight_distribution: edge_weight_distribution(edges),
            strongest_edges: strongest_edges(edges, top).into_iter().cloned().collect(),
        }
    }
}

fn ids(found: Vec<&Node>) -> Vec<NodeId> {
    found.into_iter().map(|n| n.id.clone()).collect()
}

/// Compare table sizes with the built graph.
#[must_use]
pub fn diagnostics_summary(
    nodes: &[Node],
    edges: &[EdgeRecord],
    graph: &SupplyGraph,
) -> DiagnosticsSummary {
    let regions: BTreeSet<&str> = nodes.iter().filter_map(|n| n.region.as_deref()).collect();
    let usable = edges.iter().filter(|e| e.has_usable_weight()).count();

    DiagnosticsSummary {
        node_count: nodes.len(),
        edge_count: usable,
        non_positive_edges: edges.len() - usable,
        graph_nodes: graph.node_count(),
        graph_edges: graph.edge_count(),
        region_count: regions.len(),
    }
}

/// Nodes lacking a latitude or a longitude.
#[must_use]
pub fn find_nodes_with_missing_coords(nodes: &[Node]) -> Vec<&Node> {
    nodes.iter().filter(|n| n.coordinates().is_none()).collect()
}

/// Graph nodes with no incoming and no outgoing arcs.
#[must_use]
pub fn find_isolated_nodes(graph: &SupplyGraph) -> Vec<&Node> {
    graph
        .nodes()
        .filter(|n| graph.in_degree(&n.id) == 0 && graph.out_degree(&n.id) == 0)
        .collect()
}

/// Count edges per distinct weight, ascending by weight.
///
/// Edges without a weight, or with one the graph would drop, are not counted.
#[must_use]
pub fn edge_weight_distribution(edges: &[EdgeRecord]) -> Vec<WeightCount> {
    // f64 is not Ord; the bit pattern is a stable key for exact-equality buckets.
    let mut buckets: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    let weights = edges
        .iter()
        .filter(|e| e.has_usable_weight())
        .filter_map(|e| e.weight);
    for weight in weights {
        let bucket = buckets.entry(weight.to_bits()).or_insert((weight, 0));
        bucket.1 += 1;
    }

    let mut distribution: Vec<WeightCount> = buckets
        .into_values()
        .map(|(weight, count)| WeightCount { weight, count })
        .collect();
    distribution.sort_by(|a, b| a.weight.total_cmp(&b.weight));
    distribution
}

/// The `n` heaviest edges, heaviest first; ties keep table order.
///
/// Zero, negative and NaN weights are left out.
#[must_use]
pub fn strongest_edges(edges: &[EdgeRecord], n: usize) -> Vec<&EdgeRecord> {
    let mut sorted: Vec<&EdgeRecord> = edges.iter().filter(|e| e.has_usable_weight()).collect();
    sorted.sort_by(|a, b| b.weight_or_zero().total_cmp(&a.weight_or_zero()));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::new("A").with_region("EU").with_coordinates(2.3, 48.8),
            Node::new("B").with_region("EU"),
            Node::new("C").with_region("APAC").with_coordinates(139.7, 35.7),
            Node::new("D"),
        ]
    }

    fn sample_edges() -> Vec<EdgeRecord> {
        vec![
            EdgeRecord::new("A", "B", 2.0),
            EdgeRecord::new("B", "C", 5.0),
            EdgeRecord::new("A", "C", 2.0),
            EdgeRecord::new("C", "B", 5.0),
        ]
    }

    #[test]
    fn summary_counts_tables_graph_and_regions() {
        let nodes = sample_nodes();
        let mut edges = sample_edges();
        edges.push(EdgeRecord::new("A", "GHOST", 1.0));
        let graph = SupplyGraph::from_tables(&nodes, &edges);

        let summary = diagnostics_summary(&nodes, &edges, &graph);

        assert_eq!(
            summary,
            DiagnosticsSummary {
                node_count: 4,
                edge_count: 5,
                non_positive_edges: 0,
                graph_nodes: 4,
                graph_edges: 4,
                region_count: 2,
            }
        );
    }

    #[test]
    fn non_positive_weights_stay_out_of_counts_and_rankings() {
        let nodes = sample_nodes();
        let mut edges = sample_edges();
        edges.push(EdgeRecord::new("A", "D", 0.0));
        edges.push(EdgeRecord::new("D", "A", -9.0));
        edges.push(EdgeRecord::new("B", "D", f64::NAN));
        let graph = SupplyGraph::from_tables(&nodes, &edges);

        let report = DiagnosticsReport::build(&nodes, &edges, &graph, 10);

        assert_eq!(report.summary.edge_count, 4);
        assert_eq!(report.summary.non_positive_edges, 3);
        assert_eq!(report.summary.graph_edges, 4);
        assert_eq!(report.isolated_nodes, vec![NodeId::new("D")]);
        assert!(report.weight_distribution.iter().all(|b| b.weight > 0.0));
        assert_eq!(report.strongest_edges.len(), 4);
        assert!(report
            .strongest_edges
            .iter()
            .all(|e| e.from.as_str() != "D" && e.to.as_str() != "D"));
    }

    #[test]
    fn missing_coords_and_isolated_nodes() {
        let nodes = sample_nodes();
        let graph = SupplyGraph::from_tables(&nodes, &sample_edges());

        let missing: Vec<&str> = find_nodes_with_missing_coords(&nodes)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(missing, vec!["B", "D"]);

        let isolated: Vec<&str> = find_isolated_nodes(&graph)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(isolated, vec!["D"]);
    }

    #[test]
    fn distribution_is_ascending_with_counts() {
        let distribution = edge_weight_distribution(&sample_edges());
        assert_eq!(
            distribution,
            vec![
                WeightCount { weight: 2.0, count: 2 },
                WeightCount { weight: 5.0, count: 2 },
            ]
        );
    }

    #[test]
    fn strongest_edges_are_descending_and_stable() {
        let edges = sample_edges();
        let top: Vec<(&str, &str)> = strongest_edges(&edges, 3)
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();

        assert_eq!(top, vec![("B", "C"), ("C", "B"), ("A", "B")]);
        assert_eq!(strongest_edges(&edges, 0).len(), 0);
        assert_eq!(strongest_edges(&edges, 50).len(), 4);
    }
}
