//! Bounded upstream/downstream reachability around a focus node.
//!
//! Two independent, multi-source, distance-bounded breadth-first
//! expansions run from the focus: one over predecessors (upstream), one
//! over successors (downstream). A node is included when it lies within
//! `max_depth` hops along any path. Each direction keeps its own visited
//! set so cycles never re-expand a node; the focus starts out visited, so
//! it is never a member of either set.
//!
//! An unset or unknown focus is not an error: both sets are empty and the
//! "induced" subgraph is the whole input graph.

use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;

use crate::domain::NodeId;
use crate::graph::SupplyGraph;

/// Which way to walk from the focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Towards suppliers (predecessors)
    Upstream,
    /// Towards consumers (successors)
    Downstream,
}

impl From<Flow> for Direction {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Upstream => Direction::Incoming,
            Flow::Downstream => Direction::Outgoing,
        }
    }
}

/// Outcome of a traversal around one focus node.
#[derive(Debug, Clone)]
pub struct TraversalResult {
    /// Ancestors within `max_depth` hops, focus excluded
    pub upstream: BTreeSet<NodeId>,
    /// Descendants within `max_depth` hops, focus excluded
    pub downstream: BTreeSet<NodeId>,
    /// Subgraph on `{focus} ∪ upstream ∪ downstream` with all internal arcs
    pub subgraph: SupplyGraph,
}

impl TraversalResult {
    /// `{focus} ∪ upstream ∪ downstream`.
    #[must_use]
    pub fn relevant_nodes(&self, focus: &NodeId) -> BTreeSet<NodeId> {
        let mut relevant: BTreeSet<NodeId> = self.upstream.union(&self.downstream).cloned().collect();
        relevant.insert(focus.clone());
        relevant
    }
}

/// Compute upstream and downstream sets and the induced subgraph.
///
/// `max_depth = 1` yields direct neighbours only; `max_depth = 0` yields
/// empty sets and a subgraph holding just the focus.
///
/// # Examples
///
/// ```
/// use supplymap::domain::{EdgeRecord, Node, NodeId};
/// use supplymap::graph::SupplyGraph;
/// use supplymap::traversal::traverse;
///
/// let nodes: Vec<Node> = ["A", "B", "C", "D"].into_iter().map(Node::new).collect();
/// let edges = vec![
///     EdgeRecord::new("A", "B", 1.0),
///     EdgeRecord::new("B", "C", 1.0),
///     EdgeRecord::new("C", "D", 1.0),
/// ];
/// let graph = SupplyGraph::from_tables(&nodes, &edges);
///
/// let result = traverse(&graph, Some(&NodeId::new("B")), 2);
/// assert_eq!(result.upstream.len(), 1);
/// assert_eq!(result.downstream.len(), 2);
/// assert_eq!(result.subgraph.node_count(), 4);
/// ```
#[must_use]
pub fn traverse(graph: &SupplyGraph, focus: Option<&NodeId>, max_depth: usize) -> TraversalResult {
    let Some(focus) = focus.filter(|f| graph.contains(f)) else {
        tracing::debug!(?focus, "Focus unset or unknown, returning full graph");
        return TraversalResult {
            upstream: BTreeSet::new(),
            downstream: BTreeSet::new(),
            subgraph: graph.clone(),
        };
    };

    let upstream = reachable_within(graph, focus, max_depth, Flow::Upstream);
    let downstream = reachable_within(graph, focus, max_depth, Flow::Downstream);

    let mut relevant: BTreeSet<NodeId> = upstream.union(&downstream).cloned().collect();
    relevant.insert(focus.clone());
    let subgraph = graph.induced_subgraph(&relevant);

    tracing::debug!(
        %focus,
        max_depth,
        upstream = upstream.len(),
        downstream = downstream.len(),
        subgraph_edges = subgraph.edge_count(),
        "Traversal complete"
    );

    TraversalResult {
        upstream,
        downstream,
        subgraph,
    }
}

/// Nodes within `max_depth` hops of `focus` in one direction.
///
/// Empty when `focus` is not in the graph. The focus itself is never
/// included, even when a cycle leads back to it.
#[must_use]
pub fn reachable_within(
    graph: &SupplyGraph,
    focus: &NodeId,
    max_depth: usize,
    flow: Flow,
) -> BTreeSet<NodeId> {
    let Some(start) = graph.index_of(focus) else {
        return BTreeSet::new();
    };

    let inner = graph.inner();
    let direction = Direction::from(flow);

    let mut visited: BTreeSet<NodeIndex> = BTreeSet::from([start]);
    let mut frontier: Vec<NodeIndex> = vec![start];
    let mut reached = BTreeSet::new();

    for _ in 0..max_depth {
        if frontier.is_empty() {
            break;
        }

        let mut next = Vec::new();
        for &node in &frontier {
            for neighbor in inner.neighbors_directed(node, direction) {
                if visited.insert(neighbor) {
                    reached.insert(inner[neighbor].id.clone());
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
    }

    reached
}

/// Ancestors of `focus` within `max_depth` hops.
#[must_use]
pub fn upstream_set(graph: &SupplyGraph, focus: &NodeId, max_depth: usize) -> BTreeSet<NodeId> {
    reachable_within(graph, focus, max_depth, Flow::Upstream)
}

/// Descendants of `focus` within `max_depth` hops.
#[must_use]
pub fn downstream_set(graph: &SupplyGraph, focus: &NodeId, max_depth: usize) -> BTreeSet<NodeId> {
    reachable_within(graph, focus, max_depth, Flow::Downstream)
}
