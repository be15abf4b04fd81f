//! Supply graph construction using petgraph.
//!
//! A [`SupplyGraph`] is a directed multigraph: a petgraph `DiGraph` whose
//! node weights are the full node rows, plus a map from node id to index.
//! Parallel edges between the same ordered pair are kept (a matrix cell and
//! a user-added edge may both connect `A -> B`).
//!
//! ## Reference policy
//!
//! An edge whose endpoint is not in the node table never creates a node.
//! Under [`ReferencePolicy::Skip`] (the default) such edges are dropped and
//! listed in the [`BuildReport`]; under [`ReferencePolicy::Reject`] the whole
//! build fails with [`Error::UnknownNodeReference`]. Edges with a
//! non-positive weight are always dropped, whatever the policy.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::domain::{EdgeRecord, Node, NodeId, DEFAULT_EDGE_TYPE};
use crate::error::{Error, Result};

/// Attributes carried by each arc.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeAttrs {
    /// Flow weight; `None` when the edge row had no weight
    pub weight: Option<f64>,
    /// Edge type tag, `"material"` unless the row said otherwise
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Active flag, `true` unless the row said otherwise
    pub active: bool,
}

/// What to do with an edge that references a node missing from the node table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Drop the edge and record it in the build report
    #[default]
    Skip,
    /// Fail the whole build
    Reject,
}

/// Why an edge row was not materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Source id is not in the node table
    UnknownSource,
    /// Target id is not in the node table
    UnknownTarget,
    /// Neither endpoint is in the node table
    UnknownEndpoints,
    /// Weight is zero, negative or NaN
    NonPositiveWeight,
}

/// An edge row that was left out of the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedEdge {
    /// Source id as written
    pub from: NodeId,
    /// Target id as written
    pub to: NodeId,
    /// Why it was dropped
    pub reason: DropReason,
}

/// Everything the constructor had to leave out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    /// Edge rows not added to the graph
    pub dropped_edges: Vec<DroppedEdge>,
    /// Node ids that appeared more than once; the first row wins
    pub duplicate_nodes: Vec<NodeId>,
}

impl BuildReport {
    /// `true` when nothing was dropped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_edges.is_empty() && self.duplicate_nodes.is_empty()
    }
}

/// A borrowed view of one arc.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    /// Source node id
    pub source: &'a NodeId,
    /// Target node id
    pub target: &'a NodeId,
    /// Arc attributes
    pub attrs: &'a EdgeAttrs,
}

/// Directed, node- and edge-labelled multigraph over the node table.
#[derive(Debug, Clone, Default)]
pub struct SupplyGraph {
    graph: DiGraph<Node, EdgeAttrs>,
    index: HashMap<NodeId, NodeIndex>,
}

impl SupplyGraph {
    /// Build a graph, dropping edges with unknown endpoints.
    ///
    /// Dropped edges are logged at warn level.
    #[must_use]
    pub fn from_tables(nodes: &[Node], edges: &[EdgeRecord]) -> Self {
        Self::assemble(nodes, edges).0
    }

    /// Build a graph under the given reference policy.
    ///
    /// Every node row is added exactly once (duplicates after the first are
    /// ignored and reported). Every edge row with known endpoints and a
    /// positive or missing weight adds one arc.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNodeReference`] for the first edge with an
    /// unknown endpoint when `policy` is [`ReferencePolicy::Reject`].
    pub fn build(
        nodes: &[Node],
        edges: &[EdgeRecord],
        policy: ReferencePolicy,
    ) -> Result<(Self, BuildReport)> {
        let (graph, report) = Self::assemble(nodes, edges);

        if policy == ReferencePolicy::Reject {
            let unknown = report
                .dropped_edges
                .iter()
                .find(|d| d.reason != DropReason::NonPositiveWeight);
            if let Some(dropped) = unknown {
                return Err(Error::UnknownNodeReference {
                    from: dropped.from.to_string(),
                    to: dropped.to.to_string(),
                });
            }
        }

        Ok((graph, report))
    }

    /// Skip-policy construction; never fails.
    fn assemble(nodes: &[Node], edges: &[EdgeRecord]) -> (Self, BuildReport) {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index = HashMap::with_capacity(nodes.len());
        let mut report = BuildReport::default();

        for node in nodes {
            if index.contains_key(&node.id) {
                tracing::warn!(id = %node.id, "Duplicate node id, keeping first row");
                report.duplicate_nodes.push(node.id.clone());
                continue;
            }
            let ix = graph.add_node(node.clone());
            index.insert(node.id.clone(), ix);
        }

        for edge in edges {
            let reason = match (index.get(&edge.from), index.get(&edge.to)) {
                (Some(_), Some(_)) if !edge.has_usable_weight() => DropReason::NonPositiveWeight,
                (Some(&source), Some(&target)) => {
                    graph.add_edge(
                        source,
                        target,
                        EdgeAttrs {
                            weight: edge.weight,
                            edge_type: edge
                                .edge_type
                                .clone()
                                .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string()),
                            active: edge.active.unwrap_or(true),
                        },
                    );
                    continue;
                }
                (None, Some(_)) => DropReason::UnknownSource,
                (Some(_), None) => DropReason::UnknownTarget,
                (None, None) => DropReason::UnknownEndpoints,
            };

            tracing::warn!(from = %edge.from, to = %edge.to, ?reason, "Dropping edge");
            report.dropped_edges.push(DroppedEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
                reason,
            });
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = report.dropped_edges.len(),
            "Built supply graph"
        );

        (Self { graph, index }, report)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of arcs, counting parallel arcs separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `true` if the id names a node in this graph.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// The node row for an id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Set of all node ids.
    #[must_use]
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.index.keys().cloned().collect()
    }

    /// All arcs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.graph.edge_references().map(|e| EdgeView {
            source: &self.graph[e.source()].id,
            target: &self.graph[e.target()].id,
            attrs: e.weight(),
        })
    }

    /// Direct predecessors (suppliers) of a node; empty for unknown ids.
    ///
    /// A predecessor joined by parallel arcs is yielded once per arc.
    pub fn predecessors<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + use<'a> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct successors (consumers) of a node; empty for unknown ids.
    pub fn successors<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + use<'a> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors<'a>(
        &'a self,
        id: &NodeId,
        direction: Direction,
    ) -> impl Iterator<Item = &'a NodeId> + use<'a> {
        self.index.get(id).into_iter().flat_map(move |&ix| {
            self.graph
                .neighbors_directed(ix, direction)
                .map(move |n| &self.graph[n].id)
        })
    }

    /// Number of incoming arcs; 0 for unknown ids.
    #[must_use]
    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Number of outgoing arcs; 0 for unknown ids.
    #[must_use]
    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    fn degree(&self, id: &NodeId, direction: Direction) -> usize {
        self.index
            .get(id)
            .map_or(0, |&ix| self.graph.edges_directed(ix, direction).count())
    }

    /// The subgraph on `keep` with every arc whose endpoints both lie in it.
    ///
    /// Ids in `keep` that are not in this graph are ignored. Arcs are kept
    /// whether or not a traversal walked them.
    #[must_use]
    pub fn induced_subgraph(&self, keep: &BTreeSet<NodeId>) -> Self {
        let graph = self.graph.filter_map(
            |_, node| keep.contains(&node.id).then(|| node.clone()),
            |_, attrs| Some(attrs.clone()),
        );
        let index = graph
            .node_indices()
            .map(|ix| (graph[ix].id.clone(), ix))
            .collect();
        Self { graph, index }
    }

    pub(crate) fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn inner(&self) -> &DiGraph<Node, EdgeAttrs> {
        &self.graph
    }
}
