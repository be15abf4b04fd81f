//! Adjacency matrix to edge list conversion.
//!
//! The builder is a pure sparsification transform: one edge per strictly
//! positive cell, weight copied verbatim. It performs no referential
//! validation; a target column that names no known node is still emitted
//! and left to the graph constructor to judge.

use crate::domain::{EdgeRecord, MatrixRow, DEFAULT_EDGE_TYPE};

/// Convert matrix rows into directed weighted edges.
///
/// Rows are visited in order, and cells in column order within each row.
/// Zero, negative, empty and NaN cells are dropped silently.
///
/// # Examples
///
/// ```
/// use supplymap::domain::MatrixRow;
/// use supplymap::edges::build_edges;
///
/// let matrix = vec![MatrixRow::new("A", [("B", 5.0), ("C", 0.0), ("D", -1.0)])];
/// let edges = build_edges(&matrix);
///
/// assert_eq!(edges.len(), 1);
/// assert_eq!(edges[0].from.as_str(), "A");
/// assert_eq!(edges[0].to.as_str(), "B");
/// assert_eq!(edges[0].weight, Some(5.0));
/// ```
#[must_use]
pub fn build_edges(matrix: &[MatrixRow]) -> Vec<EdgeRecord> {
    let edges: Vec<EdgeRecord> = matrix
        .iter()
        .flat_map(|row| {
            row.cells.iter().filter_map(move |(target, weight)| {
                weight
                    .filter(|w| *w > 0.0)
                    .map(|w| EdgeRecord::new(row.source.clone(), target.clone(), w))
            })
        })
        .collect();

    tracing::debug!(
        rows = matrix.len(),
        edges = edges.len(),
        "Built edge list from matrix"
    );
    edges
}

/// Build the edge list with the editable columns filled in.
///
/// Every edge gets type `"material"`, empty notes and `active = true`,
/// ready for a user to edit and re-import.
#[must_use]
pub fn generate_edge_list(matrix: &[MatrixRow]) -> Vec<EdgeRecord> {
    build_edges(matrix)
        .into_iter()
        .map(|mut edge| {
            edge.edge_type = Some(DEFAULT_EDGE_TYPE.to_string());
            edge.notes = Some(String::new());
            edge.active = Some(true);
            edge
        })
        .collect()
}
