//! Dataset loading: the canonical node, matrix, metadata and edge tables.
//!
//! A dataset is a directory of JSON Lines files:
//!
//! | File | Required | Row shape |
//! |------|----------|-----------|
//! | `nodes.jsonl` | yes | `{"id", "label"?, "region"?, "latitude"?, "longitude"?, "size"?, ...}` |
//! | `matrix.jsonl` | yes | `{"FROM/TO": <source>, "<target>": <weight>, ...}` |
//! | `meta.jsonl` | no | `{"key", "value"}` |
//! | `edges.jsonl` | no | `{"from", "to", "weight"?, "type"?, "notes"?, "active"?}` |
//!
//! Malformed lines are skipped and kept as [`TableWarning`]s, as are node
//! columns of the wrong type (the node itself is kept). A matrix cell
//! that is not a number is an ingestion error, reported once here so the
//! graph code never sees it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supplymap_tables::{read_jsonl_resilient, Row, Warning};

use crate::domain::{id_text, EdgeRecord, MatrixRow, Node, NodeId, SOURCE_COLUMN};
use crate::edges::generate_edge_list;
use crate::error::{Error, Result};
use crate::graph::{BuildReport, ReferencePolicy, SupplyGraph};

/// Node table file name.
pub const NODES_FILE: &str = "nodes.jsonl";

/// Adjacency matrix file name.
pub const MATRIX_FILE: &str = "matrix.jsonl";

/// Optional metadata file name.
pub const META_FILE: &str = "meta.jsonl";

/// Optional user-edited edge list file name.
pub const EDGES_FILE: &str = "edges.jsonl";

/// All dataset files, required ones first.
pub const DATASET_FILES: [&str; 4] = [NODES_FILE, MATRIX_FILE, META_FILE, EDGES_FILE];

/// A skipped line or unreadable column, tagged with the table it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableWarning {
    /// Table file name
    pub table: &'static str,
    /// 1-based line number
    pub line_number: usize,
    /// `malformed_json`, `skipped_line` or `invalid_attribute`
    pub kind: &'static str,
    /// Human-readable description
    pub message: String,
}

impl TableWarning {
    fn new(table: &'static str, warning: &Warning) -> Self {
        Self {
            table,
            line_number: warning.line_number(),
            kind: warning.kind(),
            message: warning.description(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetaRow {
    key: String,
    #[serde(default)]
    value: Value,
}

/// The loaded tables of one dataset.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    /// Key/value metadata, in file order
    pub meta: Map<String, Value>,
    /// Node rows in file order
    pub nodes: Vec<Node>,
    /// Matrix rows in file order
    pub matrix: Vec<MatrixRow>,
    /// User-added edge rows, appended after the matrix edges
    pub user_edges: Vec<EdgeRecord>,
    /// Lines skipped while loading
    pub warnings: Vec<TableWarning>,
}

impl Tables {
    /// Assemble tables that are already in memory.
    #[must_use]
    pub fn new(nodes: Vec<Node>, matrix: Vec<MatrixRow>) -> Self {
        Self {
            nodes,
            matrix,
            ..Self::default()
        }
    }

    /// Add user edge rows.
    #[must_use]
    pub fn with_user_edges(mut self, edges: Vec<EdgeRecord>) -> Self {
        self.user_edges = edges;
        self
    }

    /// Load a dataset directory.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTable`] if `nodes.jsonl` or `matrix.jsonl` is absent
    /// - [`Error::MissingColumn`] if a matrix row has no `FROM/TO` source
    /// - [`Error::InvalidCell`] if a matrix cell is not numeric
    /// - [`Error::Table`] on I/O failure while reading
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut warnings = Vec::new();

        let node_rows: Vec<Row<Map<String, Value>>> =
            read_table(&required(dir, NODES_FILE)?, NODES_FILE, &mut warnings)?;
        let nodes = parse_node_rows(node_rows, &mut warnings);

        let matrix_rows: Vec<Row<Map<String, Value>>> =
            read_table(&required(dir, MATRIX_FILE)?, MATRIX_FILE, &mut warnings)?;
        let matrix = matrix_rows
            .into_iter()
            .map(|row| parse_matrix_row(row.line_number, row.record))
            .collect::<Result<Vec<_>>>()?;

        let meta = match optional(dir, META_FILE) {
            Some(path) => read_table::<MetaRow>(&path, META_FILE, &mut warnings)?
                .into_iter()
                .map(|row| (row.record.key, row.record.value))
                .collect(),
            None => Map::new(),
        };

        let user_edges = match optional(dir, EDGES_FILE) {
            Some(path) => read_table::<EdgeRecord>(&path, EDGES_FILE, &mut warnings)?
                .into_iter()
                .map(|row| row.record)
                .collect(),
            None => Vec::new(),
        };

        tracing::info!(
            dataset = %dir.display(),
            nodes = nodes.len(),
            matrix_rows = matrix.len(),
            user_edges = user_edges.len(),
            warnings = warnings.len(),
            "Loaded dataset"
        );

        Ok(Self {
            meta,
            nodes,
            matrix,
            user_edges,
            warnings,
        })
    }

    /// Matrix-derived edges followed by user-added edges.
    ///
    /// Matrix edges carry the default type, empty notes and `active = true`.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeRecord> {
        let mut edges = generate_edge_list(&self.matrix);
        edges.extend(self.user_edges.iter().cloned());
        edges
    }

    /// Build a fresh graph from the tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNodeReference`] under [`ReferencePolicy::Reject`].
    pub fn graph(&self, policy: ReferencePolicy) -> Result<(SupplyGraph, BuildReport)> {
        SupplyGraph::build(&self.nodes, &self.edges(), policy)
    }
}

fn required(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::MissingTable(path))
    }
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}

fn read_table<T: serde::de::DeserializeOwned>(
    path: &Path,
    table: &'static str,
    warnings: &mut Vec<TableWarning>,
) -> Result<Vec<Row<T>>> {
    let (rows, skipped) = read_jsonl_resilient(path)?;
    warnings.extend(skipped.iter().map(|w| TableWarning::new(table, w)));
    Ok(rows)
}

/// Split one matrix line into its source id and ordered target cells.
fn parse_matrix_row(line_number: usize, row: Map<String, Value>) -> Result<MatrixRow> {
    let source = row
        .get(SOURCE_COLUMN)
        .and_then(id_text)
        .ok_or_else(|| Error::MissingColumn {
            table: "matrix",
            line_number,
            column: SOURCE_COLUMN.to_string(),
        })?;

    // Iterate rather than remove: removal would reorder the remaining columns.
    let cells = row
        .into_iter()
        .filter(|(column, _)| column != SOURCE_COLUMN)
        .map(|(column, value)| {
            let weight = parse_cell(&value).ok_or_else(|| Error::InvalidCell {
                line_number,
                column: column.clone(),
                value: value.to_string(),
            })?;
            Ok((NodeId::new(column), weight))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MatrixRow {
        source: NodeId::new(source),
        cells,
    })
}

/// Rows without an id are skipped. A mistyped optional column is left unset
/// and reported, but the node is kept so its edges still resolve.
fn parse_node_rows(
    rows: Vec<Row<Map<String, Value>>>,
    warnings: &mut Vec<TableWarning>,
) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(rows.len());
    for row in rows {
        let line_number = row.line_number;
        let Some((node, unreadable)) = Node::from_row(row.record) else {
            let skipped = Warning::SkippedLine {
                line_number,
                reason: "missing or invalid `id`".to_string(),
            };
            warnings.push(TableWarning::new(NODES_FILE, &skipped));
            continue;
        };
        for column in unreadable {
            tracing::warn!(line_number, id = %node.id, %column, "Ignoring unreadable node column");
            warnings.push(TableWarning {
                table: NODES_FILE,
                line_number,
                kind: "invalid_attribute",
                message: format!(
                    "line {line_number}: node {}: ignored unreadable `{column}`",
                    node.id
                ),
            });
        }
        nodes.push(node);
    }
    nodes
}

/// `Some(None)` for an empty cell, `Some(Some(w))` for a number, `None` if invalid.
///
/// Numeric text (as spreadsheet exports often write it) is accepted.
fn parse_cell(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().map(Some),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => s.trim().parse::<f64>().ok().map(Some),
        _ => None,
    }
}
