//! Error types for supplymap operations.
//!
//! Only ingestion and infrastructure problems are errors. An unknown or
//! missing focus node is not: traversal and metrics degrade to empty results.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for supplymap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Table reading or writing failed.
    #[error("table error: {0}")]
    Table(#[from] supplymap_tables::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required dataset table is not present.
    #[error("missing table: {}", .0.display())]
    MissingTable(PathBuf),

    /// A required column is absent from a table row.
    #[error("{table} line {line_number}: missing column `{column}`")]
    MissingColumn {
        /// Table name (e.g. "matrix").
        table: &'static str,
        /// The 1-based line of the offending row.
        line_number: usize,
        /// Name of the missing column.
        column: String,
    },

    /// A matrix cell holds something other than a number.
    #[error("matrix line {line_number}: column `{column}` holds non-numeric value {value}")]
    InvalidCell {
        /// The 1-based line of the offending row.
        line_number: usize,
        /// Target column name.
        column: String,
        /// The offending raw value, rendered as JSON.
        value: String,
    },

    /// An edge references a node id absent from the node table.
    #[error("edge {from} -> {to} references an unknown node")]
    UnknownNodeReference {
        /// Source node id as written on the edge.
        from: String,
        /// Target node id as written on the edge.
        to: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized Result type for supplymap operations.
pub type Result<T> = std::result::Result<T, Error>;
