//! Edge list export.
//!
//! The edge list is the one persisted artifact: one row per edge, columns
//! in the fixed order `from, to, weight, type, notes, active`. It can be
//! written as JSON Lines (the same shape `edges.jsonl` is read back in) or
//! as RFC 4180 CSV for spreadsheet tools. Files are written atomically.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use supplymap_tables::{write_file_atomic, write_jsonl_atomic};

use crate::domain::EdgeRecord;
use crate::error::Result;

/// Export columns, in order.
pub const EDGE_COLUMNS: [&str; 6] = ["from", "to", "weight", "type", "notes", "active"];

/// File stem used when no output path is given.
pub const DEFAULT_EXPORT_STEM: &str = "EDGES";

/// Export file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Comma-separated values with a header row
    Csv,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jsonl => "jsonl",
            Self::Csv => "csv",
        }
    }

    /// `<dir>/EDGES.<ext>`.
    #[must_use]
    pub fn default_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("{DEFAULT_EXPORT_STEM}.{}", self.extension()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write `edges` to `path` in `format`, returning the number of rows.
///
/// # Errors
///
/// Returns an error if the file cannot be written; no partial file is left.
pub fn export_edges(path: impl AsRef<Path>, edges: &[EdgeRecord], format: ExportFormat) -> Result<usize> {
    let path = path.as_ref();
    let rows = match format {
        ExportFormat::Jsonl => write_jsonl_atomic(path, edges)?,
        ExportFormat::Csv => {
            write_file_atomic(path, |w| write_csv(w, edges))?;
            edges.len()
        }
    };

    tracing::info!(path = %path.display(), rows, %format, "Exported edge list");
    Ok(rows)
}

/// Write the header and one CSV row per edge, CRLF-terminated.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn write_csv<W: Write>(writer: &mut W, edges: &[EdgeRecord]) -> supplymap_tables::Result<()> {
    write_csv_line(writer, EDGE_COLUMNS.iter().map(|c| (*c).to_string()))?;
    for edge in edges {
        let value = serde_json::to_value(edge)?;
        write_csv_line(
            writer,
            EDGE_COLUMNS
                .iter()
                .map(|column| value.get(column).map(cell_text).unwrap_or_default()),
        )?;
    }
    Ok(())
}

fn write_csv_line<W: Write>(
    writer: &mut W,
    cells: impl Iterator<Item = String>,
) -> supplymap_tables::Result<()> {
    let line: Vec<String> = cells.map(|c| escape_csv(&c)).collect();
    write!(writer, "{}\r\n", line.join(","))?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Quote a field if it holds a comma, quote or line break; double any quotes.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
