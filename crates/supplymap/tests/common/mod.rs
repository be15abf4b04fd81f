//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use supplymap::domain::{EdgeRecord, Node};
use supplymap::graph::SupplyGraph;

/// Path of the binary cargo built for this test run
pub fn supplymap_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_supplymap"))
}

/// Run the supplymap binary in the specified directory
///
/// Colors are disabled and `RUST_LOG` is cleared so output is stable.
pub fn run_supplymap_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(supplymap_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute supplymap binary")
}

/// Parse stdout of a successful run as JSON
pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}

/// Write a JSONL file from pre-rendered lines
pub fn write_lines(dir: &Path, name: &str, lines: &[&str]) {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(dir.join(name), text).expect("Failed to write table");
}

/// Write a small dataset: a chain A -> B -> C -> D plus an isolated node E.
///
/// ```text
///   A --5--> B --2--> C --1--> D      E
/// ```
///
/// A and B are in EU, C in APAC, D in NA. E has no coordinates.
pub fn write_chain_dataset(dir: &Path) {
    write_lines(
        dir,
        "nodes.jsonl",
        &[
            r#"{"id": "A", "label": "Mine", "region": "EU", "latitude": 50.0, "longitude": 8.0, "size": 3}"#,
            r#"{"id": "B", "label": "Smelter", "region": "EU", "latitude": 51.0, "longitude": 9.0, "size": 10}"#,
            r#"{"id": "C", "label": "Fab", "region": "APAC", "latitude": 25.0, "longitude": 121.0, "size": 7}"#,
            r#"{"id": "D", "label": "Assembler", "region": "NA", "latitude": 37.0, "longitude": -122.0, "size": 5}"#,
            r#"{"id": "E", "label": "Warehouse", "region": "NA"}"#,
        ],
    );
    write_lines(
        dir,
        "matrix.jsonl",
        &[
            r#"{"FROM/TO": "A", "A": 0, "B": 5, "C": 0, "D": 0, "E": 0}"#,
            r#"{"FROM/TO": "B", "A": 0, "B": 0, "C": 2, "D": 0, "E": 0}"#,
            r#"{"FROM/TO": "C", "A": 0, "B": 0, "C": 0, "D": 1, "E": null}"#,
            r#"{"FROM/TO": "D", "A": 0, "B": 0, "C": 0, "D": 0, "E": -3}"#,
            r#"{"FROM/TO": "E", "A": 0, "B": 0, "C": 0, "D": 0, "E": 0}"#,
        ],
    );
    write_lines(dir, "meta.jsonl", &[r#"{"key": "title", "value": "Chain"}"#]);
}

/// Nodes with the given ids and no attributes
pub fn bare_nodes(ids: &[&str]) -> Vec<Node> {
    ids.iter().copied().map(Node::new).collect()
}

/// Graph over bare nodes from `(from, to, weight)` triples
pub fn graph_of(ids: &[&str], edges: &[(&str, &str, f64)]) -> SupplyGraph {
    let edges: Vec<EdgeRecord> = edges
        .iter()
        .map(|&(from, to, weight)| EdgeRecord::new(from, to, weight))
        .collect();
    SupplyGraph::from_tables(&bare_nodes(ids), &edges)
}
