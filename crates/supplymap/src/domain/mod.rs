//! Domain types for supply-chain analysis.
//!
//! This module contains the row types of the canonical tables: nodes,
//! adjacency matrix rows and edge records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the matrix column that holds the source node id of each row.
pub const SOURCE_COLUMN: &str = "FROM/TO";

/// Edge type tag used when an edge row carries none.
pub const DEFAULT_EDGE_TYPE: &str = "material";

/// Unique identifier for a node.
///
/// Ids are text. Numeric ids in a table are accepted and rendered to their
/// decimal form, so `7` and `7.0` both become `"7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl TryFrom<Value> for NodeId {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        id_text(&value)
            .map(Self)
            .ok_or_else(|| format!("expected a string or number node id, found {value}"))
    }
}

/// Render a JSON value as node id text, if it can serve as one.
///
/// Strings are taken as written (and must be non-blank); integral numbers
/// drop any fractional `.0`. Everything else is rejected.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// A supplier, facility or consumer in the network.
///
/// Only `id` is required. Every other column of the node table is kept:
/// well-known ones in typed fields, the rest in `attributes`. Deserializing
/// goes through [`Node::from_row`], so a mistyped optional column is left
/// unset rather than failing the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Node {
    /// Unique, stable identifier
    pub id: NodeId,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Categorical region (e.g. "EU", "APAC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Latitude in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Display weight, used to order the focus picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    /// Any other columns of the row
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    /// Build a node from a raw table row.
    ///
    /// Returns `None` when the row has no usable id. Otherwise returns the
    /// node and the names of the optional columns that held a value of the
    /// wrong type; those fields are left unset. Blank text and `null` mean
    /// absent, numbers in text columns are kept as their decimal text, and
    /// numeric text in number columns is parsed.
    #[must_use]
    pub fn from_row(row: Map<String, Value>) -> Option<(Self, Vec<String>)> {
        let id = row.get("id").and_then(id_text)?;
        let mut node = Self::new(id);
        let mut unreadable = Vec::new();

        for (column, value) in row {
            let readable = match column.as_str() {
                "id" => true,
                "label" => assign(&mut node.label, text_column(&value)),
                "region" => assign(&mut node.region, text_column(&value)),
                "latitude" => assign(&mut node.latitude, number_column(&value)),
                "longitude" => assign(&mut node.longitude, number_column(&value)),
                "size" => assign(&mut node.size, number_column(&value)),
                _ => {
                    node.attributes.insert(column, value);
                    continue;
                }
            };
            if !readable {
                unreadable.push(column);
            }
        }

        Some((node, unreadable))
    }

    /// Create a node with only an id.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            label: None,
            region: None,
            latitude: None,
            longitude: None,
            size: None,
            attributes: Map::new(),
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set longitude and latitude.
    #[must_use]
    pub fn with_coordinates(mut self, longitude: f64, latitude: f64) -> Self {
        self.longitude = Some(longitude);
        self.latitude = Some(latitude);
        self
    }

    /// Set the display size.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// The label if present, otherwise the id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    /// `(longitude, latitude)` when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }
}

impl TryFrom<Map<String, Value>> for Node {
    type Error = String;

    fn try_from(row: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_row(row)
            .map(|(node, _)| node)
            .ok_or_else(|| "missing or invalid node id".to_string())
    }
}

fn assign<T>(field: &mut Option<T>, parsed: Option<Option<T>>) -> bool {
    match parsed {
        Some(value) => {
            *field = value;
            true
        }
        None => false,
    }
}

/// Outer `None`: the value has the wrong type. Inner `None`: absent.
fn text_column(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(_) => Some(id_text(value)),
        _ => None,
    }
}

/// Outer `None`: the value is not a finite number. Inner `None`: absent.
fn number_column(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Some),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(Some),
        _ => None,
    }
}

/// One row of the adjacency matrix.
///
/// Cells keep their column order. A `None` weight is an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    /// Source node id from the `FROM/TO` column
    pub source: NodeId,

    /// `(target column name, weight)` pairs in column order
    pub cells: Vec<(NodeId, Option<f64>)>,
}

impl MatrixRow {
    /// Create a row from `(target, weight)` pairs.
    pub fn new<S, T, I>(source: S, cells: I) -> Self
    where
        S: Into<NodeId>,
        T: Into<NodeId>,
        I: IntoIterator<Item = (T, f64)>,
    {
        Self {
            source: source.into(),
            cells: cells
                .into_iter()
                .map(|(target, weight)| (target.into(), Some(weight)))
                .collect(),
        }
    }
}

/// A directed, weighted dependency as a table row.
///
/// Field order is the export column order: from, to, weight, type, notes,
/// active. `type`, `notes` and `active` are optional on input; the graph
/// constructor fills the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Supplying node
    pub from: NodeId,

    /// Receiving node
    pub to: NodeId,

    /// Flow weight; must be positive when present
    #[serde(default)]
    pub weight: Option<f64>,

    /// Edge type tag
    #[serde(rename = "type", default)]
    pub edge_type: Option<String>,

    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,

    /// Whether the dependency is active
    #[serde(default)]
    pub active: Option<bool>,
}

impl EdgeRecord {
    /// Create a bare weighted edge with no type, notes or active flag.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: Some(weight),
            edge_type: None,
            notes: None,
            active: None,
        }
    }

    /// Weight, treating a missing weight as zero.
    #[must_use]
    pub fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }

    /// `false` for a zero, negative or NaN weight. Such rows never become arcs.
    #[must_use]
    pub fn has_usable_weight(&self) -> bool {
        !matches!(self.weight, Some(w) if w.is_nan() || w <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::text(json!("A-12"), Some("A-12"))]
    #[case::integer(json!(7), Some("7"))]
    #[case::integral_float(json!(7.0), Some("7"))]
    #[case::fractional_float(json!(7.5), Some("7.5"))]
    #[case::blank(json!("  "), None)]
    #[case::null(json!(null), None)]
    #[case::boolean(json!(true), None)]
    fn id_text_accepts_strings_and_numbers(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(id_text(&value).as_deref(), expected);
    }

    #[test]
    fn node_keeps_unknown_columns_as_attributes() {
        let node: Node = serde_json::from_value(json!({
            "id": 3,
            "label": "Smelter",
            "region": "EU",
            "tier": 2
        }))
        .unwrap();

        assert_eq!(node.id, NodeId::new("3"));
        assert_eq!(node.display_label(), "Smelter");
        assert_eq!(node.attributes.get("tier"), Some(&json!(2)));
        assert_eq!(node.coordinates(), None);
    }

    #[test]
    fn mistyped_optional_columns_are_left_unset() {
        let row = json!({
            "id": "B",
            "latitude": "",
            "longitude": "12.5",
            "region": 3,
            "label": ["x"],
            "size": "big",
            "tier": 1
        });
        let Value::Object(row) = row else { unreachable!() };

        let (node, unreadable) = Node::from_row(row).unwrap();

        assert_eq!(node.id, NodeId::new("B"));
        assert_eq!(node.latitude, None);
        assert_eq!(node.longitude, Some(12.5));
        assert_eq!(node.region.as_deref(), Some("3"));
        assert_eq!(node.label, None);
        assert_eq!(node.size, None);
        assert_eq!(node.attributes.get("tier"), Some(&json!(1)));
        assert_eq!(unreadable, vec!["label".to_string(), "size".to_string()]);
    }

    #[test]
    fn deserializing_tolerates_mistyped_columns() {
        let node: Node = serde_json::from_value(json!({"id": "C", "size": true, "region": " "}))
            .unwrap();
        assert_eq!(node.size, None);
        assert_eq!(node.region, None);
    }

    #[test]
    fn node_without_id_is_rejected() {
        let result: Result<Node, _> = serde_json::from_value(json!({"label": "orphan"}));
        assert!(result.is_err());
    }

    #[test]
    fn edge_record_defaults_optional_columns() {
        let edge: EdgeRecord = serde_json::from_value(json!({"from": "A", "to": "B"})).unwrap();
        assert_eq!(edge.weight, None);
        assert_eq!(edge.weight_or_zero(), 0.0);
        assert_eq!(edge.edge_type, None);
        assert_eq!(edge.active, None);
    }

    #[test]
    fn edge_record_serializes_in_export_column_order() {
        let mut edge = EdgeRecord::new("A", "B", 5.0);
        edge.edge_type = Some(DEFAULT_EDGE_TYPE.to_string());
        edge.notes = Some(String::new());
        edge.active = Some(true);

        let text = serde_json::to_string(&edge).unwrap();
        assert_eq!(
            text,
            r#"{"from":"A","to":"B","weight":5.0,"type":"material","notes":"","active":true}"#
        );
    }
}
