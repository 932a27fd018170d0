//! Relationship graph built from a backend schema description.

mod anchors;
mod description;
pub mod style;

pub use anchors::{Anchor, AnchorRole, AnchorSide, DanglingEdge, DanglingEnd};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::FetchError;
use description::{RawEdge, RawNode, RawSchemaDescription};
use style::{EdgeRouting, EdgeStyle, MarkerEnd};

/// Label shown for a table node that arrived without one.
pub const UNNAMED_NODE: &str = "No Name";

/// Title shown above the graph when the description has no schema name.
pub const DEFAULT_SCHEMA_NAME: &str = "Database Schema";

/// Node kinds the renderer knows how to draw. Tables are the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    #[serde(rename = "databaseSchema")]
    DatabaseSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Display marker on a column row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    PK,
    FK,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRow {
    /// Column name, doubling as the anchor id.
    pub title: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub key: Option<KeyKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub label: String,
    #[serde(rename = "schema")]
    pub columns: Vec<ColumnRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaGraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: TableData,
}

/// A directed "references" edge between two column anchors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub animated: bool,
    #[serde(rename = "type")]
    pub routing: EdgeRouting,
    pub style: EdgeStyle,
    pub marker_end: MarkerEnd,
}

/// Directed multigraph of tables and their relationships.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraph {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub nodes: Vec<SchemaGraphNode>,
    pub edges: Vec<SchemaGraphEdge>,
}

/// A user-drawn connection between two anchors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Builder: attach to specific column anchors.
    pub fn handles(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_handle = Some(source.into());
        self.target_handle = Some(target.into());
        self
    }
}

impl SchemaGraph {
    /// Build a graph from whatever the schema service returned. Missing or
    /// mistyped optional fields are defaulted; only a payload that is not a
    /// JSON object is rejected.
    pub fn from_schema_description(raw: &Value) -> Result<Self, FetchError> {
        if !raw.is_object() {
            return Err(FetchError::Malformed(format!(
                "expected an object, found {}",
                json_kind(raw)
            )));
        }
        let description = RawSchemaDescription::deserialize(raw)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let mut graph = SchemaGraph {
            schema_name: description.schema_name.filter(|s| !s.is_empty()),
            nodes: description
                .nodes
                .into_iter()
                .enumerate()
                .map(|(i, raw)| build_node(i, raw))
                .collect(),
            edges: Vec::with_capacity(description.edges.len()),
        };

        // Explicit ids win over generated ones, whatever their order.
        let reserved: HashSet<String> = description
            .edges
            .iter()
            .filter_map(|e| e.id.clone())
            .collect();
        for raw in description.edges {
            let edge = graph.build_edge(raw, &reserved);
            graph.edges.push(edge);
        }

        let dangling = graph.dangling_edges();
        if !dangling.is_empty() {
            tracing::warn!(
                count = dangling.len(),
                "schema description has edges that do not resolve to column anchors"
            );
        }
        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built schema graph"
        );

        Ok(graph)
    }

    pub fn from_json_str(input: &str) -> Result<Self, FetchError> {
        let raw: Value =
            serde_json::from_str(input).map_err(|e| FetchError::Malformed(e.to_string()))?;
        Self::from_schema_description(&raw)
    }

    /// Add a user-drawn edge with the standard relationship styling. Duplicate
    /// and self-referencing connections are accepted as they are.
    pub fn connect(&mut self, connection: Connection) -> &SchemaGraphEdge {
        let base = edge_id_base(
            &connection.source,
            connection.source_handle.as_deref(),
            &connection.target,
            connection.target_handle.as_deref(),
        );
        let id = self.unique_edge_id(base, &HashSet::new());
        tracing::debug!(%id, source = %connection.source, target = %connection.target, "connect");

        let index = self.edges.len();
        self.edges.push(SchemaGraphEdge {
            id,
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            animated: true,
            routing: EdgeRouting::SmoothStep,
            style: EdgeStyle::default(),
            marker_end: MarkerEnd::default(),
        });
        &self.edges[index]
    }

    pub fn node(&self, id: &str) -> Option<&SchemaGraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Title for the graph view.
    pub fn display_name(&self) -> &str {
        self.schema_name.as_deref().unwrap_or(DEFAULT_SCHEMA_NAME)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    fn build_edge(&self, raw: RawEdge, reserved: &HashSet<String>) -> SchemaGraphEdge {
        let source = raw.source.unwrap_or_default();
        let target = raw.target.unwrap_or_default();
        if source.is_empty() || target.is_empty() {
            tracing::warn!(id = ?raw.id, "edge without source or target");
        }
        let id = match raw.id {
            Some(id) if !self.edges.iter().any(|e| e.id == id) => id,
            Some(id) => {
                tracing::warn!(%id, "duplicate edge id");
                self.unique_edge_id(id, reserved)
            }
            None => self.unique_edge_id(
                edge_id_base(
                    &source,
                    raw.source_handle.as_deref(),
                    &target,
                    raw.target_handle.as_deref(),
                ),
                reserved,
            ),
        };

        SchemaGraphEdge {
            id,
            source,
            target,
            source_handle: raw.source_handle,
            target_handle: raw.target_handle,
            animated: raw.animated.unwrap_or(true),
            routing: raw.kind.unwrap_or_default(),
            style: raw.style.unwrap_or_default(),
            marker_end: raw.marker_end.unwrap_or_default(),
        }
    }

    /// `base`, or `base-N` with the smallest N not used by an existing edge
    /// or by one of the `reserved` ids.
    fn unique_edge_id(&self, base: String, reserved: &HashSet<String>) -> String {
        let taken: HashSet<&str> = self
            .edges
            .iter()
            .map(|e| e.id.as_str())
            .chain(reserved.iter().map(String::as_str))
            .collect();
        if !taken.contains(base.as_str()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn edge_id_base(
    source: &str,
    source_handle: Option<&str>,
    target: &str,
    target_handle: Option<&str>,
) -> String {
    format!(
        "xy-edge__{}{}-{}{}",
        source,
        source_handle.unwrap_or(""),
        target,
        target_handle.unwrap_or("")
    )
}

fn build_node(index: usize, raw: RawNode) -> SchemaGraphNode {
    let id = raw.id.unwrap_or_else(|| {
        tracing::warn!(index, "node without id");
        format!("node-{index}")
    });
    let data = raw.data.unwrap_or_default();

    let columns = data
        .schema
        .into_iter()
        .filter_map(|row| {
            let title = row.title?;
            Some(ColumnRow {
                title,
                typ: row.typ.unwrap_or_default(),
                key: row.key,
            })
        })
        .collect();

    SchemaGraphNode {
        id,
        kind: raw.kind.unwrap_or_default(),
        position: raw.position.unwrap_or_default(),
        data: TableData {
            label: data
                .label
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNNAMED_NODE.to_string()),
            columns,
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
