//! Lenient reading of the backend's schema description.
//!
//! A field with the wrong JSON type reads as missing, and sequence entries
//! that are not objects are dropped. The builder fills in the gaps.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::style::{EdgeRouting, EdgeStyle, MarkerEnd};
use super::{KeyKind, NodeKind, Position};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchemaDescription {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub nodes: Vec<RawNode>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub edges: Vec<RawEdge>,
    #[serde(default, deserialize_with = "lenient")]
    pub schema_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNode {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<NodeKind>,
    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<RawNodeData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNodeData {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub schema: Vec<RawColumnRow>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawColumnRow {
    #[serde(default, deserialize_with = "lenient_id")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub typ: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<KeyKind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub source_handle: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub target_handle: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub animated: Option<bool>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<EdgeRouting>,
    #[serde(default, deserialize_with = "lenient")]
    pub style: Option<EdgeStyle>,
    #[serde(default, deserialize_with = "lenient")]
    pub marker_end: Option<MarkerEnd>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Identifiers may arrive as strings or numbers. Empty strings count as missing.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_sequences() {
        let raw: RawSchemaDescription = serde_json::from_value(json!({})).unwrap();
        assert!(raw.nodes.is_empty() && raw.edges.is_empty());
        assert!(raw.schema_name.is_none());
    }

    #[test]
    fn test_wrong_types_read_as_missing() {
        let raw: RawSchemaDescription = serde_json::from_value(json!({
            "nodes": [
                { "id": 7, "position": "top-left", "data": { "label": 3, "schema": "none" } },
                "not a node",
                null
            ],
            "edges": { "oops": true },
            "schemaName": ["x"]
        }))
        .unwrap();
        assert_eq!(raw.nodes.len(), 1);
        let node = &raw.nodes[0];
        assert_eq!(node.id.as_deref(), Some("7"));
        assert!(node.position.is_none());
        let data = node.data.as_ref().unwrap();
        assert!(data.label.is_none());
        assert!(data.schema.is_empty());
        assert!(raw.edges.is_empty());
        assert!(raw.schema_name.is_none());
    }

    #[test]
    fn test_edge_fields() {
        let edge: RawEdge = serde_json::from_value(json!({
            "id": "e1",
            "source": "orders",
            "target": "users",
            "sourceHandle": "user_id",
            "targetHandle": "id",
            "animated": false,
            "type": "step",
            "markerEnd": { "type": "arrow" }
        }))
        .unwrap();
        assert_eq!(edge.animated, Some(false));
        assert_eq!(edge.kind, Some(EdgeRouting::Step));
        assert_eq!(edge.source_handle.as_deref(), Some("user_id"));
        assert!(edge.style.is_none());
        assert!(edge.marker_end.is_some());
    }
}
