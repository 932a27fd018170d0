pub mod client;
pub mod column;
pub mod config;
pub mod draft;
pub mod error;
pub mod graph;
pub mod outline;
pub mod surface;
pub mod theme;

use wasm_bindgen::prelude::*;

use column::{ColumnDefinition, ColumnUpdate};
use draft::TableDraft;
use graph::{Connection, SchemaGraph};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// A blank column definition as JSON.
#[wasm_bindgen(js_name = "newColumn")]
pub fn new_column() -> Result<String, String> {
    serde_json::to_string(&ColumnDefinition::new()).map_err(|e| e.to_string())
}

/// Apply a `{ field, value }` change event to a column.
#[wasm_bindgen(js_name = "applyColumnUpdate")]
pub fn apply_column_update(column: &str, update: &str) -> Result<String, String> {
    let column: ColumnDefinition = serde_json::from_str(column).map_err(|e| e.to_string())?;
    let update: ColumnUpdate = serde_json::from_str(update)
        .map_err(|e| error::ValidationError::InvalidUpdate(e.to_string()).to_string())?;
    serde_json::to_string(&column.set_field(update)).map_err(|e| e.to_string())
}

/// Validate a draft and build the table-creation request body.
#[wasm_bindgen(js_name = "createTableRequest")]
pub fn create_table_request(draft: &str) -> Result<String, String> {
    let draft: TableDraft = serde_json::from_str(draft).map_err(|e| e.to_string())?;
    let request = draft
        .build_create_table_request()
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&request).map_err(|e| e.to_string())
}

/// Convert a raw schema description into renderable nodes and edges.
#[wasm_bindgen(js_name = "schemaGraph")]
pub fn schema_graph(description: &str) -> Result<String, String> {
    let graph = SchemaGraph::from_json_str(description).map_err(|e| e.to_string())?;
    serde_json::to_string(&graph).map_err(|e| e.to_string())
}

/// Add a user-drawn connection to a graph previously returned by `schemaGraph`.
#[wasm_bindgen(js_name = "connectEdge")]
pub fn connect_edge(graph: &str, connection: &str) -> Result<String, String> {
    let mut graph = SchemaGraph::from_json_str(graph).map_err(|e| e.to_string())?;
    let connection: Connection = serde_json::from_str(connection).map_err(|e| e.to_string())?;
    graph.connect(connection);
    serde_json::to_string(&graph).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_column_round_trip_through_js_boundary() {
        let column = new_column().unwrap();
        let updated =
            apply_column_update(&column, r#"{"field":"isPrimaryKey","value":true}"#).unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["isPrimaryKey"], true);
        assert_eq!(value["isNullable"], false);

        let err = apply_column_update(&column, r#"{"field":"colour","value":"red"}"#).unwrap_err();
        assert!(err.starts_with("Invalid column update"));
    }

    #[test]
    fn test_create_table_request_errors_are_messages() {
        assert_eq!(
            create_table_request(r#"{"tableName":"","columns":[{"name":"id"}]}"#).unwrap_err(),
            "Table name is required."
        );
        let body = create_table_request(
            r#"{"tableName":"tags","columns":[{"name":""},{"name":"id"}]}"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["columns"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_graph_and_connect() {
        let graph = schema_graph(r#"{"nodes":[{"id":"A","data":{"label":"A"}}]}"#).unwrap();
        let graph = connect_edge(
            &graph,
            r#"{"source":"A","target":"A","sourceHandle":"id","targetHandle":"id"}"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&graph).unwrap();
        assert_eq!(value["edges"][0]["type"], "smoothstep");
        assert_eq!(value["edges"][0]["animated"], true);
        assert!(schema_graph("[]").is_err());
    }
}
