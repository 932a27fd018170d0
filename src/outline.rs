//! Plain-text rendering of a schema graph, for terminals.

use unicode_width::UnicodeWidthStr;

use crate::graph::{KeyKind, SchemaGraph, SchemaGraphEdge, SchemaGraphNode};

pub struct OutlineRenderer {
    /// Minimum inner width of a table card, in terminal cells.
    pub min_width: usize,
    /// Gap between the column name and type cells.
    pub gutter: usize,
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self {
            min_width: 16,
            gutter: 2,
        }
    }
}

impl OutlineRenderer {
    pub fn render(&self, graph: &SchemaGraph) -> String {
        let mut out = String::new();
        out.push_str(graph.display_name());
        out.push('\n');

        for node in &graph.nodes {
            out.push('\n');
            self.render_node(&mut out, node);
        }

        if !graph.edges.is_empty() {
            out.push('\n');
            for edge in &graph.edges {
                out.push_str(&edge_line(edge));
                out.push('\n');
            }
        }
        out
    }

    fn render_node(&self, out: &mut String, node: &SchemaGraphNode) {
        let name_width = node
            .data
            .columns
            .iter()
            .map(|c| width(&c.title))
            .max()
            .unwrap_or(0);
        let type_width = node
            .data
            .columns
            .iter()
            .map(|c| width(&c.typ))
            .max()
            .unwrap_or(0);

        // "PK " marker + name + gutter + type
        let row_width = 3 + name_width + self.gutter + type_width;
        let inner = row_width.max(width(&node.data.label)).max(self.min_width);

        let rule = format!("+{}+\n", "-".repeat(inner + 2));
        out.push_str(&rule);
        out.push_str(&format!("| {} |\n", pad(&node.data.label, inner)));
        out.push_str(&rule);
        for col in &node.data.columns {
            let marker = match col.key {
                Some(KeyKind::PK) => "PK ",
                Some(KeyKind::FK) => "FK ",
                None => "   ",
            };
            let row = format!(
                "{}{}{}{}",
                marker,
                pad(&col.title, name_width),
                " ".repeat(self.gutter),
                col.typ
            );
            out.push_str(&format!("| {} |\n", pad(&row, inner)));
        }
        if !node.data.columns.is_empty() {
            out.push_str(&rule);
        }
    }
}

fn edge_line(edge: &SchemaGraphEdge) -> String {
    let end = |node: &str, handle: &Option<String>| match handle {
        Some(h) => format!("{node}.{h}"),
        None => node.to_string(),
    };
    format!(
        "{} -> {}",
        end(&edge.source, &edge.source_handle),
        end(&edge.target, &edge.target_handle)
    )
}

fn width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Right-pad to `cells` display cells.
fn pad(text: &str, cells: usize) -> String {
    let w = width(text);
    if w >= cells {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(cells - w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Connection;
    use serde_json::json;

    fn graph() -> SchemaGraph {
        SchemaGraph::from_schema_description(&json!({
            "schemaName": "shop",
            "nodes": [
                { "id": "users", "data": { "label": "users", "schema": [
                    { "title": "id", "type": "uuid", "key": "PK" },
                    { "title": "email", "type": "text" }
                ] } },
                { "id": "orders", "data": { "label": "orders" } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_render_cards() {
        let text = OutlineRenderer::default().render(&graph());
        assert!(text.starts_with("shop\n"));
        assert!(text.contains("| users            |"));
        assert!(text.contains("| PK id     uuid   |"));
        assert!(text.contains("|    email  text   |"));
        assert!(text.contains("| orders           |"));
    }

    #[test]
    fn test_render_edges() {
        let mut g = graph();
        g.connect(Connection::new("orders", "users").handles("user_id", "id"));
        g.connect(Connection::new("orders", "users"));
        let text = OutlineRenderer::default().render(&g);
        assert!(text.contains("orders.user_id -> users.id\n"));
        assert!(text.contains("orders -> users\n"));
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("ユーザー", 10), "ユーザー  ");
        assert_eq!(pad("User", 2), "User");
    }

    #[test]
    fn test_rows_align_with_wide_titles() {
        let g = SchemaGraph::from_schema_description(&json!({
            "nodes": [{ "id": "u", "data": { "label": "ユーザー", "schema": [
                { "title": "名前", "type": "text" },
                { "title": "id", "type": "int" }
            ] } }]
        }))
        .unwrap();
        let text = OutlineRenderer::default().render(&g);
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with('|') || l.starts_with('+'))
            .map(width)
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }
}
