//! Per-column connection anchors.
//!
//! Every column row exposes an incoming anchor on the node's leading side and
//! an outgoing anchor on its trailing side, both keyed by the column title.

use super::{SchemaGraph, SchemaGraphEdge, SchemaGraphNode};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRole {
    /// Where edges arrive.
    Target,
    /// Where edges leave.
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSide {
    Leading,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor<'a> {
    pub id: &'a str,
    pub role: AnchorRole,
    pub side: AnchorSide,
    /// Index of the column row the anchor sits on.
    pub row: usize,
}

impl SchemaGraphNode {
    /// Two anchors per column, in row order: target first, then source.
    pub fn anchors(&self) -> impl Iterator<Item = Anchor<'_>> {
        self.data.columns.iter().enumerate().flat_map(|(row, col)| {
            [
                Anchor {
                    id: col.title.as_str(),
                    role: AnchorRole::Target,
                    side: AnchorSide::Leading,
                    row,
                },
                Anchor {
                    id: col.title.as_str(),
                    role: AnchorRole::Source,
                    side: AnchorSide::Trailing,
                    row,
                },
            ]
        })
    }

    pub fn anchor(&self, id: &str, role: AnchorRole) -> Option<Anchor<'_>> {
        self.anchors().find(|a| a.id == id && a.role == role)
    }

    pub fn has_anchor(&self, id: &str) -> bool {
        self.data.columns.iter().any(|c| c.title == id)
    }
}

/// Which end of an edge fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingEnd {
    MissingSourceNode,
    MissingTargetNode,
    MissingSourceHandle,
    MissingTargetHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    pub edge_id: String,
    pub end: DanglingEnd,
}

impl SchemaGraph {
    /// Edges whose endpoints do not resolve to a node anchor. An edge without
    /// a handle attaches to the node as a whole and only needs the node.
    pub fn dangling_edges(&self) -> Vec<DanglingEdge> {
        let nodes: HashMap<&str, &SchemaGraphNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        self.edges
            .iter()
            .filter_map(|edge| {
                check_edge(edge, &nodes).map(|end| DanglingEdge {
                    edge_id: edge.id.clone(),
                    end,
                })
            })
            .collect()
    }
}

fn check_edge(edge: &SchemaGraphEdge, nodes: &HashMap<&str, &SchemaGraphNode>) -> Option<DanglingEnd> {
    let Some(source) = nodes.get(edge.source.as_str()) else {
        return Some(DanglingEnd::MissingSourceNode);
    };
    let Some(target) = nodes.get(edge.target.as_str()) else {
        return Some(DanglingEnd::MissingTargetNode);
    };
    if let Some(handle) = &edge.source_handle {
        if source.anchor(handle, AnchorRole::Source).is_none() {
            return Some(DanglingEnd::MissingSourceHandle);
        }
    }
    if let Some(handle) = &edge.target_handle {
        if target.anchor(handle, AnchorRole::Target).is_none() {
            return Some(DanglingEnd::MissingTargetHandle);
        }
    }
    None
}
