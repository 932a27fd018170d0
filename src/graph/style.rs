//! Cosmetic edge attributes. None of these affect graph semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accent color used for relationship edges and their arrowheads.
pub const ACCENT_COLOR: &str = "var(--primary)";

/// Stroke width of relationship edges.
pub const STROKE_WIDTH: f64 = 2.0;

/// How the renderer routes an edge between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRouting {
    Default,
    Straight,
    Step,
    #[default]
    SmoothStep,
    SimpleBezier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default = "accent")]
    pub stroke: String,
    #[serde(default = "stroke_width")]
    pub stroke_width: f64,
    /// Any other style keys the backend sent, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: accent(),
            stroke_width: STROKE_WIDTH,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Arrow,
    #[default]
    ArrowClosed,
}

/// Arrowhead drawn at the referenced end of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEnd {
    #[serde(rename = "type", default)]
    pub kind: MarkerType,
    #[serde(default = "accent")]
    pub color: String,
}

impl Default for MarkerEnd {
    fn default() -> Self {
        Self {
            kind: MarkerType::ArrowClosed,
            color: accent(),
        }
    }
}

fn accent() -> String {
    ACCENT_COLOR.to_string()
}

fn stroke_width() -> f64 {
    STROKE_WIDTH
}
