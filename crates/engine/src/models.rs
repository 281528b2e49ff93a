//! Core graph models: nodes, edges and the snapshot type passed between
//! components.
//!
//! The JSON shape matches what the canvas consumes: camelCase keys, a `type`
//! tag, an untagged `data` object shaped by that tag, and any keys this crate
//! does not model carried through untouched in `extra`.

use std::ops::Not;

use nodes::{NodeKind, PropertyError, TypedProperties};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in flow space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XYPosition {
    pub x: f64,
    pub y: f64,
}

impl XYPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position moved by `delta`.
    pub fn translate(self, delta: XYPosition) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

/// Measured or explicit size of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// How a node's position relates to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainedExtent {
    /// Position is absolute in flow space.
    #[default]
    None,
    /// Position is relative to the parent and must stay inside its bounds.
    Parent,
}

impl ContainedExtent {
    fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A vertex in the workflow graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
    /// Unique within the live node set; never changes once created.
    pub id: String,
    pub kind: NodeKind,
    pub position: XYPosition,
    /// Always the record shape matching `kind`.
    pub data: TypedProperties,
    /// Id of the containing group, if any.  May dangle after the group is removed.
    pub parent_id: Option<String>,
    pub extent: ContainedExtent,
    pub hidden: bool,
    pub selected: bool,
    pub size: Option<Size>,
    /// Keys the engine does not model, preserved verbatim.
    pub extra: Map<String, Value>,
}

impl Node {
    /// A top-level node with default properties for `kind`.
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        position: XYPosition,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: TypedProperties::for_kind(kind, label),
            parent_id: None,
            extent: ContainedExtent::None,
            hidden: false,
            selected: false,
            size: None,
            extra: Map::new(),
        }
    }

    /// Place this node inside `parent_id`, confined to the parent's bounds.
    pub fn within(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self.extent = ContainedExtent::Parent;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size { width, height });
        self
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<NodeKind>,
    #[serde(default)]
    position: XYPosition,
    #[serde(default)]
    data: Value,
    #[serde(default, alias = "parentNode")]
    parent_id: Option<String>,
    #[serde(default)]
    extent: ContainedExtent,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    selected: bool,
    #[serde(default)]
    size: Option<Size>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawNode> for Node {
    type Error = PropertyError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = raw.kind.unwrap_or_default();
        Ok(Self {
            data: TypedProperties::from_value(kind, raw.data)?,
            id: raw.id,
            kind,
            position: raw.position,
            parent_id: raw.parent_id,
            extent: raw.extent,
            hidden: raw.hidden,
            selected: raw.selected,
            size: raw.size,
            extra: raw.extra,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeRef<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: NodeKind,
    position: XYPosition,
    data: &'a TypedProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "ContainedExtent::is_none")]
    extent: ContainedExtent,
    #[serde(skip_serializing_if = "Not::not")]
    hidden: bool,
    #[serde(skip_serializing_if = "Not::not")]
    selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<Size>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRef {
            id: &self.id,
            kind: self.kind,
            position: self.position,
            data: &self.data,
            parent_id: self.parent_id.as_deref(),
            extent: self.extent,
            hidden: self.hidden,
            selected: self.selected,
            size: self.size,
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Not::not")]
    pub selected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            hidden: false,
            selected: false,
            extra: Map::new(),
        }
    }

    /// Whether this edge touches `node_id` at either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A requested connection, as reported by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A node and edge collection travelling together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_record_decodes_with_defaults() {
        let node: Node = serde_json::from_value(json!({ "id": "7" })).unwrap();
        assert_eq!(node.kind, NodeKind::Generic);
        assert_eq!(node.position, XYPosition::default());
        assert_eq!(node.label(), "");
        assert!(!node.hidden);
        assert_eq!(node.extent, ContainedExtent::None);
    }

    #[test]
    fn legacy_parent_node_key_is_accepted() {
        let node: Node = serde_json::from_value(json!({
            "id": "4",
            "type": "input",
            "data": { "label": "Input Image" },
            "position": { "x": 10.0, "y": 10.0 },
            "parentNode": "3",
            "extent": "parent"
        }))
        .unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("3"));
        assert_eq!(node.extent, ContainedExtent::Parent);

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["parentId"], "3");
        assert!(out.get("parentNode").is_none());
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let input = json!({
            "id": "1",
            "type": "dataset",
            "position": { "x": 250.0, "y": 5.0 },
            "data": { "label": "Load Dataset", "source": "customers.csv", "format": "CSV" },
            "style": { "border": "1px" },
            "zIndex": 3
        });
        let node: Node = serde_json::from_value(input).unwrap();
        assert_eq!(node.extra["zIndex"], 3);

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["style"], json!({ "border": "1px" }));
        assert_eq!(out["data"]["source"], "customers.csv");
    }

    #[test]
    fn default_flags_are_not_written() {
        let node = Node::new("1", NodeKind::Prompt, XYPosition::new(1.0, 2.0), "p");
        let out = serde_json::to_value(&node).unwrap();
        assert!(out.get("hidden").is_none());
        assert!(out.get("selected").is_none());
        assert!(out.get("extent").is_none());
        assert_eq!(out["type"], "prompt");
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let err = serde_json::from_value::<Node>(json!({ "id": "1", "type": "spreadsheet" }));
        assert!(err.is_err());
    }

    #[test]
    fn edge_keeps_handles_in_extra() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e1-2", "source": "1", "target": "2", "sourceHandle": "out"
        }))
        .unwrap();
        assert_eq!(edge.extra["sourceHandle"], "out");
        assert!(edge.touches("2"));
        assert!(!edge.touches("3"));
    }
}
