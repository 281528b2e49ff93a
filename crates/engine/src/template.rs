//! The Template Instantiator: turns one drop gesture into the nodes it
//! creates.
//!
//! Dropping `"group"` builds a pre-populated container; any other token builds
//! a single node.  Ids come from the caller's [`IdAllocator`], one per node.

use nodes::NodeKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::InvalidDropError;
use crate::ids::IdAllocator;
use crate::models::{Graph, Node, Size, XYPosition};

/// Default extent of a freshly dropped group.
pub const GROUP_SIZE: Size = Size {
    width: 400.0,
    height: 200.0,
};

pub const GROUP_LABEL: &str = "Image Editing";

/// Children placed inside a new group, with positions relative to it.
const GROUP_CHILDREN: [(NodeKind, &str, XYPosition); 4] = [
    (NodeKind::Input, "Input Image", XYPosition { x: 10.0, y: 10.0 }),
    (NodeKind::Generic, "Prompt", XYPosition { x: 10.0, y: 90.0 }),
    (NodeKind::Generic, "Gemini Model", XYPosition { x: 200.0, y: 50.0 }),
    (NodeKind::Output, "Output Image", XYPosition { x: 350.0, y: 90.0 }),
];

/// A drop onto the canvas, already translated into flow coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    /// The dragged palette entry; absent when the drag carried no payload.
    #[serde(default)]
    pub type_token: Option<String>,
    pub position: XYPosition,
}

impl DropEvent {
    pub fn new(type_token: impl Into<String>, position: XYPosition) -> Self {
        Self {
            type_token: Some(type_token.into()),
            position,
        }
    }
}

/// Build the nodes (and edges, currently none) created by dropping `type_token`.
///
/// Unknown tokens produce a generic node that keeps the token in its label.
/// New ids avoid every id in `existing`.
#[instrument(skip(existing, ids), fields(next_id = ids.peek()))]
pub fn instantiate(
    type_token: Option<&str>,
    position: XYPosition,
    existing: &[Node],
    ids: &mut IdAllocator,
) -> Result<Graph, InvalidDropError> {
    let token = match type_token {
        Some(token) if !token.is_empty() => token,
        _ => return Err(InvalidDropError),
    };

    if token == "group" {
        return Ok(group_template(position, existing, ids));
    }

    let kind = NodeKind::from_token(token).unwrap_or_else(|| {
        debug!(token, "unrecognised node type token; creating a generic node");
        NodeKind::Generic
    });
    let node = Node::new(ids.next_node_id(existing), kind, position, format!("{token} node"));
    Ok(Graph::new(vec![node], Vec::new()))
}

/// Convenience wrapper taking a whole [`DropEvent`].
pub fn instantiate_drop(
    event: &DropEvent,
    existing: &[Node],
    ids: &mut IdAllocator,
) -> Result<Graph, InvalidDropError> {
    instantiate(event.type_token.as_deref(), event.position, existing, ids)
}

fn group_template(position: XYPosition, existing: &[Node], ids: &mut IdAllocator) -> Graph {
    let group_id = ids.next_node_id(existing);
    let group = Node::new(&group_id, NodeKind::Group, position, GROUP_LABEL)
        .with_size(GROUP_SIZE.width, GROUP_SIZE.height);

    let mut nodes = Vec::with_capacity(1 + GROUP_CHILDREN.len());
    nodes.push(group);
    for (kind, label, offset) in GROUP_CHILDREN {
        nodes.push(Node::new(ids.next_node_id(existing), kind, offset, label).within(&group_id));
    }

    Graph::new(nodes, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainedExtent;
    use std::collections::HashSet;

    #[test]
    fn group_template_has_four_contained_children() {
        let mut ids = IdAllocator::starting_at(3);
        let graph = instantiate(Some("group"), XYPosition::new(50.0, 50.0), &[], &mut ids).unwrap();

        assert_eq!(graph.nodes.len(), 5);
        assert!(graph.edges.is_empty());

        let group = &graph.nodes[0];
        assert_eq!(group.kind, NodeKind::Group);
        assert_eq!(group.id, "3");
        assert_eq!(group.size, Some(GROUP_SIZE));
        assert_eq!(group.position, XYPosition::new(50.0, 50.0));

        let children = &graph.nodes[1..];
        assert!(children
            .iter()
            .all(|c| c.parent_id.as_deref() == Some("3") && c.extent == ContainedExtent::Parent));
        let kinds: Vec<_> = children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Input, NodeKind::Generic, NodeKind::Generic, NodeKind::Output]
        );
        assert_eq!(children[2].position, XYPosition::new(200.0, 50.0));
        assert_eq!(ids.peek(), 8);
    }

    #[test]
    fn single_node_gets_token_label() {
        let mut ids = IdAllocator::starting_at(3);
        let graph = instantiate(Some("prompt"), XYPosition::new(1.0, 2.0), &[], &mut ids).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        let node = &graph.nodes[0];
        assert_eq!(node.kind, NodeKind::Prompt);
        assert_eq!(node.label(), "prompt node");
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn default_token_creates_generic_node() {
        let mut ids = IdAllocator::default();
        let graph = instantiate(Some("default"), XYPosition::default(), &[], &mut ids).unwrap();
        assert_eq!(graph.nodes[0].kind, NodeKind::Generic);
        assert_eq!(graph.nodes[0].label(), "default node");
    }

    #[test]
    fn empty_or_missing_token_is_rejected_without_consuming_ids() {
        let mut ids = IdAllocator::starting_at(3);
        assert_eq!(instantiate(Some(""), XYPosition::default(), &[], &mut ids), Err(InvalidDropError));
        assert_eq!(instantiate(None, XYPosition::default(), &[], &mut ids), Err(InvalidDropError));
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn repeated_drops_never_reuse_ids() {
        let mut ids = IdAllocator::starting_at(3);
        let mut seen = HashSet::new();
        for token in ["group", "dataset", "group", "output", "anything"] {
            let event = DropEvent::new(token, XYPosition::default());
            for node in instantiate_drop(&event, &[], &mut ids).unwrap().nodes {
                assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
            }
        }
        assert_eq!(seen.len(), 5 + 1 + 5 + 1 + 1);
    }
}
