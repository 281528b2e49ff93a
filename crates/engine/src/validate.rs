//! Graph validation: run this before handing a workflow to anything that
//! assumes a well-formed graph.
//!
//! Rules enforced:
//! 1. Node IDs must be unique.
//! 2. Edge IDs must be unique.
//! 3. Every edge must reference existing nodes (both `source` and `target`).
//! 4. A node's `parentId`, when set, must name a group node.
//!
//! The store itself tolerates violations of rules 3 and 4 (a removed group
//! leaves its children's `parentId` dangling); this check is opt-in.

use std::collections::{HashMap, HashSet};

use nodes::NodeKind;

use crate::error::EngineError;
use crate::models::{Edge, Node};

/// Validate the graph's structural invariants.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::DuplicateEdgeId`] if two edges share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EngineError::InvalidParent`] if a `parentId` is missing or not a group.
pub fn validate_graph(nodes: &[Node], edges: &[Edge]) -> Result<(), EngineError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut kinds: HashMap<&str, NodeKind> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if kinds.insert(node.id.as_str(), node.kind).is_some() {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    // -----------------------------------------------------------------------
    // 2. Ensure edge IDs are unique
    // -----------------------------------------------------------------------
    let mut seen_edges: HashSet<&str> = HashSet::with_capacity(edges.len());
    for edge in edges {
        if !seen_edges.insert(edge.id.as_str()) {
            return Err(EngineError::DuplicateEdgeId(edge.id.clone()));
        }
    }

    // -----------------------------------------------------------------------
    // 3. Validate edge endpoints
    // -----------------------------------------------------------------------
    for edge in edges {
        for (side, node_id) in [("source", &edge.source), ("target", &edge.target)] {
            if !kinds.contains_key(node_id.as_str()) {
                return Err(EngineError::UnknownNodeReference {
                    edge_id: edge.id.clone(),
                    node_id: node_id.clone(),
                    side,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // 4. Validate containment
    // -----------------------------------------------------------------------
    for node in nodes {
        if let Some(parent_id) = &node.parent_id {
            if kinds.get(parent_id.as_str()) != Some(&NodeKind::Group) {
                return Err(EngineError::InvalidParent {
                    node_id: node.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
    }

    Ok(())
}
