//! The Change Engine: applies batches of edit operations reported by the
//! canvas and returns the post-state.
//!
//! Rules:
//! 1. Changes apply strictly in the order given, each against the result of
//!    the previous one.
//! 2. A change naming an id that is not present is a no-op.
//! 3. `Remove` never cascades to children; their `parent_id` is left dangling.
//! 4. `Add` of an id that is already present replaces that entry in place,
//!    so ids stay unique.
//! 5. Inputs are never mutated; every call builds a new collection.

use tracing::trace;

use crate::ids::IdAllocator;
use crate::models::{Connection, Edge, Node, Size, XYPosition};

// ---------------------------------------------------------------------------
// Change types
// ---------------------------------------------------------------------------

/// An edit to the node collection.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// Move a node by `delta`.
    Position { id: String, delta: XYPosition },
    Select { id: String, selected: bool },
    Remove { id: String },
    Add(Node),
    /// The canvas measured (or resized) a node.
    Dimensions { id: String, size: Size },
}

/// An edit to the edge collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
    Add(Edge),
}

// ---------------------------------------------------------------------------
// Shared element behaviour
// ---------------------------------------------------------------------------

/// What the engine needs to know about nodes and edges alike.
trait Element: Clone {
    fn id(&self) -> &str;
    fn set_selected(&mut self, selected: bool);
}

impl Element for Node {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl Element for Edge {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

fn find_mut<'a, T: Element>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    let found = items.iter_mut().find(|item| item.id() == id);
    if found.is_none() {
        trace!(id, "change targets unknown id; ignored");
    }
    found
}

fn upsert<T: Element>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

fn remove<T: Element>(items: &mut Vec<T>, id: &str) {
    items.retain(|item| item.id() != id);
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Apply `changes` to `nodes` in order and return the resulting collection.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &[Node]) -> Vec<Node> {
    let mut out = nodes.to_vec();

    for change in changes {
        match change {
            NodeChange::Position { id, delta } => {
                if let Some(node) = find_mut(&mut out, id) {
                    node.position = node.position.translate(*delta);
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = find_mut(&mut out, id) {
                    node.set_selected(*selected);
                }
            }
            NodeChange::Dimensions { id, size } => {
                if let Some(node) = find_mut(&mut out, id) {
                    node.size = Some(*size);
                }
            }
            NodeChange::Remove { id } => remove(&mut out, id),
            NodeChange::Add(node) => upsert(&mut out, node.clone()),
        }
    }

    out
}

/// Apply `changes` to `edges` in order and return the resulting collection.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &[Edge]) -> Vec<Edge> {
    let mut out = edges.to_vec();

    for change in changes {
        match change {
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = find_mut(&mut out, id) {
                    edge.set_selected(*selected);
                }
            }
            EdgeChange::Remove { id } => remove(&mut out, id),
            EdgeChange::Add(edge) => upsert(&mut out, edge.clone()),
        }
    }

    out
}

/// Append an edge for `connection` unless one with the same endpoints exists.
///
/// Connections with an empty endpoint are ignored.
pub fn connect(connection: &Connection, edges: &[Edge], ids: &mut IdAllocator) -> Vec<Edge> {
    let mut out = edges.to_vec();

    if connection.source.is_empty() || connection.target.is_empty() {
        trace!(?connection, "incomplete connection ignored");
        return out;
    }

    let duplicate = edges
        .iter()
        .any(|e| e.source == connection.source && e.target == connection.target);
    if duplicate {
        trace!(?connection, "edge already exists");
        return out;
    }

    let id = ids.next_edge_id(&connection.source, &connection.target, edges);
    out.push(Edge::new(id, &connection.source, &connection.target));
    out
}
