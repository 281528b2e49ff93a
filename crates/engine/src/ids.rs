//! Identifier allocation for nodes and edges.

use tracing::{debug, warn};

use crate::models::{Edge, Node};

/// Hands out node and edge ids that never collide within a session.
///
/// Node ids are decimal strings drawn from a counter.  The counter only moves
/// forward: observing a graph advances it past the largest numeric id found
/// there.  Once the numeric space is used up it wraps to zero, and from then
/// on only the ids of live nodes are guaranteed to be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next_node: u64,
    next_edge: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdAllocator {
    pub fn starting_at(next_node: u64) -> Self {
        Self {
            next_node,
            next_edge: 1,
        }
    }

    /// An allocator whose first id is one above the largest numeric id in `nodes`.
    pub fn seeded_from(nodes: &[Node]) -> Self {
        let mut ids = Self::default();
        ids.advance_past(nodes);
        ids
    }

    /// The id the next call to [`IdAllocator::next_node_id`] will return.
    pub fn peek(&self) -> u64 {
        self.next_node
    }

    /// Id for a new node, distinct from every id in `existing`.
    pub fn next_node_id(&mut self, existing: &[Node]) -> String {
        loop {
            let id = self.next_node.to_string();
            self.next_node = match self.next_node.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!("node id counter exhausted, wrapping to zero");
                    0
                }
            };
            if !existing.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }

    /// Id for a new edge `source → target`, distinct from every id in `existing`.
    pub fn next_edge_id(&mut self, source: &str, target: &str, existing: &[Edge]) -> String {
        loop {
            let id = format!("e{source}-{target}-{}", self.next_edge);
            self.next_edge += 1;
            if !existing.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    /// Move the node counter past every numeric id in `nodes`.
    pub fn advance_past(&mut self, nodes: &[Node]) {
        let max = nodes.iter().filter_map(|n| n.id.parse::<u64>().ok()).max();
        if let Some(max) = max {
            if max >= self.next_node {
                let next = max.checked_add(1).unwrap_or_else(|| {
                    warn!(max, "node id counter exhausted, wrapping to zero");
                    0
                });
                debug!(from = self.next_node, to = next, "advancing id counter");
                self.next_node = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::XYPosition;
    use nodes::NodeKind;

    fn node(id: &str) -> Node {
        Node::new(id, NodeKind::Generic, XYPosition::default(), "n")
    }

    #[test]
    fn seeded_from_starts_above_highest_numeric_id() {
        let mut ids = IdAllocator::seeded_from(&[node("1"), node("12"), node("group-a")]);
        assert_eq!(ids.next_node_id(&[]), "13");
        assert_eq!(ids.next_node_id(&[]), "14");
    }

    #[test]
    fn next_node_id_skips_live_ids() {
        let mut ids = IdAllocator::starting_at(4);
        let live = [node("4"), node("5")];
        assert_eq!(ids.next_node_id(&live), "6");
    }

    #[test]
    fn exhausted_counter_wraps_without_reusing_live_ids() {
        let max = u64::MAX.to_string();
        let live = [node(&max), node("0"), node("1")];
        let mut ids = IdAllocator::seeded_from(&live);
        assert_eq!(ids.peek(), 0);
        assert_eq!(ids.next_node_id(&live), "2");

        let mut ids = IdAllocator::starting_at(u64::MAX);
        assert_eq!(ids.next_node_id(&[]), max);
        assert_eq!(ids.next_node_id(&[]), "0");
    }

    #[test]
    fn advance_never_rewinds() {
        let mut ids = IdAllocator::starting_at(50);
        ids.advance_past(&[node("3")]);
        assert_eq!(ids.peek(), 50);
        ids.advance_past(&[node("90")]);
        assert_eq!(ids.peek(), 91);
    }

    #[test]
    fn edge_ids_skip_existing_ones() {
        let mut ids = IdAllocator::default();
        let existing = vec![Edge::new("e1-2-1", "1", "2")];
        assert_eq!(ids.next_edge_id("1", "2", &existing), "e1-2-2");
        assert_eq!(ids.next_edge_id("1", "2", &existing), "e1-2-3");
    }
}
