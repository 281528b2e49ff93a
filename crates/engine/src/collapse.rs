//! The Group Collapse Controller.
//!
//! Collapsing a group hides its direct children and every edge touching them;
//! expanding shows them again.  Containment is followed one level only: a
//! group nested inside a collapsed group keeps its own children's flags.
//!
//! Whether a group is collapsed is tracked here, per group id, rather than
//! read back from node visibility, so two toggles always cancel out.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{Edge, Graph, Node};

/// Collapse state for any number of groups.  Every group starts expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseController {
    collapsed: HashSet<String>,
}

impl CollapseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapsed.contains(group_id)
    }

    /// Record `group_id` as collapsed without touching any graph.
    ///
    /// Used when resuming from a graph whose flags were saved while collapsed.
    pub fn mark_collapsed(&mut self, group_id: impl Into<String>) {
        self.collapsed.insert(group_id.into());
    }

    /// Forget all collapse state, e.g. after a load replaces the graph.
    pub fn reset(&mut self) {
        self.collapsed.clear();
    }

    /// Flip `group_id` between expanded and collapsed and return the updated graph.
    pub fn toggle_collapse(&mut self, group_id: &str, nodes: &[Node], edges: &[Edge]) -> Graph {
        let collapse = !self.is_collapsed(group_id);
        let graph = set_group_visibility(group_id, collapse, nodes, edges);

        if collapse {
            self.collapsed.insert(group_id.to_owned());
        } else {
            self.collapsed.remove(group_id);
        }
        debug!(group_id, collapsed = collapse, "group toggled");

        graph
    }
}

/// Hide (`hidden = true`) or show the direct children of `group_id` and the
/// edges incident to them.
///
/// When showing, an incident edge stays hidden if its other endpoint is still
/// hidden.  Entries outside the cascade are returned unchanged.
pub fn set_group_visibility(group_id: &str, hidden: bool, nodes: &[Node], edges: &[Edge]) -> Graph {
    let descendants: HashSet<&str> = nodes
        .iter()
        .filter(|n| n.parent_id.as_deref() == Some(group_id))
        .map(|n| n.id.as_str())
        .collect();

    let nodes: Vec<Node> = nodes
        .iter()
        .map(|n| {
            let mut n = n.clone();
            if descendants.contains(n.id.as_str()) {
                n.hidden = hidden;
            }
            n
        })
        .collect();

    let visibility: HashMap<&str, bool> =
        nodes.iter().map(|n| (n.id.as_str(), n.hidden)).collect();
    let is_hidden = |id: &str| visibility.get(id).copied().unwrap_or(false);

    let edges: Vec<Edge> = edges
        .iter()
        .map(|e| {
            let mut e = e.clone();
            let incident =
                descendants.contains(e.source.as_str()) || descendants.contains(e.target.as_str());
            if incident {
                e.hidden = hidden || is_hidden(&e.source) || is_hidden(&e.target);
            }
            e
        })
        .collect();

    Graph::new(nodes, edges)
}
