//! The Graph Store: the single owner of the canonical node and edge
//! collections.
//!
//! Both collections are only ever swapped together or individually as a
//! whole; readers see either the old snapshot or the new one.  Across
//! threads, [`SharedGraphStore`] puts every mutation behind one write lock.
//!
//! The store also owns the collapsed flag of every group, so the session and
//! each group's editor see the same state.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use nodes::NodeKind;
use tracing::{debug, info};

use crate::changes::{self, EdgeChange, NodeChange};
use crate::collapse::CollapseController;
use crate::error::InvalidDropError;
use crate::ids::IdAllocator;
use crate::models::{Connection, Edge, Graph, Node, XYPosition};
use crate::template::{self, DropEvent};

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ids: IdAllocator,
    collapse: CollapseController,
}

impl GraphStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `nodes` and `edges`, with ids allocated above them.
    pub fn from_graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let ids = IdAllocator::seeded_from(&nodes);
        Self {
            nodes,
            edges,
            ids,
            collapse: CollapseController::new(),
        }
    }

    /// The starter graph shown on a fresh canvas: a dataset feeding a prompt.
    pub fn seeded() -> Self {
        Self::from_graph(
            vec![
                Node::new("1", NodeKind::Dataset, XYPosition::new(250.0, 5.0), "Load Dataset"),
                Node::new("2", NodeKind::Prompt, XYPosition::new(100.0, 100.0), "Prompt Template"),
            ],
            vec![Edge::new("e1-2", "1", "2")],
        )
    }

    pub fn current_nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn current_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn snapshot(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn collapse(&self) -> &CollapseController {
        &self.collapse
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapse.is_collapsed(group_id)
    }

    /// Treat `group_id` as already collapsed without touching the graph.
    pub fn mark_collapsed(&mut self, group_id: &str) {
        self.collapse.mark_collapsed(group_id);
    }

    pub(crate) fn set_collapse(&mut self, collapse: CollapseController) {
        self.collapse = collapse;
    }

    // ------------------------------------------------------------------
    // Whole-collection replacement
    // ------------------------------------------------------------------

    /// Swap both collections at once.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.ids.advance_past(&nodes);
        debug!(nodes = nodes.len(), edges = edges.len(), "graph replaced");
        self.nodes = nodes;
        self.edges = edges;
    }

    /// Swap in a freshly loaded graph and forget every group's collapsed flag.
    pub fn load(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.replace(nodes, edges);
        self.collapse.reset();
    }

    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.ids.advance_past(&nodes);
        debug!(nodes = nodes.len(), "nodes replaced");
        self.nodes = nodes;
    }

    pub fn replace_edges(&mut self, edges: Vec<Edge>) {
        debug!(edges = edges.len(), "edges replaced");
        self.edges = edges;
    }

    // ------------------------------------------------------------------
    // Canvas events
    // ------------------------------------------------------------------

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        let nodes = changes::apply_node_changes(changes, &self.nodes);
        self.replace_nodes(nodes);
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        let edges = changes::apply_edge_changes(changes, &self.edges);
        self.replace_edges(edges);
    }

    /// Connect two nodes; returns the new edge's id, or `None` if nothing was added.
    pub fn connect(&mut self, connection: &Connection) -> Option<String> {
        let edges = changes::connect(connection, &self.edges, &mut self.ids);
        let added = (edges.len() > self.edges.len())
            .then(|| edges.last().map(|e| e.id.clone()))
            .flatten();
        self.replace_edges(edges);
        added
    }

    /// Instantiate the dropped template and append it; returns what was added.
    pub fn drop_template(&mut self, event: &DropEvent) -> Result<Graph, InvalidDropError> {
        let added = template::instantiate_drop(event, &self.nodes, &mut self.ids)?;
        info!(
            token = event.type_token.as_deref().unwrap_or_default(),
            nodes = added.nodes.len(),
            "template dropped"
        );

        let mut nodes = self.nodes.clone();
        nodes.extend(added.nodes.iter().cloned());
        let mut edges = self.edges.clone();
        edges.extend(added.edges.iter().cloned());
        self.replace(nodes, edges);

        Ok(added)
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// A cloneable handle to one [`GraphStore`] guarded by a single lock.
#[derive(Debug, Clone, Default)]
pub struct SharedGraphStore(Arc<RwLock<GraphStore>>);

impl SharedGraphStore {
    pub fn new(store: GraphStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Graph {
        self.read().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_allocates_from_three() {
        let store = GraphStore::seeded();
        assert_eq!(store.current_nodes().len(), 2);
        assert_eq!(store.current_edges().len(), 1);
        assert_eq!(store.ids().peek(), 3);
    }

    #[test]
    fn replace_advances_id_counter() {
        let mut store = GraphStore::seeded();
        store.replace(
            vec![Node::new("40", NodeKind::Generic, XYPosition::default(), "x")],
            Vec::new(),
        );
        let added = store
            .drop_template(&DropEvent::new("prompt", XYPosition::default()))
            .unwrap();
        assert_eq!(added.nodes[0].id, "41");
    }

    #[test]
    fn drops_after_loading_the_largest_numeric_id_stay_unique() {
        let max = u64::MAX.to_string();
        let mut store = GraphStore::new();
        store.load(
            vec![Node::new(&max, NodeKind::Generic, XYPosition::default(), "x")],
            Vec::new(),
        );

        store
            .drop_template(&DropEvent::new("prompt", XYPosition::default()))
            .unwrap();
        store
            .drop_template(&DropEvent::new("group", XYPosition::default()))
            .unwrap();

        let ids: std::collections::HashSet<_> =
            store.current_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), 7);
        assert_eq!(store.current_nodes().iter().filter(|n| n.id == max).count(), 1);
    }

    #[test]
    fn load_forgets_collapsed_groups() {
        let mut store = GraphStore::seeded();
        store.mark_collapsed("g");
        assert!(store.is_collapsed("g"));

        store.load(Vec::new(), Vec::new());
        assert!(!store.is_collapsed("g"));
    }

    #[test]
    fn invalid_drop_leaves_store_untouched() {
        let mut store = GraphStore::seeded();
        let before = store.snapshot();
        let event = DropEvent {
            type_token: None,
            position: XYPosition::default(),
        };
        assert!(store.drop_template(&event).is_err());
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.ids().peek(), 3);
    }

    #[test]
    fn connect_reports_new_edge_id() {
        let mut store = GraphStore::seeded();
        assert_eq!(store.connect(&Connection::new("1", "2")), None);
        let id = store.connect(&Connection::new("2", "1")).unwrap();
        assert!(store.current_edges().iter().any(|e| e.id == id));
    }

    #[test]
    fn shared_handle_sees_writes() {
        let shared = SharedGraphStore::new(GraphStore::seeded());
        let other = shared.clone();
        other.write().apply_node_changes(&[NodeChange::Remove { id: "1".into() }]);
        assert_eq!(shared.read().current_nodes().len(), 1);
    }
}
