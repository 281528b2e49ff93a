//! The Sync Bridge: how components that do not own the Graph Store ask for
//! its node or edge collection to be replaced.
//!
//! Wire format: `{ "type": "UPDATE_NODES" | "UPDATE_EDGES", "payload": [...] }`.
//! A payload must be an array of objects each carrying a string `id`, and
//! every record must also decode as a full [`Node`] or [`Edge`]: a node `type`
//! outside the known kinds, a `null` position, or properties that fail their
//! kind's checks all reject the message.  Keys the engine does not model are
//! kept.  Rejected messages are logged and dropped without touching the store.
//! Valid messages replace the whole collection, in the order they were posted.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::MalformedMessage;
use crate::models::{Edge, Graph, Node};
use crate::store::{GraphStore, SharedGraphStore};

pub const UPDATE_NODES: &str = "UPDATE_NODES";
pub const UPDATE_EDGES: &str = "UPDATE_EDGES";

// ---------------------------------------------------------------------------
// BridgeMessage
// ---------------------------------------------------------------------------

/// A validated bridge message.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    ReplaceNodes(Vec<Node>),
    ReplaceEdges(Vec<Edge>),
}

impl BridgeMessage {
    /// Validate a raw wire message.
    pub fn parse(raw: &Value) -> Result<Self, MalformedMessage> {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MalformedMessage::MissingType)?;
        let payload = raw.get("payload");

        match kind {
            UPDATE_NODES => decode_records(UPDATE_NODES, payload).map(Self::ReplaceNodes),
            UPDATE_EDGES => decode_records(UPDATE_EDGES, payload).map(Self::ReplaceEdges),
            other => Err(MalformedMessage::UnknownType(other.to_owned())),
        }
    }

    /// Validate a message received as JSON text.
    pub fn parse_str(text: &str) -> Result<Self, MalformedMessage> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| MalformedMessage::NotJson(e.to_string()))?;
        Self::parse(&raw)
    }

    /// The wire form of this message.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::ReplaceNodes(nodes) => json!({ "type": UPDATE_NODES, "payload": nodes }),
            Self::ReplaceEdges(edges) => json!({ "type": UPDATE_EDGES, "payload": edges }),
        }
    }
}

fn decode_records<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    payload: Option<&Value>,
) -> Result<Vec<T>, MalformedMessage> {
    let records = payload
        .and_then(Value::as_array)
        .ok_or(MalformedMessage::PayloadNotArray { kind })?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.get("id").is_some_and(Value::is_string) {
                return Err(MalformedMessage::MissingId { kind, index });
            }
            T::deserialize(record).map_err(|e| MalformedMessage::InvalidRecord {
                kind,
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SyncBridge
// ---------------------------------------------------------------------------

/// Mutation callbacks handed down from the owner of the store.
///
/// Cloning a bridge gives another handle onto the same store.
#[derive(Debug, Clone)]
pub struct SyncBridge {
    store: SharedGraphStore,
}

impl SyncBridge {
    pub fn new(store: SharedGraphStore) -> Self {
        Self { store }
    }

    /// Current graph, for editors that compute a replacement from it.
    pub fn snapshot(&self) -> Graph {
        self.store.snapshot()
    }

    /// Validate and deliver one wire message.
    pub fn post(&self, raw: &Value) -> Result<(), MalformedMessage> {
        let message = admit(raw)?;
        self.deliver(message);
        Ok(())
    }

    /// Validate and deliver one message received as JSON text.
    pub fn post_str(&self, text: &str) -> Result<(), MalformedMessage> {
        let message = BridgeMessage::parse_str(text).map_err(|e| {
            warn!(error = %e, "sync bridge rejected message");
            e
        })?;
        self.deliver(message);
        Ok(())
    }

    /// Validate every message first, then deliver them all under one lock.
    ///
    /// If any message is malformed the whole batch is dropped.
    pub fn post_batch(&self, raws: &[Value]) -> Result<(), MalformedMessage> {
        let messages = admit_all(raws)?;

        let mut store = self.store.write();
        for message in messages {
            apply(&mut store, message);
        }
        Ok(())
    }

    /// Build wire messages from the current store and deliver them while
    /// still holding the write lock, so no other mutation lands in between.
    ///
    /// Returning an error from `edit`, or any malformed message, leaves the
    /// store untouched.
    pub fn update<F, E>(&self, edit: F) -> Result<(), E>
    where
        F: FnOnce(&GraphStore) -> Result<Vec<Value>, E>,
        E: From<MalformedMessage>,
    {
        let mut store = self.store.write();
        let raws = edit(&*store)?;
        for message in admit_all(&raws)? {
            apply(&mut store, message);
        }
        Ok(())
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.store.read().is_collapsed(group_id)
    }

    /// Collapse or expand `group_id`; returns whether it is now collapsed.
    ///
    /// The store's collapsed flag and both collections change under one lock.
    /// If the resulting batch is rejected the flag is left as it was.
    pub fn toggle_collapse(&self, group_id: &str) -> Result<bool, MalformedMessage> {
        let mut store = self.store.write();
        let mut next = store.collapse().clone();
        let graph = next.toggle_collapse(group_id, store.current_nodes(), store.current_edges());

        let messages = admit_all(&[
            BridgeMessage::ReplaceNodes(graph.nodes).to_wire(),
            BridgeMessage::ReplaceEdges(graph.edges).to_wire(),
        ])?;
        for message in messages {
            apply(&mut store, message);
        }

        let collapsed = next.is_collapsed(group_id);
        store.set_collapse(next);
        Ok(collapsed)
    }

    /// `replaceNodes` callback: `payload` must be an array of node records.
    pub fn replace_nodes(&self, payload: Value) -> Result<(), MalformedMessage> {
        self.post(&json!({ "type": UPDATE_NODES, "payload": payload }))
    }

    /// `replaceEdges` callback: `payload` must be an array of edge records.
    pub fn replace_edges(&self, payload: Value) -> Result<(), MalformedMessage> {
        self.post(&json!({ "type": UPDATE_EDGES, "payload": payload }))
    }

    /// Deliver an already validated message.
    pub fn deliver(&self, message: BridgeMessage) {
        apply(&mut self.store.write(), message);
    }
}

fn admit(raw: &Value) -> Result<BridgeMessage, MalformedMessage> {
    BridgeMessage::parse(raw).map_err(|e| {
        warn!(error = %e, "sync bridge rejected message");
        e
    })
}

fn admit_all(raws: &[Value]) -> Result<Vec<BridgeMessage>, MalformedMessage> {
    raws.iter().map(admit).collect()
}

fn apply(store: &mut GraphStore, message: BridgeMessage) {
    match message {
        BridgeMessage::ReplaceNodes(nodes) => {
            debug!(count = nodes.len(), "bridge replacing nodes");
            store.replace_nodes(nodes);
        }
        BridgeMessage::ReplaceEdges(edges) => {
            debug!(count = edges.len(), "bridge replacing edges");
            store.replace_edges(edges);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn bridge() -> (SharedGraphStore, SyncBridge) {
        let store = SharedGraphStore::new(GraphStore::seeded());
        let bridge = SyncBridge::new(store.clone());
        (store, bridge)
    }

    #[test]
    fn object_payload_is_rejected_and_store_unchanged() {
        let (store, bridge) = bridge();
        let before = store.snapshot();

        let err = bridge
            .post(&json!({ "type": "UPDATE_NODES", "payload": { "not": "an array" } }))
            .unwrap_err();

        assert_eq!(err, MalformedMessage::PayloadNotArray { kind: UPDATE_NODES });
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn record_without_string_id_is_rejected() {
        let (store, bridge) = bridge();
        let before = store.snapshot();

        let err = bridge
            .replace_edges(json!([{ "id": "ok", "source": "1", "target": "2" }, { "id": 5 }]))
            .unwrap_err();

        assert_eq!(err, MalformedMessage::MissingId { kind: UPDATE_EDGES, index: 1 });
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn unknown_type_and_missing_type_are_rejected() {
        let (_, bridge) = bridge();
        assert_eq!(
            bridge.post(&json!({ "type": "UPDATE_TITLE", "payload": [] })),
            Err(MalformedMessage::UnknownType("UPDATE_TITLE".into()))
        );
        assert_eq!(bridge.post(&json!({ "payload": [] })), Err(MalformedMessage::MissingType));
        assert!(matches!(bridge.post_str("{oops"), Err(MalformedMessage::NotJson(_))));
    }

    #[test]
    fn valid_nodes_message_replaces_not_merges() {
        let (store, bridge) = bridge();
        bridge
            .replace_nodes(json!([{ "id": "9", "type": "output", "custom": true }]))
            .unwrap();

        let store = store.read();
        assert_eq!(store.current_nodes().len(), 1);
        assert_eq!(store.current_nodes()[0].extra["custom"], true);
        assert_eq!(store.current_edges().len(), 1);
        assert_eq!(store.ids().peek(), 10);
    }

    #[test]
    fn last_message_of_a_kind_wins() {
        let (store, bridge) = bridge();
        bridge.replace_edges(json!([{ "id": "a" }])).unwrap();
        bridge.replace_edges(json!([{ "id": "b" }, { "id": "c" }])).unwrap();
        let ids: Vec<_> = store.read().current_edges().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let (store, bridge) = bridge();
        let before = store.snapshot();
        let result = bridge.post_batch(&[
            json!({ "type": "UPDATE_NODES", "payload": [] }),
            json!({ "type": "UPDATE_EDGES", "payload": "nope" }),
        ]);
        assert!(result.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn wire_form_round_trips() {
        let message = BridgeMessage::ReplaceNodes(GraphStore::seeded().snapshot().nodes);
        assert_eq!(BridgeMessage::parse(&message.to_wire()).unwrap(), message);
    }

    #[test]
    fn record_with_bad_properties_is_rejected() {
        let (store, bridge) = bridge();
        let before = store.snapshot();
        let err = bridge
            .replace_nodes(json!([{ "id": "1", "type": "prompt", "data": { "temperature": 9 } }]))
            .unwrap_err();
        assert!(matches!(err, MalformedMessage::InvalidRecord { index: 0, .. }));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn record_with_unknown_node_type_or_null_position_is_rejected() {
        let (store, bridge) = bridge();
        let before = store.snapshot();
        for record in [
            json!({ "id": "x", "type": "customNode" }),
            json!({ "id": "x", "position": null }),
        ] {
            let err = bridge.replace_nodes(json!([record])).unwrap_err();
            assert!(matches!(err, MalformedMessage::InvalidRecord { index: 0, .. }));
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn update_failing_midway_leaves_store_untouched() {
        let (store, bridge) = bridge();
        let before = store.snapshot();

        let result = bridge.update(|graph| {
            if graph.node("404").is_none() {
                return Err(EngineError::NodeNotFound("404".into()));
            }
            Ok(Vec::new())
        });
        assert!(matches!(result, Err(EngineError::NodeNotFound(_))));

        let result: Result<(), EngineError> =
            bridge.update(|_| Ok(vec![json!({ "type": "UPDATE_EDGES", "payload": 1 })]));
        assert!(matches!(result, Err(EngineError::MalformedMessage(_))));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn update_builds_from_the_locked_store() {
        let (store, bridge) = bridge();
        bridge
            .update::<_, MalformedMessage>(|graph| {
                let mut edges = graph.current_edges().to_vec();
                edges.push(Edge::new("e2-1", "2", "1"));
                Ok(vec![BridgeMessage::ReplaceEdges(edges).to_wire()])
            })
            .unwrap();
        assert_eq!(store.read().current_edges().len(), 2);
    }
}
