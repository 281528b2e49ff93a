//! Node-local editors.
//!
//! Each editor is bound to one node and writes through the [`SyncBridge`]
//! rather than holding the store: it builds the full replacement collection
//! from the store's current contents and posts it as a wire message inside
//! [`SyncBridge::update`], so the bridge's structural check runs on every edit
//! and no concurrent change is overwritten.

use nodes::{DatasetFormat, NodeKind, Temperature};
use tracing::info;

use crate::bridge::{BridgeMessage, SyncBridge};
use crate::error::EngineError;
use crate::models::Node;

/// Replace the node `node_id` with the result of `edit`.
fn edit_node<F>(bridge: &SyncBridge, node_id: &str, edit: F) -> Result<(), EngineError>
where
    F: FnOnce(&mut Node) -> Result<(), EngineError>,
{
    bridge.update(|store| {
        let mut nodes = store.current_nodes().to_vec();
        let node = nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_owned()))?;
        edit(node)?;
        Ok(vec![BridgeMessage::ReplaceNodes(nodes).to_wire()])
    })
}

fn expect_kind(node: &Node, expected: NodeKind) -> Result<(), EngineError> {
    if node.kind == expected {
        Ok(())
    } else {
        Err(EngineError::WrongNodeKind {
            node_id: node.id.clone(),
            expected,
        })
    }
}

// ---------------------------------------------------------------------------
// LabelEditor
// ---------------------------------------------------------------------------

/// Renames any node.
#[derive(Debug, Clone)]
pub struct LabelEditor {
    node_id: String,
    bridge: SyncBridge,
}

impl LabelEditor {
    pub fn new(node_id: impl Into<String>, bridge: SyncBridge) -> Self {
        Self {
            node_id: node_id.into(),
            bridge,
        }
    }

    pub fn set_label(&self, label: &str) -> Result<(), EngineError> {
        edit_node(&self.bridge, &self.node_id, |node| {
            node.data.set_label(label);
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetEditor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DatasetEditor {
    node_id: String,
    bridge: SyncBridge,
}

impl DatasetEditor {
    pub fn new(node_id: impl Into<String>, bridge: SyncBridge) -> Self {
        Self {
            node_id: node_id.into(),
            bridge,
        }
    }

    pub fn set_source(&self, source: &str) -> Result<(), EngineError> {
        self.edit(|props| {
            props.source = source.to_owned();
            Ok(())
        })
    }

    /// Accepts any case of CSV, JSON, Parquet or BigQuery.
    pub fn set_format(&self, format: &str) -> Result<(), EngineError> {
        let format: DatasetFormat = format.parse()?;
        self.edit(|props| {
            props.format = format;
            Ok(())
        })
    }

    fn edit<F>(&self, f: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut nodes::DatasetProperties) -> Result<(), EngineError>,
    {
        edit_node(&self.bridge, &self.node_id, |node| {
            expect_kind(node, NodeKind::Dataset)?;
            match node.data.as_dataset_mut() {
                Some(props) => f(props),
                None => Err(EngineError::WrongNodeKind {
                    node_id: node.id.clone(),
                    expected: NodeKind::Dataset,
                }),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// PromptEditor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PromptEditor {
    node_id: String,
    bridge: SyncBridge,
}

impl PromptEditor {
    pub fn new(node_id: impl Into<String>, bridge: SyncBridge) -> Self {
        Self {
            node_id: node_id.into(),
            bridge,
        }
    }

    pub fn set_model(&self, model: &str) -> Result<(), EngineError> {
        self.edit(|props| {
            props.model = model.to_owned();
            Ok(())
        })
    }

    /// Rejects values outside `[0, 2]` before anything is posted.
    pub fn set_temperature(&self, temperature: f64) -> Result<(), EngineError> {
        let temperature = Temperature::try_from(temperature)?;
        self.edit(|props| {
            props.temperature = temperature;
            Ok(())
        })
    }

    fn edit<F>(&self, f: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut nodes::PromptProperties) -> Result<(), EngineError>,
    {
        edit_node(&self.bridge, &self.node_id, |node| {
            expect_kind(node, NodeKind::Prompt)?;
            match node.data.as_prompt_mut() {
                Some(props) => f(props),
                None => Err(EngineError::WrongNodeKind {
                    node_id: node.id.clone(),
                    expected: NodeKind::Prompt,
                }),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// GroupEditor
// ---------------------------------------------------------------------------

/// The collapse control drawn on a group node.
///
/// The collapsed flag lives in the store, so any number of editors for the
/// same group, and the session itself, agree on it.
#[derive(Debug, Clone)]
pub struct GroupEditor {
    group_id: String,
    bridge: SyncBridge,
}

impl GroupEditor {
    pub fn new(group_id: impl Into<String>, bridge: SyncBridge) -> Self {
        Self {
            group_id: group_id.into(),
            bridge,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.bridge.is_collapsed(&self.group_id)
    }

    /// Collapse or expand the group; returns whether it is now collapsed.
    pub fn toggle(&self) -> Result<bool, EngineError> {
        let collapsed = self.bridge.toggle_collapse(&self.group_id)?;
        info!(group_id = %self.group_id, collapsed, "group collapse toggled");
        Ok(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::XYPosition;
    use crate::store::{GraphStore, SharedGraphStore};
    use crate::template::DropEvent;
    use nodes::TypedProperties;

    fn setup() -> (SharedGraphStore, SyncBridge) {
        let store = SharedGraphStore::new(GraphStore::seeded());
        let bridge = SyncBridge::new(store.clone());
        (store, bridge)
    }

    #[test]
    fn dataset_editor_updates_source_and_format() {
        let (store, bridge) = setup();
        let editor = DatasetEditor::new("1", bridge);
        editor.set_source("customers.csv").unwrap();
        editor.set_format("parquet").unwrap();

        let store = store.read();
        match &store.node("1").unwrap().data {
            TypedProperties::Dataset(d) => {
                assert_eq!(d.source, "customers.csv");
                assert_eq!(d.format, DatasetFormat::Parquet);
            }
            other => panic!("unexpected properties {other:?}"),
        }
    }

    #[test]
    fn prompt_editor_rejects_bad_temperature_without_posting() {
        let (store, bridge) = setup();
        let before = store.snapshot();
        let editor = PromptEditor::new("2", bridge);

        assert!(matches!(
            editor.set_temperature(2.5),
            Err(EngineError::Property(nodes::PropertyError::TemperatureOutOfRange(_)))
        ));
        assert_eq!(store.snapshot(), before);

        editor.set_temperature(1.2).unwrap();
        editor.set_model("gemini-1.5-flash").unwrap();
        let store = store.read();
        match &store.node("2").unwrap().data {
            TypedProperties::Prompt(p) => {
                assert_eq!(p.temperature.value(), 1.2);
                assert_eq!(p.model, "gemini-1.5-flash");
            }
            other => panic!("unexpected properties {other:?}"),
        }
    }

    #[test]
    fn editor_on_wrong_kind_or_missing_node_fails() {
        let (_, bridge) = setup();
        assert!(matches!(
            PromptEditor::new("1", bridge.clone()).set_model("x"),
            Err(EngineError::WrongNodeKind { .. })
        ));
        assert!(matches!(
            LabelEditor::new("404", bridge).set_label("x"),
            Err(EngineError::NodeNotFound(_))
        ));
    }

    #[test]
    fn label_editor_renames_any_node() {
        let (store, bridge) = setup();
        LabelEditor::new("2", bridge).set_label("Summarise").unwrap();
        assert_eq!(store.read().node("2").unwrap().label(), "Summarise");
    }

    #[test]
    fn group_editor_toggles_children_through_bridge() {
        let (store, bridge) = setup();
        let added = store
            .write()
            .drop_template(&DropEvent::new("group", XYPosition::new(50.0, 50.0)))
            .unwrap();
        let group_id = added.nodes[0].id.clone();

        let editor = GroupEditor::new(&group_id, bridge);
        assert!(editor.toggle().unwrap());
        let hidden = store.read().current_nodes().iter().filter(|n| n.hidden).count();
        assert_eq!(hidden, 4);

        assert!(!editor.toggle().unwrap());
        assert!(store.read().current_nodes().iter().all(|n| !n.hidden));
    }

    #[test]
    fn two_editors_for_one_group_share_its_flag() {
        let (store, bridge) = setup();
        let added = store
            .write()
            .drop_template(&DropEvent::new("group", XYPosition::default()))
            .unwrap();
        let group_id = added.nodes[0].id.clone();

        let first = GroupEditor::new(&group_id, bridge.clone());
        let second = GroupEditor::new(&group_id, bridge);
        assert!(first.toggle().unwrap());
        assert!(second.is_collapsed());

        assert!(!second.toggle().unwrap());
        assert!(!first.is_collapsed());
        assert!(store.read().current_nodes().iter().all(|n| !n.hidden));
    }
}
