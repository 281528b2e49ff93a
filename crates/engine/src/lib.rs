//! `engine` crate: the workflow graph engine behind the visual editor.
//!
//! Graph model, the Graph Store, the Change Engine, template instantiation,
//! group collapse, the Sync Bridge and node-local editors, plus the
//! Load/Save/Share/Run session built on top of them.

pub mod bridge;
pub mod changes;
pub mod collapse;
pub mod config;
pub mod editors;
pub mod error;
pub mod ids;
pub mod models;
pub mod session;
pub mod store;
pub mod template;
pub mod validate;
pub mod workflow;

pub use nodes::{node_type_registry, NodeDescriptor, NodeKind, TypedProperties};

pub use bridge::{BridgeMessage, SyncBridge};
pub use changes::{apply_edge_changes, apply_node_changes, connect, EdgeChange, NodeChange};
pub use collapse::CollapseController;
pub use config::EditorConfig;
pub use editors::{DatasetEditor, GroupEditor, LabelEditor, PromptEditor};
pub use error::{EngineError, InvalidDropError, MalformedMessage, ParseFailure};
pub use ids::IdAllocator;
pub use models::{Connection, ContainedExtent, Edge, Graph, Node, Size, XYPosition};
pub use session::{Clipboard, LoadOutcome, MemoryClipboard, SaveReceipt, Session};
pub use store::{GraphStore, SharedGraphStore};
pub use template::{instantiate, DropEvent};
pub use validate::validate_graph;
pub use workflow::{ExecutionPlan, PlanStep, WorkflowDocument};
