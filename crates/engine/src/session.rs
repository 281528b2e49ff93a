//! An editing session: the owner of the Graph Store and the Load, Save,
//! Share and Run actions surfaced to the user.
//!
//! `Session` holds the canonical store, hands [`SyncBridge`] handles to
//! node-local editors, and talks to persistence through the `storage` crate's
//! traits so tests can substitute in-memory collaborators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use storage::{DirectoryDownloads, DownloadSink, FsKeyValueStore, KeyValueStore};
use tracing::{info, instrument, warn};

use crate::bridge::SyncBridge;
use crate::changes::{EdgeChange, NodeChange};
use crate::config::EditorConfig;
use crate::error::EngineError;
use crate::models::{Connection, Graph};
use crate::store::{GraphStore, SharedGraphStore};
use crate::template::DropEvent;
use crate::workflow::{ExecutionPlan, WorkflowDocument};

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

/// Where Share puts the workflow JSON.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), EngineError>;
}

/// Keeps the last copied text; useful for tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), EngineError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Where a save went.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub document: WorkflowDocument,
    pub download: PathBuf,
}

/// Result of trying to load from local storage.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { title: String, nodes: usize, edges: usize },
    /// Nothing saved yet; the caller may offer a file instead.
    NothingSaved,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    title: String,
    store: SharedGraphStore,
    bridge: SyncBridge,
    config: EditorConfig,
    local: Arc<dyn KeyValueStore>,
    downloads: Arc<dyn DownloadSink>,
    clipboard: Arc<dyn Clipboard>,
}

impl Session {
    /// A session over an empty graph with injected collaborators.
    pub fn new(
        config: EditorConfig,
        local: Arc<dyn KeyValueStore>,
        downloads: Arc<dyn DownloadSink>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let store = SharedGraphStore::new(GraphStore::new());
        Self {
            title: config.default_title.clone(),
            bridge: SyncBridge::new(store.clone()),
            store,
            config,
            local,
            downloads,
            clipboard,
        }
    }

    /// A session persisting to the directories named in `config`.
    pub fn from_config(config: EditorConfig, clipboard: Arc<dyn Clipboard>) -> Self {
        let local = Arc::new(FsKeyValueStore::new(&config.storage_dir));
        let downloads = Arc::new(DirectoryDownloads::new(&config.download_dir));
        Self::new(config, local, downloads, clipboard)
    }

    /// Start from the seed graph instead of an empty canvas.
    pub fn with_seed_graph(self) -> Self {
        *self.store.write() = GraphStore::seeded();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn store(&self) -> &SharedGraphStore {
        &self.store
    }

    /// A bridge handle for a node-local editor.
    pub fn bridge(&self) -> SyncBridge {
        self.bridge.clone()
    }

    pub fn snapshot(&self) -> Graph {
        self.store.snapshot()
    }

    // ------------------------------------------------------------------
    // Canvas events
    // ------------------------------------------------------------------

    pub fn apply_node_changes(&self, changes: &[NodeChange]) {
        self.store.write().apply_node_changes(changes);
    }

    pub fn apply_edge_changes(&self, changes: &[EdgeChange]) {
        self.store.write().apply_edge_changes(changes);
    }

    pub fn connect(&self, connection: &Connection) -> Option<String> {
        self.store.write().connect(connection)
    }

    pub fn drop_template(&self, event: &DropEvent) -> Result<Graph, EngineError> {
        Ok(self.store.write().drop_template(event)?)
    }

    /// Toggle a group from the session's side; returns whether it is now collapsed.
    pub fn toggle_collapse(&self, group_id: &str) -> Result<bool, EngineError> {
        Ok(self.bridge.toggle_collapse(group_id)?)
    }

    /// Treat `group_id` as already collapsed, e.g. for a graph loaded with its
    /// children hidden.
    pub fn mark_collapsed(&self, group_id: &str) {
        self.store.write().mark_collapsed(group_id);
    }

    // ------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------

    fn document(&self) -> WorkflowDocument {
        let graph = self.store.snapshot();
        WorkflowDocument::new(&self.title, graph.nodes, graph.edges)
    }

    /// Save to local storage and offer a download named after the title.
    #[instrument(skip(self), fields(title = %self.title))]
    pub async fn save(&self) -> Result<SaveReceipt, EngineError> {
        let document = self.document().stamped();
        let text = document.to_pretty_json()?;

        self.local.set(&self.config.storage_key, &text).await?;
        let file_name = storage::download_file_name(&self.title);
        let download = self.downloads.offer(&file_name, &text).await?;

        info!(nodes = document.nodes.len(), edges = document.edges.len(), "workflow saved");
        Ok(SaveReceipt { document, download })
    }

    /// Load the working copy from local storage, if there is one.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<LoadOutcome, EngineError> {
        match self.local.get(&self.config.storage_key).await? {
            Some(text) => self.load_str(&text),
            None => {
                info!("no saved workflow found");
                Ok(LoadOutcome::NothingSaved)
            }
        }
    }

    /// Load a workflow file the user dropped onto the editor.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, EngineError> {
        let text = storage::read_dropped_file(path).await?;
        self.load_str(&text)
    }

    /// Replace the whole graph and title from JSON text.
    ///
    /// On a parse failure nothing changes.
    pub fn load_str(&mut self, text: &str) -> Result<LoadOutcome, EngineError> {
        let document = WorkflowDocument::from_json(text).map_err(|e| {
            warn!(error = %e, "workflow load failed");
            e
        })?;

        let outcome = LoadOutcome::Loaded {
            title: document.title.clone(),
            nodes: document.nodes.len(),
            edges: document.edges.len(),
        };
        self.store.write().load(document.nodes, document.edges);
        self.title = document.title;

        info!(?outcome, "workflow loaded");
        Ok(outcome)
    }

    /// The pretty-printed `{title, nodes, edges}` record, without a timestamp.
    pub fn share_text(&self) -> Result<String, EngineError> {
        Ok(self.document().to_pretty_json()?)
    }

    /// Copy `{title, nodes, edges}` to the clipboard; returns the copied text.
    pub fn share(&self) -> Result<String, EngineError> {
        let text = self.share_text()?;
        self.clipboard.write_text(&text)?;
        info!(bytes = text.len(), "workflow copied to clipboard");
        Ok(text)
    }

    /// Validate the graph is non-empty and report what would run.
    pub fn run(&self) -> Result<ExecutionPlan, EngineError> {
        let graph = self.store.snapshot();
        let plan = ExecutionPlan::build(&self.title, &graph.nodes, &graph.edges)?;
        info!(nodes = plan.node_count, edges = plan.edge_count, "execution plan built");
        Ok(plan)
    }
}
