//! Engine-level error types.

use thiserror::Error;

/// A drop gesture that names no node type.  The store must not change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("drop ignored: no node type token was supplied")]
pub struct InvalidDropError;

/// A persisted workflow that is not valid JSON or not workflow-shaped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not read workflow: {0}")]
pub struct ParseFailure(pub String);

/// A Sync Bridge message that failed structural validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedMessage {
    #[error("message is not valid JSON: {0}")]
    NotJson(String),

    #[error("message has no string `type` field")]
    MissingType,

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("{kind} payload is not an array")]
    PayloadNotArray { kind: &'static str },

    #[error("{kind} payload record {index} has no string `id`")]
    MissingId { kind: &'static str, index: usize },

    #[error("{kind} payload record {index} is invalid: {message}")]
    InvalidRecord {
        kind: &'static str,
        index: usize,
        message: String,
    },
}

/// Errors produced by the workflow engine.
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Recovered locally ------

    #[error(transparent)]
    MalformedMessage(#[from] MalformedMessage),

    #[error(transparent)]
    InvalidDrop(#[from] InvalidDropError),

    // ------ Surfaced to the user ------

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// Run was requested on a workflow with no nodes.
    #[error("cannot run an empty workflow; add some nodes first")]
    EmptyWorkflowRun,

    // ------ Validation errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// Two or more edges share the same ID.
    #[error("duplicate edge ID: '{0}'")]
    DuplicateEdgeId(String),

    /// An edge references a node ID that doesn't exist in the graph.
    #[error("edge '{edge_id}' references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        edge_id: String,
        node_id: String,
        side: &'static str,
    },

    /// A node's `parentId` is missing from the graph or is not a group.
    #[error("node '{node_id}' has parent '{parent_id}', which is not a group in this graph")]
    InvalidParent { node_id: String, parent_id: String },

    // ------ Editing errors ------

    #[error("node not found: '{0}'")]
    NodeNotFound(String),

    #[error("node '{node_id}' is not a {expected} node")]
    WrongNodeKind {
        node_id: String,
        expected: nodes::NodeKind,
    },

    #[error(transparent)]
    Property(#[from] nodes::PropertyError),

    // ------ Collaborators ------

    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}
