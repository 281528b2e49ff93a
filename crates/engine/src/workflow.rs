//! The persisted workflow document and the textual execution plan.
//!
//! These types are what leaves the process: the JSON written to local
//! storage and downloads, the JSON copied when sharing, and the plan
//! reported by Run.

use std::fmt;

use chrono::{DateTime, Utc};
use nodes::NodeKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{EngineError, ParseFailure};
use crate::models::{Edge, Node};

pub const DEFAULT_TITLE: &str = "Untitled Workflow";

// ---------------------------------------------------------------------------
// WorkflowDocument
// ---------------------------------------------------------------------------

/// `{ title, nodes, edges, savedAt }`: the unit of save and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<Edge>,
    /// Set on save; absent in shared copies.
    #[serde(default, alias = "timestamp", skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

fn title_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .filter(|t| !t.is_empty())
        .unwrap_or_else(default_title))
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl WorkflowDocument {
    /// A document without a timestamp, as used for sharing.
    pub fn new(title: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            title: title.into(),
            nodes,
            edges,
            saved_at: None,
        }
    }

    /// This document stamped with the current time.
    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(Utc::now());
        self
    }

    /// Parse a persisted workflow.  Missing `nodes`/`edges` read as empty.
    ///
    /// # Errors
    /// [`ParseFailure`] if `text` is not JSON, not an object, or any node or
    /// edge record is malformed.  Nothing is partially returned.
    pub fn from_json(text: &str) -> Result<Self, ParseFailure> {
        let value: Value = serde_json::from_str(text).map_err(|e| ParseFailure(e.to_string()))?;
        if !value.is_object() {
            return Err(ParseFailure("expected a JSON object".to_owned()));
        }
        serde_json::from_value(value).map_err(|e| ParseFailure(e.to_string()))
    }

    /// Pretty-printed JSON, as written to storage and downloads.
    pub fn to_pretty_json(&self) -> Result<String, ParseFailure> {
        serde_json::to_string_pretty(self).map_err(|e| ParseFailure(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ExecutionPlan
// ---------------------------------------------------------------------------

/// One line of the plan: `"{index}. {label} ({type})"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    /// 1-based position in node order.
    pub index: usize,
    pub label: String,
    pub kind: NodeKind,
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} ({})", self.index, self.label, self.kind)
    }
}

/// What Run reports instead of executing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub title: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    /// Build the plan for a graph, in node order.
    ///
    /// # Errors
    /// [`EngineError::EmptyWorkflowRun`] when there are no nodes.
    pub fn build(title: &str, nodes: &[Node], edges: &[Edge]) -> Result<Self, EngineError> {
        if nodes.is_empty() {
            return Err(EngineError::EmptyWorkflowRun);
        }

        let steps = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| PlanStep {
                index: i + 1,
                label: node.label().to_owned(),
                kind: node.kind,
            })
            .collect();

        Ok(Self {
            title: title.to_owned(),
            node_count: nodes.len(),
            edge_count: edges.len(),
            steps,
        })
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Starting workflow: {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "Nodes: {}", self.node_count)?;
        writeln!(f, "Connections: {}", self.edge_count)?;
        writeln!(f)?;
        writeln!(f, "Execution Plan:")?;
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}
