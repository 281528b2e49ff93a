//! The node-type enumeration and the descriptor table the canvas renders from.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Every type of node the editor knows how to place and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Loads a dataset from some source.
    Dataset,
    /// A prompt template sent to a model.
    Prompt,
    /// A container whose children reference it through `parentId`.
    Group,
    /// Plain node with only a label.  `"default"` is the canvas' name for it.
    #[default]
    #[serde(alias = "default")]
    Generic,
    /// Entry point with a single outgoing handle.
    Input,
    /// Exit point with a single incoming handle.
    Output,
}

impl NodeKind {
    /// All kinds, in sidebar order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Dataset,
        NodeKind::Prompt,
        NodeKind::Group,
        NodeKind::Generic,
        NodeKind::Input,
        NodeKind::Output,
    ];

    /// Resolve a drag-and-drop type token.
    ///
    /// Returns `None` for tokens that do not name a known kind; callers decide
    /// how to treat those.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "dataset" => Some(Self::Dataset),
            "prompt" => Some(Self::Prompt),
            "group" => Some(Self::Group),
            "generic" | "default" => Some(Self::Generic),
            "input" => Some(Self::Input),
            "output" => Some(Self::Output),
            _ => None,
        }
    }

    /// Canonical lowercase name, as written to workflow files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Prompt => "prompt",
            Self::Group => "group",
            Self::Generic => "generic",
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Whether nodes of this kind may contain children.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group)
    }

    /// Rendering metadata for this kind.
    pub fn descriptor(&self) -> NodeDescriptor {
        match self {
            Self::Dataset => NodeDescriptor {
                kind: *self,
                title: "Load Dataset",
                accent: "#34A853",
                accepts_input: false,
                emits_output: true,
            },
            Self::Prompt => NodeDescriptor {
                kind: *self,
                title: "Prompt Template",
                accent: "#4285F4",
                accepts_input: true,
                emits_output: true,
            },
            Self::Group => NodeDescriptor {
                kind: *self,
                title: "Complex Node",
                accent: "#FBBC04",
                accepts_input: true,
                emits_output: true,
            },
            Self::Generic => NodeDescriptor {
                kind: *self,
                title: "Node",
                accent: "#9AA0A6",
                accepts_input: true,
                emits_output: true,
            },
            Self::Input => NodeDescriptor {
                kind: *self,
                title: "Input",
                accent: "#9AA0A6",
                accepts_input: false,
                emits_output: true,
            },
            Self::Output => NodeDescriptor {
                kind: *self,
                title: "Output",
                accent: "#9AA0A6",
                accepts_input: true,
                emits_output: false,
            },
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NodeDescriptor
// ---------------------------------------------------------------------------

/// What the rendering collaborator needs to draw a node of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub kind: NodeKind,
    /// Heading shown in the sidebar palette.
    pub title: &'static str,
    /// Accent colour of the status dot, as a CSS hex string.
    pub accent: &'static str,
    /// Has a target handle.
    pub accepts_input: bool,
    /// Has a source handle.
    pub emits_output: bool,
}

/// Descriptor for every node kind, in sidebar order.
pub fn node_type_registry() -> [NodeDescriptor; 6] {
    NodeKind::ALL.map(|kind| kind.descriptor())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_maps_to_generic() {
        assert_eq!(NodeKind::from_token("default"), Some(NodeKind::Generic));
        assert_eq!(NodeKind::from_token("generic"), Some(NodeKind::Generic));
        assert_eq!(NodeKind::from_token("notebook"), None);
    }

    #[test]
    fn serde_accepts_default_alias() {
        let kind: NodeKind = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(kind, NodeKind::Generic);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"generic\"");
    }

    #[test]
    fn tokens_round_trip_through_as_str() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_token(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn registry_covers_every_kind_once() {
        let registry = node_type_registry();
        for (descriptor, kind) in registry.iter().zip(NodeKind::ALL) {
            assert_eq!(descriptor.kind, kind);
        }
    }

    #[test]
    fn handles_follow_node_role() {
        assert!(!NodeKind::Dataset.descriptor().accepts_input);
        assert!(!NodeKind::Output.descriptor().emits_output);
        assert!(NodeKind::Prompt.descriptor().accepts_input);
        assert!(NodeKind::Group.is_container());
        assert!(!NodeKind::Generic.is_container());
    }
}
