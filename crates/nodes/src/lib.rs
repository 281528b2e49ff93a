//! `nodes` crate: the closed set of node types and their typed properties.
//!
//! Every node placed on the canvas is one of the [`NodeKind`] variants and
//! carries the matching [`TypedProperties`] record.  Dispatch on the kind is
//! always an exhaustive `match`; there is no open-ended registry lookup.

pub mod error;
pub mod kind;
pub mod properties;

pub use error::PropertyError;
pub use kind::{node_type_registry, NodeDescriptor, NodeKind};
pub use properties::{
    DatasetFormat, DatasetProperties, LabelProperties, PromptProperties, Temperature,
    TypedProperties,
};
