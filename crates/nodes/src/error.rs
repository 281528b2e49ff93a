//! Property-level error type.

use thiserror::Error;

use crate::NodeKind;

/// Errors raised while decoding or editing a node's typed properties.
///
/// These only ever come from the editing form fields; the graph engine
/// treats a node whose properties fail to decode as a malformed record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    /// Sampling temperature must lie in `[0, 2]`.
    #[error("temperature {0} is outside the allowed range [0, 2]")]
    TemperatureOutOfRange(f64),

    /// The dataset format is not one of CSV, JSON, Parquet, BigQuery.
    #[error("unknown dataset format: '{0}'")]
    UnknownFormat(String),

    /// The `data` object does not fit the shape expected for the node type.
    #[error("invalid {kind} properties: {message}")]
    InvalidShape { kind: NodeKind, message: String },
}
