//! Typed property records, one per node kind.
//!
//! On the wire a node's `data` object carries no tag of its own; the node's
//! `type` field decides which record it decodes into.  Unknown keys inside
//! `data` are kept in `extra` so older or newer editors do not lose them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{NodeKind, PropertyError};

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// Model sampling temperature, always within `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 2.0;

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(0.7)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = PropertyError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        // NaN fails both comparisons.
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PropertyError::TemperatureOutOfRange(value))
        }
    }
}

impl From<Temperature> for f64 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

// ---------------------------------------------------------------------------
// DatasetFormat
// ---------------------------------------------------------------------------

/// Storage format of a dataset source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatasetFormat {
    #[default]
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "JSON")]
    Json,
    Parquet,
    BigQuery,
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Json => write!(f, "JSON"),
            Self::Parquet => write!(f, "Parquet"),
            Self::BigQuery => write!(f, "BigQuery"),
        }
    }
}

impl FromStr for DatasetFormat {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" => Ok(Self::Parquet),
            "bigquery" => Ok(Self::BigQuery),
            _ => Err(PropertyError::UnknownFormat(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind records
// ---------------------------------------------------------------------------

/// Properties of group, generic, input and output nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelProperties {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of a dataset node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProperties {
    #[serde(default)]
    pub label: String,
    /// Path or URI the dataset is read from.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub format: DatasetFormat,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of a prompt node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptProperties {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_model() -> String {
    "gemini-pro".to_owned()
}

impl Default for PromptProperties {
    fn default() -> Self {
        Self {
            label: String::new(),
            model: default_model(),
            temperature: Temperature::default(),
            extra: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TypedProperties
// ---------------------------------------------------------------------------

/// The `data` record of a node, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedProperties {
    Dataset(DatasetProperties),
    Prompt(PromptProperties),
    Group(LabelProperties),
    /// Generic, input and output nodes.
    Plain(LabelProperties),
}

impl TypedProperties {
    /// Default properties for a freshly created node of `kind`.
    pub fn for_kind(kind: NodeKind, label: impl Into<String>) -> Self {
        let label = label.into();
        match kind {
            NodeKind::Dataset => Self::Dataset(DatasetProperties {
                label,
                ..Default::default()
            }),
            NodeKind::Prompt => Self::Prompt(PromptProperties {
                label,
                ..Default::default()
            }),
            NodeKind::Group => Self::Group(LabelProperties {
                label,
                ..Default::default()
            }),
            NodeKind::Generic | NodeKind::Input | NodeKind::Output => {
                Self::Plain(LabelProperties {
                    label,
                    ..Default::default()
                })
            }
        }
    }

    /// Decode an untagged `data` object according to `kind`.
    ///
    /// A `null` or absent `data` decodes to the kind's defaults.
    pub fn from_value(kind: NodeKind, value: Value) -> Result<Self, PropertyError> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let shape = |e: serde_json::Error| PropertyError::InvalidShape {
            kind,
            message: e.to_string(),
        };

        match kind {
            NodeKind::Dataset => serde_json::from_value(value).map(Self::Dataset).map_err(shape),
            NodeKind::Prompt => serde_json::from_value(value).map(Self::Prompt).map_err(shape),
            NodeKind::Group => serde_json::from_value(value).map(Self::Group).map_err(shape),
            NodeKind::Generic | NodeKind::Input | NodeKind::Output => {
                serde_json::from_value(value).map(Self::Plain).map_err(shape)
            }
        }
    }

    /// Whether this record is the right shape for a node of `kind`.
    pub fn fits(&self, kind: NodeKind) -> bool {
        matches!(
            (self, kind),
            (Self::Dataset(_), NodeKind::Dataset)
                | (Self::Prompt(_), NodeKind::Prompt)
                | (Self::Group(_), NodeKind::Group)
                | (
                    Self::Plain(_),
                    NodeKind::Generic | NodeKind::Input | NodeKind::Output
                )
        )
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Dataset(p) => &p.label,
            Self::Prompt(p) => &p.label,
            Self::Group(p) | Self::Plain(p) => &p.label,
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self {
            Self::Dataset(p) => p.label = label,
            Self::Prompt(p) => p.label = label,
            Self::Group(p) | Self::Plain(p) => p.label = label,
        }
    }

    pub fn as_dataset_mut(&mut self) -> Option<&mut DatasetProperties> {
        match self {
            Self::Dataset(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_prompt_mut(&mut self) -> Option<&mut PromptProperties> {
        match self {
            Self::Prompt(p) => Some(p),
            _ => None,
        }
    }
}
