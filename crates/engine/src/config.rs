//! Editor configuration.

use std::path::PathBuf;

use crate::workflow::DEFAULT_TITLE;

/// Tuning knobs for an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Local-storage key the working copy is saved under.
    pub storage_key: String,
    /// Title given to new workflows.
    pub default_title: String,
    /// Directory backing local storage.
    pub storage_dir: PathBuf,
    /// Directory that receives downloadable saves.
    pub download_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: "vertex-workflow".to_owned(),
            default_title: DEFAULT_TITLE.to_owned(),
            storage_dir: PathBuf::from(".vertex"),
            download_dir: PathBuf::from("."),
        }
    }
}
