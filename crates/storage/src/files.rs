//! Downloadable files and dropped-file reading.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::StorageError;

/// File name offered for a download of a workflow titled `title`.
///
/// Every run of whitespace becomes a single underscore, and path separators
/// become underscores so the name never points outside the download directory.
pub fn download_file_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + 5);
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else if matches!(c, '/' | '\\') {
            name.push('_');
            in_space = false;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    name.push_str(".json");
    name
}

/// Destination for files the user downloads.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Offer `contents` as a download named `file_name`; returns where it went.
    async fn offer(&self, file_name: &str, contents: &str) -> Result<PathBuf, StorageError>;
}

/// Writes downloads into a directory, overwriting files of the same name.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloads {
    async fn offer(&self, file_name: &str, contents: &str) -> Result<PathBuf, StorageError> {
        let file_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| StorageError::InvalidKey(file_name.to_owned()))?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        info!(path = %path.display(), "download written");
        Ok(path)
    }
}

/// Read a file the user dropped onto the editor.
pub async fn read_dropped_file(path: impl AsRef<Path>) -> Result<String, StorageError> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(download_file_name("Untitled Workflow"), "Untitled_Workflow.json");
        assert_eq!(download_file_name("a  b\tc"), "a_b_c.json");
        assert_eq!(download_file_name(" lead"), "_lead.json");
    }

    #[tokio::test]
    async fn separators_in_title_stay_inside_download_dir() {
        assert_eq!(download_file_name("a/b"), "a_b.json");
        assert_eq!(download_file_name("..\\up"), ".._up.json");

        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path());
        let path = sink.offer(&download_file_name("a/b"), "{}").await.unwrap();
        assert_eq!(path, dir.path().join("a_b.json"));
    }

    #[tokio::test]
    async fn directory_downloads_write_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path());
        let path = sink.offer("My_Flow.json", "{}").await.unwrap();
        assert_eq!(path, dir.path().join("My_Flow.json"));
        assert_eq!(read_dropped_file(&path).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn reading_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dropped_file(dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
