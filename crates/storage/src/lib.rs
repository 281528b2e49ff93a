//! `storage` crate: pure persistence plumbing.
//!
//! Provides a key-value store standing in for browser local storage, a sink
//! for downloadable files, and an async reader for dropped files.  Everything
//! here moves opaque strings; the workflow document format lives in `engine`.

pub mod error;
pub mod files;
pub mod kv;

pub use error::StorageError;
pub use files::{download_file_name, read_dropped_file, DirectoryDownloads, DownloadSink};
pub use kv::{FsKeyValueStore, KeyValueStore, MemoryKeyValueStore};
