//! Canonical metadata records returned to callers.

use serde::Serialize;

use crate::path_codec::{dirname, PathCodec};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// Metadata of a file, with its path relative to the root prefix.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileRecord {
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub path: String,
    pub dirname: String,
    pub timestamp: i64,
    pub size: u64,
    pub mimetype: String,
    pub identifier: Option<String>,
}

/// Result of creating a directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryRecord {
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub path: String,
}

/// Current time as a unix timestamp.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Builds records so the root prefix never leaks to callers.
pub struct MetadataNormalizer<'a> {
    codec: &'a PathCodec,
}

impl<'a> MetadataNormalizer<'a> {
    pub fn new(codec: &'a PathCodec) -> Self {
        Self { codec }
    }

    pub fn normalize(
        &self,
        path: &str,
        timestamp: i64,
        size: u64,
        mimetype: &str,
        identifier: Option<&str>,
    ) -> FileRecord {
        let path = self.codec.to_external(path);
        FileRecord {
            kind: EntryType::File,
            dirname: dirname(&path),
            path,
            timestamp,
            size,
            mimetype: mimetype.to_string(),
            identifier: identifier.map(String::from),
        }
    }

    /// Record for content held in a local file rather than in the
    /// repository. `local_path` is kept as given.
    pub fn spooled(&self, local_path: &str, timestamp: i64, size: u64, mimetype: &str) -> FileRecord {
        FileRecord {
            kind: EntryType::File,
            dirname: dirname(local_path),
            path: local_path.to_string(),
            timestamp,
            size,
            mimetype: mimetype.to_string(),
            identifier: None,
        }
    }

    pub fn directory(&self, path: &str) -> DirectoryRecord {
        DirectoryRecord {
            kind: EntryType::Dir,
            path: self.codec.to_external(path).trim_matches('/').to_string(),
        }
    }
}
