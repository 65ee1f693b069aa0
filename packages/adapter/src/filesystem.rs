//! The filesystem contract and the optional capabilities an adapter can
//! declare on top of it.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;

use bytes::Bytes;

use crate::error::Error;
use crate::metadata::{DirectoryRecord, FileRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Per-call options for writes and updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Overrides the mimetype sniffed from the content.
    pub mimetype: Option<String>,
}

impl WriteOptions {
    pub fn with_mimetype(mimetype: impl Into<String>) -> Self {
        Self {
            mimetype: Some(mimetype.into()),
        }
    }
}

/// A file's metadata together with its whole content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub record: FileRecord,
    pub contents: Bytes,
}

/// A file's metadata together with a reader over its content.
///
/// The reader owns the locally spooled copy, which is removed once the
/// stream is dropped.
pub struct FileStream {
    pub record: FileRecord,
    pub stream: Box<dyn Read + Send>,
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Optional capabilities beyond the filesystem contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    ResolveUid,
    Convert,
    Concatenate,
}

/// The set of capabilities an adapter declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

/// Hierarchical file storage addressed by `/`-separated paths.
///
/// Paths are relative to the adapter's root. Operations that span more
/// than one remote call are not atomic; see [`Error`] for the partial
/// outcomes that can be reported.
pub trait Filesystem: Send + Sync {
    fn write(&self, path: &str, contents: &[u8], options: &WriteOptions)
        -> Result<FileRecord, Error>;

    fn write_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error>;

    fn update(&self, path: &str, contents: &[u8], options: &WriteOptions)
        -> Result<FileRecord, Error>;

    fn update_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error>;

    fn rename(&self, from: &str, to: &str) -> Result<(), Error>;

    fn copy(&self, from: &str, to: &str) -> Result<(), Error>;

    fn delete(&self, path: &str) -> Result<(), Error>;

    fn delete_dir(&self, path: &str) -> Result<(), Error>;

    fn create_dir(&self, path: &str) -> Result<DirectoryRecord, Error>;

    fn has(&self, path: &str) -> Result<bool, Error>;

    fn read(&self, path: &str) -> Result<FileContents, Error>;

    fn read_stream(&self, path: &str) -> Result<FileStream, Error>;

    fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<FileRecord>, Error>;

    fn get_metadata(&self, path: &str) -> Result<FileRecord, Error>;

    fn get_size(&self, path: &str) -> Result<u64, Error>;

    fn get_mimetype(&self, path: &str) -> Result<String, Error>;

    fn get_timestamp(&self, path: &str) -> Result<i64, Error>;

    fn get_visibility(&self, path: &str) -> Result<Visibility, Error>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), Error>;

    /// Capabilities this filesystem implements besides the contract.
    fn capabilities(&self) -> Capabilities {
        Capabilities::none()
    }
}

/// Maps repository identifiers back to paths.
pub trait UidResolver {
    fn resolve_uid(&self, uid: &str) -> Result<String, Error>;
}

/// Converts a file's content to another mimetype.
pub trait MimetypeConverter {
    fn convert(&self, path: &str, mimetype: &str) -> Result<FileContents, Error>;
}

/// Merges several files into one.
pub trait Concatenator {
    /// Merge the files at `paths`, in order.
    fn concatenate(&self, paths: &[&str]) -> Result<FileContents, Error>;

    /// Merge the files with the given identifiers. The order of the
    /// result is decided by the repository.
    fn concatenate_by_uids(&self, uids: &[&str]) -> Result<FileContents, Error>;
}
