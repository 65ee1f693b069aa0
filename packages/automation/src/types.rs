use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use bytes::Bytes;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Kind of node stored in the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DocumentKind {
    Folder,
    #[default]
    File,
    /// Any other repository type (Workspace, Domain, Note, ...).
    #[serde(other)]
    Other,
}

/// A document descriptor as returned by the repository.
///
/// Only the fields the adapter needs are decoded; everything else in the
/// entity is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Document {
    pub uid: String,

    pub path: String,

    #[serde(rename = "type", default)]
    pub kind: DocumentKind,

    #[serde(default)]
    pub title: String,

    #[serde(
        rename = "lastModified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
}

impl Document {
    pub fn is_folder(&self) -> bool {
        self.kind == DocumentKind::Folder
    }

    /// Last modification time as a unix timestamp.
    ///
    /// Returns `None` when the repository did not send a date or sent one
    /// that is not RFC 3339.
    pub fn last_modified_timestamp(&self) -> Option<i64> {
        let raw = self.last_modified.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.timestamp())
    }
}

/// A page of documents, as returned by queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Documents {
    #[serde(default)]
    pub entries: Vec<Document>,
}

impl Documents {
    pub fn into_documents(self) -> Vec<Document> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binary content attached to a document.
///
/// The bytes live in a spooled temporary file that is removed when the
/// blob is dropped.
#[derive(Debug)]
pub struct Blob {
    file: NamedTempFile,
    mime_type: String,
    filename: Option<String>,
}

impl Blob {
    /// Spool `contents` into a fresh temporary file.
    pub fn from_bytes(
        contents: &[u8],
        mime_type: impl Into<String>,
        filename: Option<String>,
    ) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents)?;
        file.flush()?;
        Ok(Self {
            file,
            mime_type: mime_type.into(),
            filename,
        })
    }

    /// Spool everything `reader` yields into a fresh temporary file.
    pub fn from_reader(
        reader: &mut dyn Read,
        mime_type: impl Into<String>,
        filename: Option<String>,
    ) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        io::copy(reader, &mut file)?;
        file.flush()?;
        Ok(Self {
            file,
            mime_type: mime_type.into(),
            filename,
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Location of the spooled file on local disk.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> io::Result<u64> {
        Ok(self.file.as_file().metadata()?.len())
    }

    /// Read the whole spooled content.
    pub fn contents(&self) -> io::Result<Bytes> {
        Ok(Bytes::from(std::fs::read(self.file.path())?))
    }

    /// Turn the blob into a reader positioned at the start of the content.
    ///
    /// The spool file is removed once the reader is dropped.
    pub fn into_reader(self) -> io::Result<NamedTempFile> {
        let mut file = self.file;
        file.rewind()?;
        Ok(file)
    }

    /// Open an independent handle on the spooled content.
    pub fn open(&self) -> io::Result<File> {
        self.file.reopen()
    }
}
