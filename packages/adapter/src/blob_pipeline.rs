//! Uploading and fetching document content.

use std::io::{self, Read, Write};
use std::path::Path;

use docrepo_automation::{Automation, AutomationExt, Blob, BlobUpload, Input, OperationId};
use tempfile::NamedTempFile;

use crate::error::Error;
use crate::mimetype;
use crate::path_codec::{basename, to_internal};

/// Caller content spooled to a local temporary file before upload.
///
/// The file is removed when this value is dropped, whichever way the
/// upload ends.
pub struct SpooledContent {
    file: NamedTempFile,
}

impl SpooledContent {
    pub fn from_bytes(contents: &[u8]) -> Result<Self, Error> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn from_reader(reader: &mut dyn Read) -> Result<Self, Error> {
        let mut file = NamedTempFile::new()?;
        io::copy(reader, &mut file)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Content type of the spooled bytes.
    ///
    /// Magic-number sniffing first, then the extension of `name`, then
    /// `application/octet-stream`.
    pub fn sniff_mimetype(&self, name: &str) -> Result<String, Error> {
        if let Some(kind) = infer::get_from_path(self.path())? {
            return Ok(kind.mime_type().to_string());
        }
        if let Some(guessed) = mimetype::from_path(name) {
            return Ok(guessed.to_string());
        }
        log::warn!(
            "Could not detect the content type of {}, using {}",
            name,
            mimetype::OCTET_STREAM
        );
        Ok(mimetype::OCTET_STREAM.to_string())
    }
}

/// Attaches local content to documents and reads it back.
pub struct BlobPipeline<'a, C: Automation + ?Sized> {
    client: &'a C,
}

impl<'a, C: Automation + ?Sized> BlobPipeline<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Attach the file at `local` as the content of the document at
    /// `doc_path`, then name the blob after the path's last segment.
    ///
    /// The two calls are not atomic. If naming fails, the document keeps
    /// the new content under whatever filename the attach step stored.
    pub fn upload(&self, doc_path: &str, local: &Path, mime_type: &str) -> Result<Blob, Error> {
        let document = to_internal(doc_path);
        let filename = basename(doc_path).to_string();

        self.client
            .operation(OperationId::BlobAttach)
            .input(Input::Blob(BlobUpload {
                path: local.to_path_buf(),
                mime_type: mime_type.to_string(),
                filename: filename.clone(),
            }))
            .param("document", document.clone())
            .execute_void()?;

        self.client
            .operation(OperationId::BlobSetFilename)
            .input_path(document.clone())
            .param("name", filename)
            .execute_blob()
            .map_err(|e| {
                log::warn!("Content attached to {} but its filename was not set: {}", document, e);
                Error::from(e)
            })
    }

    /// Current content of the document at `doc_path`.
    pub fn fetch_blob(&self, doc_path: &str) -> Result<Blob, Error> {
        Ok(self
            .client
            .operation(OperationId::BlobGet)
            .input_path(to_internal(doc_path))
            .execute_blob()?)
    }
}
