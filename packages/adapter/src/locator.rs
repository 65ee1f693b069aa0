//! Resolution of paths and uids to document descriptors.

use docrepo_automation::{Automation, AutomationExt, Document, OperationId};

use crate::error::Error;
use crate::path_codec::to_internal;

/// Looks documents up with a single `Document.Fetch` per call.
///
/// Nothing is cached: every call goes back to the repository.
pub struct DocumentLocator<'a, C: Automation + ?Sized> {
    client: &'a C,
}

impl<'a, C: Automation + ?Sized> DocumentLocator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetch a document by repository path or uid; the repository tells
    /// the two apart.
    pub fn resolve(&self, path_or_uid: &str) -> Result<Document, Error> {
        Ok(self
            .client
            .operation(OperationId::DocumentFetch)
            .param("value", path_or_uid)
            .execute_document()?)
    }

    pub fn find_by_path(&self, path: &str) -> Result<Document, Error> {
        self.resolve(&to_internal(path))
    }

    /// `false` only when the repository reports not-found; other failures
    /// propagate.
    pub fn exists(&self, path: &str) -> Result<bool, Error> {
        match self.find_by_path(path) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
