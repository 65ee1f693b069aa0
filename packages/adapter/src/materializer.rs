//! Recursive folder creation.

use docrepo_automation::{properties, Automation, AutomationExt, OperationId};

use crate::error::Error;
use crate::locator::DocumentLocator;
use crate::path_codec::{segments, to_internal};

/// Ensures every folder on a path exists, creating missing ones from the
/// root down.
///
/// Existing folders are left untouched, so calling [`ensure_path`] again
/// for the same path creates nothing. A failure part way through leaves
/// the folders already created in place; the next call resumes at the
/// first missing segment.
///
/// [`ensure_path`]: DirectoryMaterializer::ensure_path
pub struct DirectoryMaterializer<'a, C: Automation + ?Sized> {
    client: &'a C,
}

impl<'a, C: Automation + ?Sized> DirectoryMaterializer<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Make sure every folder of the repository path `path` exists.
    ///
    /// Returns the number of folders created.
    pub fn ensure_path(&self, path: &str) -> Result<usize, Error> {
        let parts = segments(path);
        let mut created = 0;

        for depth in 1..=parts.len() {
            let made = self
                .ensure_folder(&parts[..depth])
                .map_err(|e| Error::DirectoryCreationFailed {
                    path: to_internal(path),
                    source: Box::new(e),
                })?;
            if made {
                created += 1;
            }
        }

        Ok(created)
    }

    /// Create the last folder of `parts` under its parent unless it exists.
    fn ensure_folder(&self, parts: &[&str]) -> Result<bool, Error> {
        let partial = parts.join("/");
        if DocumentLocator::new(self.client).exists(&partial)? {
            return Ok(false);
        }

        let (name, ancestors) = match parts.split_last() {
            Some(split) => split,
            None => return Ok(false),
        };
        let parent = to_internal(&ancestors.join("/"));

        log::debug!("Creating folder {} under {}...", name, parent);

        self.client
            .operation(OperationId::DocumentCreate)
            .input_path(parent)
            .param("type", "Folder")
            .param("name", *name)
            .param("properties", properties([("dc:title", *name)]))
            .execute_document()?;

        Ok(true)
    }
}
