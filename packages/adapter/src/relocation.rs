//! Move and copy as reparent + retitle.
//!
//! The repository's move/copy primitives place a document under a new
//! parent but leave its title alone. A [`Relocation`] runs the primitive
//! and then a `Document.Update` that sets the title to the destination's
//! last segment. Between the two calls the document sits at its new place
//! with its old title; if the second call fails it stays that way and
//! [`Error::PartialRelocation`] says where it landed.

use std::fmt;

use docrepo_automation::{properties, Automation, AutomationExt, Document, OperationId};

use crate::error::Error;
use crate::materializer::DirectoryMaterializer;
use crate::path_codec::{basename, dirname, to_internal, PathCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationKind {
    Move,
    Copy,
}

impl RelocationKind {
    fn operation(&self) -> OperationId {
        match self {
            RelocationKind::Move => OperationId::DocumentMove,
            RelocationKind::Copy => OperationId::DocumentCopy,
        }
    }
}

impl fmt::Display for RelocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelocationKind::Move => f.write_str("move"),
            RelocationKind::Copy => f.write_str("copy"),
        }
    }
}

/// One planned move or copy, between repository paths.
pub struct Relocation<'a, C: Automation + ?Sized> {
    client: &'a C,
    kind: RelocationKind,
    source: String,
    target_parent: String,
    name: String,
}

impl<'a, C: Automation + ?Sized> Relocation<'a, C> {
    pub fn new(client: &'a C, kind: RelocationKind, source: &str, destination: &str) -> Self {
        Self {
            client,
            kind,
            source: to_internal(source),
            target_parent: to_internal(&dirname(destination)),
            name: basename(destination).to_string(),
        }
    }

    pub fn kind(&self) -> RelocationKind {
        self.kind
    }

    /// Folder the document is placed under.
    pub fn target_parent(&self) -> &str {
        &self.target_parent
    }

    /// Final name, used for both the path segment and the title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First phase: move or copy under the destination parent.
    pub fn reparent(&self) -> Result<Document, Error> {
        log::debug!(
            "Relocating ({}) {} under {} as {}...",
            self.kind,
            self.source,
            self.target_parent,
            self.name
        );
        Ok(self
            .client
            .operation(self.kind.operation())
            .input_path(self.source.clone())
            .param("target", self.target_parent.clone())
            .param("name", self.name.clone())
            .execute_document()?)
    }

    /// Second phase: align the title of the placed document with its name.
    pub fn retitle(&self, placed: &Document) -> Result<Document, Error> {
        Ok(self
            .client
            .operation(OperationId::DocumentUpdate)
            .input_path(to_internal(&placed.path))
            .param("properties", properties([("dc:title", self.name.as_str())]))
            .execute_document()?)
    }

    /// Run both phases; the returned document carries the final title.
    pub fn execute(&self) -> Result<Document, Error> {
        let placed = self.reparent()?;
        self.retitle(&placed).map_err(|e| {
            log::warn!(
                "{} of {} reached {} but the title was not updated: {}",
                self.kind,
                self.source,
                placed.path,
                e
            );
            Error::PartialRelocation {
                kind: self.kind,
                from: self.source.clone(),
                landed_at: placed.path.clone(),
                name: self.name.clone(),
                source: Box::new(e),
            }
        })
    }
}

/// Filesystem-style rename/copy on top of [`Relocation`].
pub struct MoveCopyCompensator<'a, C: Automation + ?Sized> {
    client: &'a C,
    codec: &'a PathCodec,
}

impl<'a, C: Automation + ?Sized> MoveCopyCompensator<'a, C> {
    pub fn new(client: &'a C, codec: &'a PathCodec) -> Self {
        Self { client, codec }
    }

    /// Plan a relocation between two external paths.
    pub fn plan(&self, kind: RelocationKind, from: &str, to: &str) -> Relocation<'a, C> {
        Relocation::new(
            self.client,
            kind,
            &self.codec.apply_prefix(from),
            &self.codec.apply_prefix(to),
        )
    }

    /// Materialize the destination's parent, then relocate.
    pub fn relocate(&self, kind: RelocationKind, from: &str, to: &str) -> Result<Document, Error> {
        let destination = self.codec.apply_prefix(to);
        DirectoryMaterializer::new(self.client).ensure_path(&dirname(&destination))?;
        self.plan(kind, from, to).execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrepo_automation::testing::InMemoryRepository;

    #[test]
    fn move_materializes_parent_and_retitles() {
        let repo = InMemoryRepository::new().with_file("/a/b.txt", b"b", "text/plain");
        let codec = PathCodec::new("");

        let doc = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Move, "/a/b.txt", "/a/c/b.txt")
            .unwrap();

        assert_eq!(doc.path, "/a/c/b.txt");
        assert_eq!(doc.title, "b.txt");
        assert!(repo.document("/a/c").unwrap().is_folder());
        assert!(repo.document("/a/b.txt").is_none());
        assert_eq!(repo.document("/a/c/b.txt").unwrap().title, "b.txt");
    }

    #[test]
    fn rename_in_place_updates_title() {
        let repo = InMemoryRepository::new().with_file("/ws/old.txt", b"x", "text/plain");
        let codec = PathCodec::new("/ws");

        let doc = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Move, "old.txt", "new.txt")
            .unwrap();

        assert_eq!(doc.path, "/ws/new.txt");
        assert_eq!(doc.title, "new.txt");
        assert_eq!(repo.count(OperationId::DocumentCreate), 0);
    }

    #[test]
    fn copy_keeps_the_source() {
        let repo = InMemoryRepository::new().with_file("/ws/a.txt", b"x", "text/plain");
        let codec = PathCodec::new("/ws");

        let doc = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Copy, "a.txt", "backup/a-copy.txt")
            .unwrap();

        assert_eq!(doc.path, "/ws/backup/a-copy.txt");
        assert_eq!(doc.title, "a-copy.txt");
        assert!(repo.document("/ws/a.txt").is_some());
        assert_ne!(repo.document("/ws/a.txt").unwrap().uid, doc.uid);
    }

    #[test]
    fn reparent_names_only_the_parent_folder_as_target() {
        let repo = InMemoryRepository::new();
        let codec = PathCodec::new("/ws");
        let relocation = MoveCopyCompensator::new(&repo, &codec).plan(
            RelocationKind::Copy,
            "a/b.txt",
            "c/d/e.txt",
        );

        assert_eq!(relocation.target_parent(), "/ws/c/d/");
        assert_eq!(relocation.name(), "e.txt");
        assert_eq!(relocation.kind(), RelocationKind::Copy);
    }

    #[test]
    fn failed_retitle_reports_partial_relocation() {
        let repo = InMemoryRepository::new()
            .with_file("/ws/a.txt", b"x", "text/plain")
            .fail(OperationId::DocumentUpdate, 500);
        let codec = PathCodec::new("/ws");

        let err = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Move, "a.txt", "b.txt")
            .unwrap_err();

        match err {
            Error::PartialRelocation {
                kind,
                landed_at,
                name,
                ..
            } => {
                assert_eq!(kind, RelocationKind::Move);
                assert_eq!(landed_at, "/ws/b.txt");
                assert_eq!(name, "b.txt");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The reparent step is not undone.
        assert_eq!(repo.document("/ws/b.txt").unwrap().title, "a.txt");
    }

    #[test]
    fn failed_reparent_skips_retitle() {
        let repo = InMemoryRepository::new()
            .with_file("/ws/a.txt", b"x", "text/plain")
            .fail(OperationId::DocumentMove, 403);
        let codec = PathCodec::new("/ws");

        let err = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Move, "a.txt", "b.txt")
            .unwrap_err();

        assert!(matches!(err, Error::Remote(_)));
        assert_eq!(repo.count(OperationId::DocumentUpdate), 0);
    }

    #[test]
    fn missing_source_is_not_found() {
        let repo = InMemoryRepository::new().with_folder("/ws");
        let codec = PathCodec::new("/ws");

        let err = MoveCopyCompensator::new(&repo, &codec)
            .relocate(RelocationKind::Copy, "ghost.txt", "b.txt")
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
