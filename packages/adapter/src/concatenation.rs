//! Merging several documents into one blob.

use docrepo_automation::{Automation, AutomationExt, Blob, DocRef, Document, Input, OperationId};

use crate::error::Error;
use crate::locator::DocumentLocator;

/// Merges documents with `PDF.MergeWithDocs`.
pub struct ConcatenationService<'a, C: Automation + ?Sized> {
    client: &'a C,
}

impl<'a, C: Automation + ?Sized> ConcatenationService<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Merge the documents at `paths`, in the given order.
    ///
    /// Every path is resolved first; the first one that does not resolve
    /// aborts the whole operation before anything is merged.
    pub fn merge_by_paths<S: AsRef<str>>(&self, paths: &[S]) -> Result<Blob, Error> {
        let locator = DocumentLocator::new(self.client);
        let documents = paths
            .iter()
            .map(|p| locator.find_by_path(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.merge(&documents)
    }

    /// Merge the documents whose uid is in `uids`.
    ///
    /// The documents come from a repository query, which does not keep the
    /// order of `uids`; callers needing a specific order should use
    /// [`merge_by_paths`](Self::merge_by_paths).
    pub fn merge_by_uids<S: AsRef<str>>(&self, uids: &[S]) -> Result<Blob, Error> {
        let documents = self
            .client
            .operation(OperationId::DocumentQuery)
            .param("query", uid_query(uids))
            .execute_documents()?
            .into_documents();
        self.merge(&documents)
    }

    fn merge(&self, documents: &[Document]) -> Result<Blob, Error> {
        log::debug!("Merging {} documents...", documents.len());
        Ok(self
            .client
            .operation(OperationId::PdfMergeWithDocs)
            .input(Input::Documents(
                documents.iter().map(DocRef::from).collect(),
            ))
            .execute_blob()?)
    }
}

/// Query selecting every document whose uid is listed.
fn uid_query<S: AsRef<str>>(uids: &[S]) -> String {
    let quoted = uids
        .iter()
        .map(|u| format!("\"{}\"", u.as_ref().replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",");
    format!("SELECT * FROM Document WHERE ecm:uuid IN ({})", quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrepo_automation::testing::InMemoryRepository;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_file("/ws/x.pdf", b"first-", "application/pdf")
            .with_file("/ws/y.pdf", b"second", "application/pdf")
    }

    #[test]
    fn merges_by_path_in_order() {
        let repo = repo();
        let blob = ConcatenationService::new(&repo)
            .merge_by_paths(&["/ws/y.pdf", "/ws/x.pdf"])
            .unwrap();

        assert_eq!(&blob.contents().unwrap()[..], b"secondfirst-");
        assert_eq!(blob.mime_type(), "application/pdf");
    }

    #[test]
    fn unresolved_path_aborts_before_merging() {
        let repo = repo();
        let err = ConcatenationService::new(&repo)
            .merge_by_paths(&["/ws/x.pdf", "/ws/missing.pdf"])
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(repo.count(OperationId::PdfMergeWithDocs), 0);
    }

    #[test]
    fn first_unresolved_path_stops_resolution() {
        let repo = repo();
        let _ = ConcatenationService::new(&repo)
            .merge_by_paths(&["/ws/missing.pdf", "/ws/x.pdf"])
            .unwrap_err();

        assert_eq!(repo.count(OperationId::DocumentFetch), 1);
    }

    #[test]
    fn merges_by_uid_through_a_query() {
        let repo = repo();
        let x = repo.document("/ws/x.pdf").unwrap().uid;
        let y = repo.document("/ws/y.pdf").unwrap().uid;

        let blob = ConcatenationService::new(&repo)
            .merge_by_uids(&[x.as_str(), y.as_str()])
            .unwrap();

        assert_eq!(blob.size().unwrap(), 12);
        assert_eq!(
            repo.recorded_operations(),
            vec![OperationId::DocumentQuery, OperationId::PdfMergeWithDocs]
        );
    }

    #[test]
    fn uid_query_quotes_each_uid() {
        assert_eq!(
            uid_query(&["a", "b"]),
            "SELECT * FROM Document WHERE ecm:uuid IN (\"a\",\"b\")"
        );
        assert_eq!(
            uid_query(&["we\"ird"]),
            "SELECT * FROM Document WHERE ecm:uuid IN (\"we\\\"ird\")"
        );
    }
}
