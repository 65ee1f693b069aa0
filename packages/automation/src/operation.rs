use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::client::Automation;
use crate::error::Error;
use crate::types::{Blob, Document, Documents};

/// Automation operations the adapter knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    DocumentFetch,
    DocumentCreate,
    DocumentMove,
    DocumentCopy,
    DocumentUpdate,
    DocumentDelete,
    DocumentQuery,
    BlobGet,
    BlobAttach,
    BlobSetFilename,
    BlobConvert,
    PdfMergeWithDocs,
}

impl OperationId {
    /// Name of the operation on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationId::DocumentFetch => "Document.Fetch",
            OperationId::DocumentCreate => "Document.Create",
            OperationId::DocumentMove => "Document.Move",
            OperationId::DocumentCopy => "Document.Copy",
            OperationId::DocumentUpdate => "Document.Update",
            OperationId::DocumentDelete => "Document.Delete",
            OperationId::DocumentQuery => "Document.Query",
            OperationId::BlobGet => "Blob.Get",
            OperationId::BlobAttach => "Blob.Attach",
            OperationId::BlobSetFilename => "Blob.SetFilename",
            OperationId::BlobConvert => "Blob.Convert",
            OperationId::PdfMergeWithDocs => "PDF.MergeWithDocs",
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a single document, by path or by uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRef {
    Path(String),
    Uid(String),
}

impl DocRef {
    pub fn value(&self) -> &str {
        match self {
            DocRef::Path(p) => p,
            DocRef::Uid(u) => u,
        }
    }
}

impl From<&Document> for DocRef {
    fn from(doc: &Document) -> Self {
        DocRef::Uid(doc.uid.clone())
    }
}

/// Local content to upload as a blob input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    pub path: PathBuf,
    pub mime_type: String,
    pub filename: String,
}

/// Input of an automation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Document(DocRef),
    Documents(Vec<DocRef>),
    Blob(BlobUpload),
}

impl Input {
    /// Wire form of document inputs (`doc:...` / `docs:a,b`).
    ///
    /// Blob inputs travel as a separate multipart section and have no
    /// inline form.
    pub fn wire_value(&self) -> Option<String> {
        match self {
            Input::Document(r) => Some(format!("doc:{}", r.value())),
            Input::Documents(refs) => Some(format!(
                "docs:{}",
                refs.iter().map(DocRef::value).collect::<Vec<_>>().join(",")
            )),
            Input::Blob(_) => None,
        }
    }
}

/// A fully described operation call.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub operation: OperationId,
    pub input: Option<Input>,
    pub params: BTreeMap<String, serde_json::Value>,
}

/// JSON body posted for an operation.
#[derive(Debug, Serialize)]
pub struct RequestBody<'a> {
    pub params: &'a BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl OperationRequest {
    pub fn new(operation: OperationId) -> Self {
        Self {
            operation,
            input: None,
            params: BTreeMap::new(),
        }
    }

    pub fn body(&self) -> RequestBody<'_> {
        RequestBody {
            params: &self.params,
            input: self.input.as_ref().and_then(Input::wire_value),
            context: serde_json::Map::new(),
        }
    }

    /// String parameter, if present.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|v| v.as_str())
    }
}

/// Typed result of an operation.
#[derive(Debug)]
pub enum Output {
    Document(Document),
    Documents(Documents),
    Blob(Blob),
    Void,
}

impl Output {
    fn kind(&self) -> &'static str {
        match self {
            Output::Document(_) => "document",
            Output::Documents(_) => "documents",
            Output::Blob(_) => "blob",
            Output::Void => "nothing",
        }
    }
}

/// Fluent builder for one operation call against a client.
pub struct Operation<'c, C: Automation + ?Sized> {
    client: &'c C,
    request: OperationRequest,
}

impl<'c, C: Automation + ?Sized> Operation<'c, C> {
    pub fn new(client: &'c C, operation: OperationId) -> Self {
        Self {
            client,
            request: OperationRequest::new(operation),
        }
    }

    pub fn input(mut self, input: Input) -> Self {
        self.request.input = Some(input);
        self
    }

    /// Shorthand for a `doc:` input addressed by repository path.
    pub fn input_path(self, path: impl Into<String>) -> Self {
        self.input(Input::Document(DocRef::Path(path.into())))
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.request.params.insert(name.into(), value.into());
        self
    }

    pub fn request(&self) -> &OperationRequest {
        &self.request
    }

    pub fn execute(self) -> Result<Output, Error> {
        log::debug!("Executing {}...", self.request.operation);
        self.client.execute(self.request)
    }

    pub fn execute_document(self) -> Result<Document, Error> {
        let operation = self.request.operation;
        match self.execute()? {
            Output::Document(doc) => Ok(doc),
            other => Err(unexpected(operation, "document", &other)),
        }
    }

    pub fn execute_documents(self) -> Result<Documents, Error> {
        let operation = self.request.operation;
        match self.execute()? {
            Output::Documents(docs) => Ok(docs),
            other => Err(unexpected(operation, "documents", &other)),
        }
    }

    pub fn execute_blob(self) -> Result<Blob, Error> {
        let operation = self.request.operation;
        match self.execute()? {
            Output::Blob(blob) => Ok(blob),
            other => Err(unexpected(operation, "blob", &other)),
        }
    }

    /// Execute and discard whatever the repository returned.
    pub fn execute_void(self) -> Result<(), Error> {
        self.execute().map(|_| ())
    }
}

fn unexpected(operation: OperationId, expected: &'static str, found: &Output) -> Error {
    Error::UnexpectedOutput {
        operation,
        expected,
        found: found.kind(),
    }
}

/// Build the `properties` parameter for document-writing operations.
///
/// The repository takes one `key=value` assignment per line.
pub fn properties<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a `properties` parameter back into pairs.
pub fn parse_properties(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect()
}
