//! In-memory repository for tests.
//!
//! [`InMemoryRepository`] answers automation operations against a document
//! tree held in memory, records every request, and can be told to fail
//! specific operations with a chosen status code.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::client::Automation;
use crate::error::Error;
use crate::operation::{parse_properties, DocRef, Input, OperationId, OperationRequest, Output};
use crate::types::{Blob, Document, DocumentKind, Documents};

const FIXED_LAST_MODIFIED: &str = "2024-01-01T00:00:00Z";

/// Content attached to a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    doc: Document,
    content: Option<StoredContent>,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    status: u16,
    /// Fail only this call number (1-based); `None` fails every call.
    nth: Option<usize>,
}

#[derive(Default)]
struct State {
    /// Documents keyed by canonical path (`/a/b`, root is `/`).
    documents: BTreeMap<String, StoredDocument>,
    next_uid: u64,
    failures: HashMap<OperationId, Failure>,
    calls: HashMap<OperationId, usize>,
    recorded: Vec<OperationRequest>,
}

/// A stateful stand-in for a remote document repository.
#[derive(Clone)]
pub struct InMemoryRepository {
    state: Arc<Mutex<State>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical form of a repository path: leading slash, no trailing slash.
fn canonical(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn remote(operation: OperationId, status: u16, message: impl Into<String>) -> Error {
    Error::Remote {
        operation,
        status,
        message: message.into(),
    }
}

impl InMemoryRepository {
    /// Create a repository holding only the root folder.
    pub fn new() -> Self {
        let mut state = State::default();
        state.documents.insert(
            "/".to_string(),
            StoredDocument {
                doc: Document {
                    uid: "root".to_string(),
                    path: "/".to_string(),
                    kind: DocumentKind::Folder,
                    title: String::new(),
                    last_modified: Some(FIXED_LAST_MODIFIED.to_string()),
                },
                content: None,
            },
        );
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Seed a folder, creating missing ancestors.
    pub fn with_folder(self, path: &str) -> Self {
        self.state.lock().unwrap().seed(&canonical(path), DocumentKind::Folder);
        self
    }

    /// Seed a file document with content, creating missing ancestors.
    pub fn with_file(self, path: &str, bytes: &[u8], mime_type: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let path = canonical(path);
            state.seed(&path, DocumentKind::File);
            if let Some(stored) = state.documents.get_mut(&path) {
                stored.content = Some(StoredContent {
                    bytes: bytes.to_vec(),
                    mime_type: mime_type.to_string(),
                    filename: last_segment(&path).to_string(),
                });
            }
        }
        self
    }

    /// Fail every call of `operation` with `status`.
    pub fn fail(self, operation: OperationId, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, Failure { status, nth: None });
        self
    }

    /// Fail only the `nth` call (1-based) of `operation` with `status`.
    pub fn fail_nth(self, operation: OperationId, nth: usize, status: u16) -> Self {
        self.state.lock().unwrap().failures.insert(
            operation,
            Failure {
                status,
                nth: Some(nth),
            },
        );
        self
    }

    pub fn document(&self, path: &str) -> Option<Document> {
        let state = self.state.lock().unwrap();
        state.documents.get(&canonical(path)).map(|s| s.doc.clone())
    }

    pub fn content(&self, path: &str) -> Option<StoredContent> {
        let state = self.state.lock().unwrap();
        state
            .documents
            .get(&canonical(path))
            .and_then(|s| s.content.clone())
    }

    /// Canonical paths of every stored document, root included.
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().documents.keys().cloned().collect()
    }

    pub fn recorded_requests(&self) -> Vec<OperationRequest> {
        self.state.lock().unwrap().recorded.clone()
    }

    pub fn recorded_operations(&self) -> Vec<OperationId> {
        self.state
            .lock()
            .unwrap()
            .recorded
            .iter()
            .map(|r| r.operation)
            .collect()
    }

    /// Number of recorded calls of `operation`.
    pub fn count(&self, operation: OperationId) -> usize {
        self.state
            .lock()
            .unwrap()
            .recorded
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    pub fn clear_recorded(&self) {
        self.state.lock().unwrap().recorded.clear();
    }
}

impl State {
    fn next_uid(&mut self) -> String {
        self.next_uid += 1;
        format!("uid-{}", self.next_uid)
    }

    fn seed(&mut self, path: &str, kind: DocumentKind) {
        if path != "/" {
            let parent = parent_of(path);
            if !self.documents.contains_key(&parent) {
                self.seed(&parent, DocumentKind::Folder);
            }
        }
        if self.documents.contains_key(path) {
            return;
        }
        let uid = self.next_uid();
        self.documents.insert(
            path.to_string(),
            StoredDocument {
                doc: Document {
                    uid,
                    path: path.to_string(),
                    kind,
                    title: last_segment(path).to_string(),
                    last_modified: Some(FIXED_LAST_MODIFIED.to_string()),
                },
                content: None,
            },
        );
    }

    /// Look a document up by path (leading `/`) or uid.
    fn key_of(&self, value: &str) -> Option<String> {
        if value.starts_with('/') {
            let key = canonical(value);
            self.documents.contains_key(&key).then_some(key)
        } else {
            self.documents
                .iter()
                .find(|(_, s)| s.doc.uid == value)
                .map(|(k, _)| k.clone())
        }
    }

    fn require(&self, operation: OperationId, value: &str) -> Result<String, Error> {
        self.key_of(value)
            .ok_or_else(|| remote(operation, 404, format!("Failed to get document {}", value)))
    }

    fn input_doc(&self, request: &OperationRequest) -> Result<String, Error> {
        match &request.input {
            Some(Input::Document(r)) => self.require(request.operation, r.value()),
            _ => Err(remote(request.operation, 400, "Document input expected")),
        }
    }

    fn param<'r>(request: &'r OperationRequest, name: &str) -> Result<&'r str, Error> {
        request
            .param_str(name)
            .ok_or_else(|| remote(request.operation, 400, format!("Missing param {}", name)))
    }

    fn content_blob(content: &StoredContent) -> Result<Output, Error> {
        Ok(Output::Blob(Blob::from_bytes(
            &content.bytes,
            content.mime_type.clone(),
            Some(content.filename.clone()),
        )?))
    }

    fn doc(&self, key: &str) -> Document {
        self.documents[key].doc.clone()
    }

    /// Re-key a subtree from `from` to `to`, optionally as a fresh copy.
    fn relocate(&mut self, from: &str, to: &str, copy: bool) {
        let moved: Vec<(String, StoredDocument)> = self
            .documents
            .iter()
            .filter(|(k, _)| *k == from || k.starts_with(&format!("{}/", from)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (old_key, mut stored) in moved {
            if !copy {
                self.documents.remove(&old_key);
            } else {
                stored.doc.uid = self.next_uid();
            }
            let new_key = format!("{}{}", to, &old_key[from.len()..]);
            stored.doc.path = new_key.clone();
            self.documents.insert(new_key, stored);
        }
    }

    fn apply(&mut self, request: &OperationRequest) -> Result<Output, Error> {
        let op = request.operation;
        match op {
            OperationId::DocumentFetch => {
                let value = Self::param(request, "value")?;
                let key = self.require(op, value)?;
                Ok(Output::Document(self.doc(&key)))
            }
            OperationId::DocumentCreate => {
                let parent = self.input_doc(request)?;
                let name = Self::param(request, "name")?.to_string();
                let kind = match Self::param(request, "type")? {
                    "Folder" => DocumentKind::Folder,
                    "File" => DocumentKind::File,
                    _ => DocumentKind::Other,
                };
                let path = child_path(&parent, &name);
                if self.documents.contains_key(&path) {
                    return Err(remote(op, 409, format!("{} already exists", path)));
                }
                let title = request
                    .param_str("properties")
                    .map(parse_properties)
                    .and_then(|props| {
                        props
                            .into_iter()
                            .find(|(k, _)| k == "dc:title")
                            .map(|(_, v)| v)
                    })
                    .unwrap_or_else(|| name.clone());
                let uid = self.next_uid();
                let doc = Document {
                    uid,
                    path: path.clone(),
                    kind,
                    title,
                    last_modified: Some(FIXED_LAST_MODIFIED.to_string()),
                };
                self.documents.insert(
                    path,
                    StoredDocument {
                        doc: doc.clone(),
                        content: None,
                    },
                );
                Ok(Output::Document(doc))
            }
            OperationId::DocumentMove | OperationId::DocumentCopy => {
                let source = self.input_doc(request)?;
                let target = self.require(op, Self::param(request, "target")?)?;
                let name = request
                    .param_str("name")
                    .unwrap_or_else(|| last_segment(&source))
                    .to_string();
                let destination = child_path(&target, &name);
                if self.documents.contains_key(&destination) {
                    return Err(remote(op, 409, format!("{} already exists", destination)));
                }
                self.relocate(&source, &destination, op == OperationId::DocumentCopy);
                Ok(Output::Document(self.doc(&destination)))
            }
            OperationId::DocumentUpdate => {
                let key = self.input_doc(request)?;
                let props = parse_properties(Self::param(request, "properties")?);
                if let Some(stored) = self.documents.get_mut(&key) {
                    for (name, value) in props {
                        if name == "dc:title" {
                            stored.doc.title = value;
                        }
                    }
                }
                Ok(Output::Document(self.doc(&key)))
            }
            OperationId::DocumentDelete => {
                let key = self.input_doc(request)?;
                let prefix = format!("{}/", key);
                self.documents
                    .retain(|k, _| k != &key && !k.starts_with(&prefix));
                Ok(Output::Void)
            }
            OperationId::DocumentQuery => {
                let query = Self::param(request, "query")?;
                let uids: Vec<&str> = query.split('"').skip(1).step_by(2).collect();
                let entries = self
                    .documents
                    .values()
                    .filter(|s| uids.contains(&s.doc.uid.as_str()))
                    .map(|s| s.doc.clone())
                    .collect();
                Ok(Output::Documents(Documents { entries }))
            }
            OperationId::BlobGet => {
                let key = self.input_doc(request)?;
                match &self.documents[&key].content {
                    Some(content) => Self::content_blob(content),
                    None => Err(remote(op, 404, format!("{} has no content", key))),
                }
            }
            OperationId::BlobAttach => {
                let upload = match &request.input {
                    Some(Input::Blob(upload)) => upload.clone(),
                    _ => return Err(remote(op, 400, "Blob input expected")),
                };
                let key = self.require(op, Self::param(request, "document")?)?;
                let content = StoredContent {
                    bytes: std::fs::read(&upload.path)?,
                    mime_type: upload.mime_type,
                    filename: upload.filename,
                };
                let output = Self::content_blob(&content)?;
                if let Some(stored) = self.documents.get_mut(&key) {
                    stored.content = Some(content);
                }
                Ok(output)
            }
            OperationId::BlobSetFilename => {
                let key = self.input_doc(request)?;
                let name = Self::param(request, "name")?.to_string();
                match self.documents.get_mut(&key).and_then(|s| s.content.as_mut()) {
                    Some(content) => {
                        content.filename = name;
                        let content = content.clone();
                        Self::content_blob(&content)
                    }
                    None => Err(remote(op, 404, format!("{} has no content", key))),
                }
            }
            OperationId::BlobConvert => {
                let key = self.input_doc(request)?;
                let mime_type = Self::param(request, "mimeType")?.to_string();
                match &self.documents[&key].content {
                    Some(content) => {
                        let converted = StoredContent {
                            mime_type,
                            ..content.clone()
                        };
                        Self::content_blob(&converted)
                    }
                    None => Err(remote(op, 404, format!("{} has no content", key))),
                }
            }
            OperationId::PdfMergeWithDocs => {
                let refs = match &request.input {
                    Some(Input::Documents(refs)) => refs.clone(),
                    _ => return Err(remote(op, 400, "Documents input expected")),
                };
                let mut merged = Vec::new();
                for r in refs.iter().map(DocRef::value) {
                    let key = self.require(op, r)?;
                    match &self.documents[&key].content {
                        Some(content) => merged.extend_from_slice(&content.bytes),
                        None => return Err(remote(op, 404, format!("{} has no content", key))),
                    }
                }
                Self::content_blob(&StoredContent {
                    bytes: merged,
                    mime_type: "application/pdf".to_string(),
                    filename: "merged.pdf".to_string(),
                })
            }
        }
    }
}

impl Automation for InMemoryRepository {
    fn execute(&self, request: OperationRequest) -> Result<Output, Error> {
        let mut state = self.state.lock().unwrap();
        state.recorded.push(request.clone());

        let call = {
            let count = state.calls.entry(request.operation).or_insert(0);
            *count += 1;
            *count
        };

        if let Some(failure) = state.failures.get(&request.operation).copied() {
            if failure.nth.map_or(true, |nth| nth == call) {
                return Err(remote(
                    request.operation,
                    failure.status,
                    format!("injected failure {}", failure.status),
                ));
            }
        }

        state.apply(&request)
    }
}
