//! # docrepo-automation
//!
//! Client side of a document repository's automation protocol.
//!
//! Every remote interaction is a named operation with an optional input
//! (a document reference, a list of them, or an uploaded blob) and a map of
//! parameters. The repository answers with a document, a page of
//! documents, a blob, or nothing.
//!
//! ```ignore
//! use docrepo_automation::{AutomationExt, ClientConfig, HttpAutomationClient, OperationId};
//!
//! let client = HttpAutomationClient::new(
//!     &ClientConfig::new("http://localhost:8080/nuxeo").with_credentials("Administrator", "Administrator"),
//! )?;
//!
//! let doc = client
//!     .operation(OperationId::DocumentFetch)
//!     .param("value", "/default-domain/workspaces/")
//!     .execute_document()?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::{Automation, AutomationExt, HttpAutomationClient};
pub use config::ClientConfig;
pub use error::{Error, NOT_FOUND_STATUS};
pub use operation::{
    parse_properties, properties, BlobUpload, DocRef, Input, Operation, OperationId,
    OperationRequest, Output,
};
pub use types::{Blob, Document, DocumentKind, Documents};
