//! docrepo: files and folders stored as documents of a remote repository.
//!
//! - [`automation`]: the operation client (`Document.Fetch`, `Blob.Attach`, ...)
//!   and its HTTP transport.
//! - [`adapter`]: the filesystem contract implemented on top of it.

pub use docrepo_adapter as adapter;
pub use docrepo_automation as automation;

pub use docrepo_adapter::{
    AdapterConfig, Error, FileContents, FileRecord, FileStream, Filesystem, RepositoryAdapter,
    WriteOptions,
};
pub use docrepo_automation::{ClientConfig, HttpAutomationClient};
