//! # docrepo-adapter
//!
//! A filesystem on top of a document repository.
//!
//! [`RepositoryAdapter`] implements the [`Filesystem`] contract by issuing
//! automation operations through any [`Automation`] client: files become
//! `File` documents carrying a blob, directories become `Folder`
//! documents, and every path is rooted under a configurable prefix that
//! callers never see.
//!
//! Besides the contract the adapter can resolve identifiers to paths,
//! convert content to another mimetype and merge several documents into
//! one; the [`plugins`] module exposes those under their method names.
//!
//! ```ignore
//! use docrepo_adapter::{AdapterConfig, Filesystem, RepositoryAdapter, WriteOptions};
//! use docrepo_automation::{ClientConfig, HttpAutomationClient};
//!
//! let client = HttpAutomationClient::new(&ClientConfig::new("http://localhost:8080/nuxeo"))?;
//! let fs = RepositoryAdapter::new(
//!     client,
//!     &AdapterConfig::new().with_root_prefix("/default-domain/workspaces"),
//! );
//!
//! let record = fs.write("reports/q1.csv", b"a,b\n", &WriteOptions::default())?;
//! assert_eq!(record.path, "reports/q1.csv");
//! ```
//!
//! [`Automation`]: docrepo_automation::Automation

mod adapter;
pub mod blob_pipeline;
pub mod concatenation;
mod config;
mod error;
pub mod filesystem;
pub mod locator;
pub mod materializer;
pub mod metadata;
pub mod mimetype;
pub mod path_codec;
pub mod plugins;
pub mod relocation;

pub use adapter::RepositoryAdapter;
pub use config::AdapterConfig;
pub use error::Error;
pub use filesystem::{
    Capabilities, Capability, Concatenator, FileContents, FileStream, Filesystem,
    MimetypeConverter, UidResolver, Visibility, WriteOptions,
};
pub use metadata::{DirectoryRecord, EntryType, FileRecord};
pub use path_codec::PathCodec;
pub use plugins::{ConcatenatorPlugin, MimetypeConverterPlugin, Plugin, UidResolverPlugin};
pub use relocation::RelocationKind;
