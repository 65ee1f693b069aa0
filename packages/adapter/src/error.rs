//! Error types for the adapter.

use docrepo_automation::Error as RemoteError;

use crate::relocation::RelocationKind;

/// Errors surfaced by adapter operations.
///
/// Multi-step operations are not atomic: `DirectoryCreationFailed` and
/// `PartialRelocation` are reported after some remote effects may already
/// have happened.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The repository has no document at the given path or uid.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other remote or transport failure.
    #[error("Remote failure: {0}")]
    Remote(#[source] RemoteError),

    #[error("The directory '{path}' could not be created: {source}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// The reparent step of a move/copy succeeded but the retitle failed.
    #[error("{kind} of '{from}' landed at '{landed_at}' but could not be renamed to '{name}': {source}")]
    PartialRelocation {
        kind: RelocationKind,
        from: String,
        landed_at: String,
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: &'static str },

    #[error("Unsupported mimetype: {mimetype}")]
    UnsupportedMimetype { mimetype: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<RemoteError> for Error {
    fn from(error: RemoteError) -> Self {
        if error.is_not_found() {
            Error::NotFound {
                message: error.to_string(),
            }
        } else {
            Error::Remote(error)
        }
    }
}
