use crate::operation::OperationId;

/// Status the repository answers with when a document cannot be found.
pub const NOT_FOUND_STATUS: u16 = 404;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header: {message}")]
    InvalidHeader { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote error {status} on {operation}: {message}")]
    Remote {
        operation: OperationId,
        status: u16,
        message: String,
    },

    #[error("{operation} returned {found} where {expected} was expected")]
    UnexpectedOutput {
        operation: OperationId,
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// True when the repository reported that the addressed document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Remote { status, .. } if *status == NOT_FOUND_STATUS)
    }

    /// Remote status code, if the error came from the repository itself.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
