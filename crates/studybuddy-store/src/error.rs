//! Error types for document store access.

use thiserror::Error;

/// Errors that can occur when talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document {id} not found in collection {collection}")]
    NotFound { collection: String, id: String },

    /// Credentials missing, expired or lacking permission
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("document {id} already exists in collection {collection}")]
    Conflict { collection: String, id: String },

    /// An atomic increment would have crossed its floor or ceiling
    #[error("field {field} of document {id} would leave its bounds")]
    BoundExceeded { id: String, field: String },

    /// Store returned an unexpected error response
    #[error("store error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Document shape did not match the expected schema
    #[error("failed to decode document {id} from {collection}: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Injected failure (in-memory store only)
    #[error("injected fault on {0}")]
    Fault(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
