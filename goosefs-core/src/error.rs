//! Error types and result types for document store operations.
//!
//! Every fallible operation in the store returns [`DocumentStoreResult<T>`].
//! Persistence failures are never retried; they surface immediately as
//! [`DocumentStoreError::Io`] or [`DocumentStoreError::CorruptData`].

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Input could not be coerced to the declared field type, or a required
    /// field had neither a value nor a default.
    #[error("Validation error: {0}")]
    Validation(String),
    /// No document matched. The first argument describes what was looked up
    /// (an `_id` or a query), the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// No schema or model was registered under the given name.
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// The caller supplied an argument the operation cannot work with.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A collection file exists but does not hold a JSON array of documents.
    #[error("Corrupt data in collection {collection}: {reason}")]
    CorruptData { collection: String, reason: String },
    /// A directory or file operation failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization/deserialization error when converting between document formats.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A lifecycle hook refused to let the operation continue.
    #[error("Hook `{hook}` failed: {reason}")]
    Hook { hook: String, reason: String },
}

impl DocumentStoreError {
    /// Returns `true` for both the document and the model flavour of "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocumentStoreError::DocumentNotFound(..) | DocumentStoreError::ModelNotFound(_)
        )
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DocumentStoreError {
    fn from(err: std::io::Error) -> Self {
        DocumentStoreError::Io(err.to_string())
    }
}
