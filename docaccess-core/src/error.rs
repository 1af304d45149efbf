//! Error types and result types for storage operations.
//!
//! Every fallible call in this crate returns [`StorageResult<T>`]. Store-level failures
//! raised while writing or checking uniqueness are normalized to [`StorageError::Database`],
//! while read and decode failures are passed through so callers can inspect them.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors raised by the access layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The connection to the document store could not be established.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An operation used the process-wide session before it was opened.
    #[error("Storage session has not been opened")]
    SessionNotOpen,
    /// A store operation failed. The underlying cause is logged, not exposed.
    #[error("Database unavailable")]
    Database,
    /// A delete matched no documents.
    #[error("Entity not found")]
    EntityNotFound,
    /// A result cursor could not be decoded into the requested type.
    ///
    /// This includes decoding a single value out of an empty cursor.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A payload could not be serialized into a document.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The payload is not shaped like a document (e.g. it serialized to a scalar).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An entity rejected its own field values.
    #[error("Validation error: {0}")]
    Validation(String),
    /// An error reported by the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<BsonError> for StorageError {
    fn from(err: BsonError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
