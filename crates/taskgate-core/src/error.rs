// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for identifiers and the document store.
//!
//! ```text
//! StoreError
//! ├── NotConnected     - operation before connect() or after close()
//! ├── DuplicateKey     - unique field violation
//! ├── InvalidDocument  - stored record does not match the model
//! ├── Serialization    - model <-> document conversion failed
//! └── Backend          - underlying engine failure
//! ```

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// StoreError
// =============================================================================

/// Errors raised by [`DocumentStore`](crate::store::DocumentStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store handle is not connected.
    #[error("Store is not connected")]
    NotConnected,

    /// A unique field already holds this value.
    #[error("Duplicate value for unique field '{field}' in collection '{collection}'")]
    DuplicateKey {
        /// Collection name.
        collection: String,
        /// Field declared unique.
        field: String,
    },

    /// A stored document could not be read back.
    #[error("Invalid document in collection '{collection}': {message}")]
    InvalidDocument {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Conversion between a model and a document failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// The storage engine reported an error.
    #[error("Backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a duplicate key error.
    pub fn duplicate_key(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            collection: collection.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` for unique field violations.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::NotConnected => "not_connected",
            StoreError::DuplicateKey { .. } => "duplicate_key",
            StoreError::InvalidDocument { .. } => "invalid_document",
            StoreError::Serialization { .. } => "serialization",
            StoreError::Backend { .. } => "backend",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::serialization(err.to_string())
    }
}

// =============================================================================
// IdError
// =============================================================================

/// Errors raised when parsing an [`ObjectId`](crate::ObjectId).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is not 24 characters long.
    #[error("Invalid identifier length: expected 24 hex characters, got {0}")]
    InvalidLength(usize),

    /// The input contains non-hex characters.
    #[error("Invalid identifier: '{0}' is not hexadecimal")]
    InvalidHex(String),
}
