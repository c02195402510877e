// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the campus domain layer.
//!
//! ```text
//! CoreError (root)
//! ├── StoreError      - Storage lookups and mutations
//! └── Validation      - Domain rule violations
//! ```
//!
//! HTTP mapping happens in `campus-api`; this crate only classifies.
//!
//! # Examples
//!
//! ```
//! use campus_core::error::{CoreError, StoreError};
//!
//! let error = StoreError::not_found("account", "42");
//! assert!(error.is_not_found());
//!
//! let core: CoreError = error.into();
//! assert_eq!(core.error_type(), "store");
//! ```

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// CoreError
// =============================================================================

/// The root error type of the domain layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A domain rule was violated.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            CoreError::Store(_) => "store",
            CoreError::Validation { .. } => "validation",
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind, e.g. `account`.
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {key}")]
    Conflict {
        /// Entity kind.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(entity: &'static str, key: impl ToString) -> Self {
        Self::Conflict {
            entity,
            key: key.to_string(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unavailable error with a source.
    pub fn unavailable_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_classification() {
        assert!(StoreError::not_found("class", 3).is_not_found());
        assert!(!StoreError::conflict("account", "alice").is_not_found());
        assert!(!StoreError::unavailable("down").is_not_found());
        assert_eq!(CoreError::from(StoreError::unavailable("x")).error_type(), "store");
    }

    #[test]
    fn test_display() {
        let err = StoreError::not_found("account", "42");
        assert_eq!(err.to_string(), "account not found: 42");

        let err = CoreError::validation("password", "too short");
        assert!(err.to_string().contains("password"));
        assert_eq!(err.error_type(), "validation");
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = StoreError::unavailable_with("read failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
