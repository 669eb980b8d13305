//! Error types for contactlog.
//!
//! This module defines all error types used throughout the contactlog crate.
//! The three fault kinds callers care about are parse faults (corrupt persisted
//! data), storage faults (the backend failed) and validation faults (input
//! rejected before reaching the store).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for contactlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// The persisted value could not be decoded as a contact collection.
    #[error("stored value for slot '{key}' is not a contact list: {message}")]
    Parse {
        /// The slot that held the corrupt value.
        key: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// A read or write against the slot backend failed.
    #[error("storage failure on slot '{key}': {message}")]
    Storage {
        /// The slot being read or written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Input Errors ===
    /// A required field was missing or malformed.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Location Errors ===
    /// The geolocation provider could not produce a place.
    #[error("location unavailable: {0}")]
    Location(String),

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for contactlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a parse fault for the given slot.
    #[must_use]
    pub fn parse(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage fault for the given slot.
    #[must_use]
    pub fn storage(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation fault for the given field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new location error.
    #[must_use]
    pub fn location(message: impl Into<String>) -> Self {
        Self::Location(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a parse fault.
    #[must_use]
    pub fn is_parse_fault(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this error is a storage fault.
    ///
    /// Open-time failures of the backend count as storage faults too.
    #[must_use]
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DirectoryCreate { .. }
        )
    }

    /// Check if this error is a validation fault.
    #[must_use]
    pub fn is_validation_fault(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
