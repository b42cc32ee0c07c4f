//! Error types for the donor registry.
//!
//! [`Error`] covers everything an operation can report to its caller.
//! [`LoadWarning`] is kept apart: a missing or unreadable data file at
//! startup degrades to an empty registry instead of failing.

use std::path::PathBuf;
use thiserror::Error;

use crate::donor::DonorId;

/// The main error type for registry operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Request Errors ===
    /// One or more required fields were absent or blank.
    #[error("Missing fields: {}", .missing.join(", "))]
    Validation {
        /// Names of the missing fields, in declaration order.
        missing: Vec<&'static str>,
    },

    /// The request body could not be understood at all.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No donor has the requested id.
    #[error("donor {id} not found")]
    NotFound {
        /// The id as the client sent it.
        id: String,
    },

    // === Storage Errors ===
    /// Writing the backing file failed.
    #[error("failed to save donor data to {path}: {source}")]
    Persistence {
        /// Path of the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to serialize donor data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Every id up to the largest representable one is taken.
    #[error("no donor ids left after {last}")]
    IdsExhausted {
        /// The largest id in use.
        last: DonorId,
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

    /// Failed to create the data file's directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server failed to bind or run.
    #[error("server error: {0}")]
    Server(String),
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the given missing fields.
    #[must_use]
    pub fn missing_fields(missing: Vec<&'static str>) -> Self {
        Self::Validation { missing }
    }

    /// Create a not-found error for a client-supplied id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidRequest(_) | Self::NotFound { .. }
        )
    }

    /// Check if this error means the backing file may be out of date.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::DirectoryCreate { .. } | Self::Serialize(_)
        )
    }
}

/// Why the data file could not be loaded at startup.
///
/// Never fatal: the store falls back to an empty collection and logs this.
#[derive(Error, Debug)]
pub enum LoadWarning {
    /// The data file does not exist yet.
    #[error("{path} not found, starting with an empty registry")]
    Missing {
        /// Path of the data file.
        path: PathBuf,
    },

    /// The data file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Unreadable {
        /// Path of the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The data file is not a JSON array of donors.
    #[error("failed to decode JSON from {path}: {source}")]
    Malformed {
        /// Path of the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}
