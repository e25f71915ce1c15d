//! Error types for the record store, schema loading, and settings.
//!
//! Per-request failures are [`StoreError`]s and are always converted into a
//! [`crate::types::protocol::Response::Error`] at the dispatcher. [`SchemaError`] and
//! [`ConfigError`] only occur at startup and are fatal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};


/// The user-facing classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EntryNotFound,
    EntryAlreadyExists,
    FieldNotFound,
    MalformedAssignment,
    StorageIoError,
    SchemaLoadError,
    /// The command line itself could not be parsed (unknown command,
    /// missing arguments).
    InvalidCommand,
}

impl ErrorKind {
    /// Return the snake_case label used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::EntryNotFound => "entry_not_found",
            ErrorKind::EntryAlreadyExists => "entry_already_exists",
            ErrorKind::FieldNotFound => "field_not_found",
            ErrorKind::MalformedAssignment => "malformed_assignment",
            ErrorKind::StorageIoError => "storage_io_error",
            ErrorKind::SchemaLoadError => "schema_load_error",
            ErrorKind::InvalidCommand => "invalid_command",
        }
    }
}


/// Failures of a single record-store or parser operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no entry named: {0}")]
    EntryNotFound(String),

    #[error("the entry {0} already exists")]
    EntryAlreadyExists(String),

    #[error("unknown field name: {0}")]
    FieldNotFound(String),

    #[error("malformed assignment: {0}")]
    MalformedAssignment(String),

    #[error("storage I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt state for namespace {namespace}: {source}")]
    Corrupt {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify this error into one of the user-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::EntryNotFound(_) => ErrorKind::EntryNotFound,
            StoreError::EntryAlreadyExists(_) => ErrorKind::EntryAlreadyExists,
            StoreError::FieldNotFound(_) => ErrorKind::FieldNotFound,
            StoreError::MalformedAssignment(_) => ErrorKind::MalformedAssignment,
            StoreError::Io { .. } | StoreError::Corrupt { .. } | StoreError::Unavailable(_) => {
                ErrorKind::StorageIoError
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}


/// Failure to load the field schema. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("cannot read field schema {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse field schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse field schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("field schema declares no fields")]
    Empty,

    #[error("canonical field {0} declared more than once")]
    DuplicateField(String),
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SchemaLoadError
    }
}


/// Failure to load startup settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },
}


/// Anything that stops the dispatcher from being built.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("cannot open save directory: {0}")]
    Store(#[from] StoreError),
}
