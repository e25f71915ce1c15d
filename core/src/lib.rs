//! Infobot core: a namespaced, schema-driven record store driven by short
//! textual commands.
//!
//! The crate is organised leaves first:
//!
//! - [`schema`] resolves user-typed field aliases to canonical field names.
//! - [`cli::assign`] turns `FIELD=VALUE $ FIELD=VALUE` text into a field map.
//! - [`suggest`] ranks existing entry names against a missed lookup key.
//! - [`namespace`] owns persisted records, the one-level backup and undo.
//! - [`sys`] dispatches a [`command::Command`] against a namespace and
//!   returns a [`types::protocol::Response`].

pub mod cli;
pub mod command;
pub mod data;
pub mod error;
pub mod help;
pub mod namespace;
pub mod schema;
pub mod suggest;
pub mod sys;
pub mod types;

pub use command::Command;
pub use error::{ConfigError, ErrorKind, SchemaError, StartupError, StoreError};
pub use namespace::{FileBackend, MemoryBackend, Namespace, RecordStore, StorageBackend};
pub use schema::FieldSchema;
pub use sys::Sys;
pub use types::protocol::Response;
