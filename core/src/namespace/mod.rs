//! Namespaced persistence: one record store per opaque namespace key, each
//! with a current state and a one-level backup.

pub mod backend;
pub mod lock;
pub mod memory;
pub mod path;
pub mod store;

pub use backend::{FileBackend, Slot, StorageBackend};
pub use lock::{with_namespace, NamespaceLocks};
pub use memory::MemoryBackend;
pub use path::Namespace;
pub use store::RecordStore;
