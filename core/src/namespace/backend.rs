//! Storage backends for namespace state.
//!
//! Each namespace owns two text slots: the current state and the backup
//! snapshot. Backends only move opaque serialized text; the record store
//! decides what goes in each slot.
//!
//! `FileBackend` lays them out as
//!
//! ```text
//! <save_dir>/<stem>.json          current state
//! <save_dir>/<stem>.backup.json   state before the last committed write
//! ```
//!
//! Writes go to a `.tmp` sibling, are synced, then renamed over the target,
//! so a reader never observes a half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::path::Namespace;
use crate::error::StoreError;


/// Which of a namespace's two persisted resources to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Current,
    Backup,
}

impl Slot {
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Current => "current",
            Slot::Backup => "backup",
        }
    }
}


/// Persistence for namespace state. Implementations must make each
/// `write` atomic: afterwards the slot holds either the old or the new
/// content, never a mix.
pub trait StorageBackend: Send + Sync {
    /// Read a slot. `Ok(None)` if the slot has never been written.
    fn read(&self, ns: &Namespace, slot: Slot) -> Result<Option<String>, StoreError>;

    /// Replace a slot's content.
    fn write(&self, ns: &Namespace, slot: Slot, content: &str) -> Result<(), StoreError>;
}


/// File-per-slot backend rooted at a save directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    save_dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `save_dir`, creating the directory if
    /// it doesn't exist.
    pub fn new(save_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let save_dir = save_dir.into();
        fs::create_dir_all(&save_dir).map_err(|e| StoreError::io(&save_dir, e))?;
        Ok(FileBackend { save_dir })
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Path of a namespace slot.
    pub fn slot_path(&self, ns: &Namespace, slot: Slot) -> PathBuf {
        let stem = ns.file_stem();
        match slot {
            Slot::Current => self.save_dir.join(format!("{}.json", stem)),
            Slot::Backup => self.save_dir.join(format!("{}.backup.json", stem)),
        }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, ns: &Namespace, slot: Slot) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(ns, slot);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, ns: &Namespace, slot: Slot, content: &str) -> Result<(), StoreError> {
        let path = self.slot_path(ns, slot);
        atomic_write(&path, content.as_bytes())?;
        debug!(namespace = %ns, slot = slot.label(), path = %path.display(), "slot written");
        Ok(())
    }
}


/// Write to `<path>.tmp`, sync, then rename over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::io(path, e));
    }
    Ok(())
}
