//! In-memory storage backend for tests.
//!
//! Records every write, and can be told to fail writes to a given slot so
//! the store's all-or-nothing commit path can be exercised deterministically.

use std::collections::HashMap;
use std::sync::Mutex;

use super::backend::{Slot, StorageBackend};
use super::path::Namespace;
use crate::error::StoreError;


#[derive(Debug, Default)]
struct MemoryState {
    slots: HashMap<(Namespace, Slot), String>,
    fail_slot: Option<Slot>,
    writes: usize,
}


/// A test double that keeps slots in a map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `slot` fail until cleared with `None`.
    pub fn fail_writes_to(&self, slot: Option<Slot>) {
        self.lock().fail_slot = slot;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Raw content of a slot, bypassing the trait.
    pub fn raw(&self, ns: &Namespace, slot: Slot) -> Option<String> {
        self.lock().slots.get(&(ns.clone(), slot)).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, ns: &Namespace, slot: Slot) -> Result<Option<String>, StoreError> {
        Ok(self.raw(ns, slot))
    }

    fn write(&self, ns: &Namespace, slot: Slot, content: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_slot == Some(slot) {
            return Err(StoreError::Unavailable(format!(
                "injected failure writing {} slot of {}",
                slot.label(),
                ns
            )));
        }
        state.slots.insert((ns.clone(), slot), content.to_string());
        state.writes += 1;
        Ok(())
    }
}
