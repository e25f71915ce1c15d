//! Record store: per-namespace entries with a one-level backup.
//!
//! Every mutation reads the current state, computes the next state, writes
//! the pre-mutation text to the backup slot and then the next state to the
//! current slot. Undo feeds the backup through that same commit, so two
//! undos in a row restore the state from before the first one.
//!
//! All operations on one namespace are serialized; different namespaces
//! proceed independently.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::backend::{Slot, StorageBackend};
use super::lock::{with_namespace, NamespaceLocks};
use super::path::Namespace;
use crate::error::StoreError;
use crate::schema::FieldSchema;
use crate::types::record::{Entries, Record, Status, StatusSymbol, STATUS_FIELD};


/// Persisted state of a namespace as read from the backend: the raw text
/// and its decoded form.
struct Loaded {
    raw: String,
    entries: Entries,
}


pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    schema: Arc<FieldSchema>,
    locks: NamespaceLocks,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>, schema: Arc<FieldSchema>) -> Self {
        RecordStore {
            backend,
            schema,
            locks: NamespaceLocks::new(),
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Current entries of a namespace. A namespace with no persisted state
    /// is initialized (empty state and empty backup) first.
    pub fn get(&self, ns: &Namespace) -> Result<Entries, StoreError> {
        with_namespace(&self.locks, ns, || Ok(self.load_current(ns)?.entries))
    }

    /// The backup snapshot: the state before the last committed write.
    pub fn backup(&self, ns: &Namespace) -> Result<Entries, StoreError> {
        with_namespace(&self.locks, ns, || {
            self.load_current(ns)?;
            Ok(self.load_backup(ns)?.entries)
        })
    }

    /// One record by exact, case-sensitive name.
    pub fn lookup(&self, ns: &Namespace, name: &str) -> Result<Record, StoreError> {
        let entries = self.get(ns)?;
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))
    }

    /// Entry names with their status symbols, in stored order.
    pub fn list(&self, ns: &Namespace) -> Result<Vec<(String, StatusSymbol)>, StoreError> {
        let entries = self.get(ns)?;
        Ok(entries
            .iter()
            .map(|(name, record)| (name.to_string(), record.status().symbol()))
            .collect())
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Create an entry from canonical `(field, value)` pairs. Fields not
    /// mentioned default to empty; later pairs override earlier ones.
    pub fn create(
        &self,
        ns: &Namespace,
        name: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        validate_name(name)?;
        if let Some((field, _)) = fields.iter().find(|(f, _)| !self.schema.contains(f)) {
            return Err(StoreError::FieldNotFound(field.clone()));
        }

        self.mutate(ns, "create", name, |entries| {
            if entries.contains(name) {
                return Err(StoreError::EntryAlreadyExists(name.to_string()));
            }
            let mut record = self.schema.new_record();
            for (field, value) in fields {
                record.set(field, value.as_str());
            }
            entries.insert(name, record);
            Ok(())
        })
    }

    /// Set one field, addressed by any of its aliases.
    pub fn edit(
        &self,
        ns: &Namespace,
        entry: &str,
        field_alias: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let field = self.schema.resolve(field_alias)?.to_string();
        self.mutate(ns, "edit", entry, |entries| {
            let record = entries
                .get_mut(entry)
                .ok_or_else(|| StoreError::EntryNotFound(entry.to_string()))?;
            record.set(&field, value);
            Ok(())
        })
    }

    pub fn delete(&self, ns: &Namespace, name: &str) -> Result<(), StoreError> {
        self.mutate(ns, "delete", name, |entries| {
            entries
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))
        })
    }

    pub fn set_status(&self, ns: &Namespace, name: &str, status: Status) -> Result<(), StoreError> {
        self.mutate(ns, "set_status", name, |entries| {
            let record = entries
                .get_mut(name)
                .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;
            record.set(STATUS_FIELD, status.as_field());
            Ok(())
        })
    }

    /// Append `;{label} {url}` to the entry's `Media` field.
    pub fn add_media(
        &self,
        ns: &Namespace,
        name: &str,
        label: &str,
        url: &str,
    ) -> Result<(), StoreError> {
        self.mutate(ns, "add_media", name, |entries| {
            let record = entries
                .get_mut(name)
                .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;
            record.push_media(label, url);
            Ok(())
        })
    }

    /// Swap current state and backup through the regular commit.
    pub fn undo(&self, ns: &Namespace) -> Result<(), StoreError> {
        with_namespace(&self.locks, ns, || {
            let current = self.load_current(ns)?;
            let backup = self.load_backup(ns)?;
            self.commit(ns, &current.raw, &backup.raw)?;
            info!(
                namespace = %ns,
                entries = backup.entries.len(),
                "restored backup snapshot"
            );
            Ok(())
        })
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    /// Run `f` on the current entries under the namespace lock and commit
    /// the result. Nothing is written if `f` fails.
    fn mutate<T>(
        &self,
        ns: &Namespace,
        op: &'static str,
        name: &str,
        f: impl FnOnce(&mut Entries) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        with_namespace(&self.locks, ns, || {
            let current = self.load_current(ns)?;
            let mut next = current.entries.clone();
            let out = f(&mut next)?;
            let next_raw = serialize(ns, &next)?;
            self.commit(ns, &current.raw, &next_raw)?;
            info!(namespace = %ns, op, entry = name, "committed");
            Ok(out)
        })
    }

    /// Backup-then-write. If the current slot cannot be written, the
    /// previous backup is put back so the visible state is unchanged.
    fn commit(&self, ns: &Namespace, pre: &str, next: &str) -> Result<(), StoreError> {
        let previous_backup = self.backend.read(ns, Slot::Backup)?;
        self.backend.write(ns, Slot::Backup, pre)?;
        if let Err(e) = self.backend.write(ns, Slot::Current, next) {
            error!(namespace = %ns, error = %e, "writing current state failed");
            if let Some(prev) = previous_backup {
                if let Err(restore) = self.backend.write(ns, Slot::Backup, &prev) {
                    error!(namespace = %ns, error = %restore, "restoring backup failed");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Read the current slot, initializing the namespace if it has none.
    fn load_current(&self, ns: &Namespace) -> Result<Loaded, StoreError> {
        match self.backend.read(ns, Slot::Current)? {
            Some(raw) => decode(ns, raw),
            None => {
                let empty = serialize(ns, &Entries::new())?;
                self.backend.write(ns, Slot::Backup, &empty)?;
                self.backend.write(ns, Slot::Current, &empty)?;
                debug!(namespace = %ns, "initialized empty namespace");
                Ok(Loaded {
                    raw: empty,
                    entries: Entries::new(),
                })
            }
        }
    }

    /// Read the backup slot. A missing backup reads as an empty store.
    fn load_backup(&self, ns: &Namespace) -> Result<Loaded, StoreError> {
        match self.backend.read(ns, Slot::Backup)? {
            Some(raw) => decode(ns, raw),
            None => Ok(Loaded {
                raw: serialize(ns, &Entries::new())?,
                entries: Entries::new(),
            }),
        }
    }
}


fn decode(ns: &Namespace, raw: String) -> Result<Loaded, StoreError> {
    let entries = Entries::from_json(&raw).map_err(|source| {
        error!(namespace = %ns, error = %source, "persisted state is not valid JSON");
        StoreError::Corrupt {
            namespace: ns.to_string(),
            source,
        }
    })?;
    Ok(Loaded { raw, entries })
}


fn serialize(ns: &Namespace, entries: &Entries) -> Result<String, StoreError> {
    entries.to_json().map_err(|source| StoreError::Corrupt {
        namespace: ns.to_string(),
        source,
    })
}


fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::MalformedAssignment(
            "entry name must not be empty".into(),
        ));
    }
    Ok(())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
