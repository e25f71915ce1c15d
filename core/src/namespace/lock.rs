//! Per-namespace mutual exclusion.
//!
//! Every record-store operation runs a read-modify-write cycle against its
//! namespace's slots. Operations on the same namespace take the same mutex;
//! operations on different namespaces never share one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::path::Namespace;


/// Lazily populated registry of one mutex per namespace.
#[derive(Debug, Default)]
pub struct NamespaceLocks {
    locks: Mutex<HashMap<Namespace, Arc<Mutex<()>>>>,
}

impl NamespaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex for `ns`, created on first use.
    pub fn handle(&self, ns: &Namespace) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks
            .entry(ns.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}


/// Run `f` while holding `ns`'s lock.
///
/// A poisoned lock is recovered; the guarded data is `()`.
pub fn with_namespace<T>(locks: &NamespaceLocks, ns: &Namespace, f: impl FnOnce() -> T) -> T {
    let handle = locks.handle(ns);
    let _guard: MutexGuard<'_, ()> = handle.lock().unwrap_or_else(|p| p.into_inner());
    f()
}
