use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Mutex as KeyLock, OwnedMutexGuard};

/// Lazily created per-key mutual exclusion.
///
/// Every key maps to exactly one heap-allocated lock for the lifetime of the
/// registry; callers asking for the same key always contend on that one
/// instance. Entries are never evicted.
///
/// The registry's own guard only protects the map and is never held across an
/// `.await`.
#[derive(Debug, Default)]
pub(crate) struct LockRegistry {
    locks: Mutex<FxHashMap<String, Arc<KeyLock<()>>>>,
}

impl LockRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the shared lock for `key`, creating it on first use.
    pub(crate) fn handle(&self, key: &str) -> Arc<KeyLock<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(key) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(KeyLock::new(()));
        locks.insert(key.to_owned(), Arc::clone(&lock));
        lock
    }

    /// Waits for exclusive access to `key`. Access ends when the guard drops.
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        self.handle(key).lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}
