//! Per-record write serialization.
//!
//! Writes for the same id run their local→remote sequence one at a time so
//! the cache and both tiers see them in the same order. Writes for different
//! ids do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rollcall_core::{RollcallResult, StorageError};
use tokio::sync::OwnedMutexGuard;

type KeyMutex = Arc<tokio::sync::Mutex<()>>;

/// Map of id → async mutex. Entries are dropped once no writer holds or
/// awaits them.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Arc<Mutex<HashMap<String, KeyMutex>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `key`.
    pub(crate) async fn acquire(&self, key: &str) -> RollcallResult<KeyGuard> {
        let mutex = {
            let mut locks = self.locks.lock().map_err(|_| StorageError::LockPoisoned)?;
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        let guard = mutex.lock_owned().await;
        Ok(KeyGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            _guard: guard,
        })
    }

    /// Number of ids with a live lock entry.
    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// Held for the duration of one write.
pub(crate) struct KeyGuard {
    key: String,
    locks: Arc<Mutex<HashMap<String, KeyMutex>>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        // One reference in the map, one inside our own guard.
        let idle = locks
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) <= 2);
        if idle {
            locks.remove(&self.key);
        }
    }
}
