//! Per-key async mutual exclusion.
//!
//! Reconciliation reads a user's entries and membership, decides, then
//! writes. Two deliveries for the same user must not interleave that
//! sequence; deliveries for different users may run in parallel.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async mutexes, one per key, created on demand.
///
/// Idle keys are pruned whenever another key is locked, so the map only
/// holds keys that are locked or awaited.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut locks = self.locks.lock().await;
            locks.retain(|k, slot| *k == key || Arc::strong_count(slot) > 1);
            locks.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
