use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use super::{Lock, LockError, LockGuard};
use crate::model::SlotId;

/// In-memory lock backed by `Mutex<bool>` + `Condvar`.
pub struct InMemoryLock {
    state: Mutex<bool>,
    wake: Condvar,
}

impl InMemoryLock {
    pub fn new() -> Self {
        InMemoryLock {
            state: Mutex::new(false),
            wake: Condvar::new(),
        }
    }
}

impl Default for InMemoryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        while *locked {
            locked = self
                .wake
                .wait(locked)
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
        }
        *locked = true;
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *locked {
            Ok(false)
        } else {
            *locked = true;
            Ok(true)
        }
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *locked {
            *locked = false;
            self.wake.notify_one();
        }
        Ok(())
    }
}

/// One lazily created `InMemoryLock` per slot.
///
/// An entry lives only while some request holds or waits for it; the last
/// guard to drop removes it, so the map is bounded by in-flight requests.
#[derive(Default)]
pub struct SlotLocks {
    locks: Arc<Mutex<HashMap<SlotId, Arc<InMemoryLock>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots with a live lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get (or create) the lock for `slot`. Repeated calls return the same `Arc`
    /// while the entry is live.
    fn get_lock(&self, slot: SlotId) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("slot lock map poisoned".into()))?;
        Ok(locks
            .entry(slot)
            .or_insert_with(|| Arc::new(InMemoryLock::new()))
            .clone())
    }

    /// Block until `slot` is free and hold it until the guard drops.
    pub fn acquire(&self, slot: SlotId) -> Result<SlotGuard, LockError> {
        let lock = self.get_lock(slot)?;
        let guard = match LockGuard::acquire(lock) {
            Ok(guard) => guard,
            Err(err) => {
                prune(&self.locks, slot);
                return Err(err);
            }
        };
        Ok(SlotGuard {
            slot,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        })
    }
}

/// Holds one slot's lock. Dropping it releases the lock and forgets the slot
/// once nobody else references it.
pub struct SlotGuard {
    slot: SlotId,
    guard: Option<LockGuard<InMemoryLock>>,
    locks: Arc<Mutex<HashMap<SlotId, Arc<InMemoryLock>>>>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.locks, self.slot);
    }
}

// Clones are only handed out under the map mutex, so a count of 1 here means
// no holder and no waiter.
fn prune(locks: &Mutex<HashMap<SlotId, Arc<InMemoryLock>>>, slot: SlotId) {
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    if locks.get(&slot).is_some_and(|lock| Arc::strong_count(lock) == 1) {
        locks.remove(&slot);
    }
}
