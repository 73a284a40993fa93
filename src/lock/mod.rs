//! Per-slot mutual exclusion.
//!
//! Two concurrent selections for the same slot may both observe the same
//! unexplored banner before either view is recorded. A `Rotator` built with
//! slot locking takes the slot's lock for the whole select-and-record cycle,
//! so exploration hands out distinct banners. Without it the race is
//! accepted and the core takes no locks at all.

mod in_memory;

use std::sync::Arc;

use thiserror::Error;

pub use in_memory::{InMemoryLock, SlotGuard, SlotLocks};

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The underlying primitive was poisoned (a thread panicked while holding it).
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    /// Failed to acquire the lock.
    #[error("lock acquire failed: {0}")]
    AcquireFailed(String),
}

/// A single lock instance.
///
/// In-memory locks use `Mutex` + `Condvar`; a multi-process deployment
/// would back this with an advisory lock in the database.
pub trait Lock: Send + Sync {
    /// Acquire the lock, blocking until it becomes available.
    fn lock(&self) -> Result<(), LockError>;

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if already held.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock.
    fn unlock(&self) -> Result<(), LockError>;
}

/// Holds a lock until dropped.
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
}

impl<L: Lock> LockGuard<L> {
    /// Block until `lock` is acquired.
    pub fn acquire(lock: Arc<L>) -> Result<Self, LockError> {
        lock.lock()?;
        Ok(Self { lock })
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock() {
            tracing::error!(error = %err, "failed to release slot lock");
        }
    }
}
