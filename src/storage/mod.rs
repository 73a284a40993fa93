//! Storage - Entities, rotations, and the append-only event log.
//!
//! `Storage` is the narrow contract the rotator needs from persistence. All
//! reads return complete result sets and are expected to be strongly
//! consistent for a single slot. `InMemoryStorage` is included for tests,
//! development, and single-process deployments; SQL or other backends
//! implement the same trait.
//!
//! ## Example
//!
//! ```
//! use banner_rotator::storage::{InMemoryStorage, Storage};
//!
//! let storage = InMemoryStorage::new();
//! let slot = storage.create_slot("header").unwrap();
//! let banner = storage.create_banner("spring sale").unwrap();
//! storage.create_rotation(slot.id, banner.id).unwrap();
//!
//! let unseen = storage.eligible_not_yet_viewed_banners(slot.id).unwrap();
//! assert_eq!(unseen, vec![banner]);
//! ```

mod in_memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Banner, BannerId, ClickEvent, Group, GroupId, Slot, SlotId, ViewEvent};

pub use in_memory::InMemoryStorage;

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    /// The write would violate a uniqueness constraint.
    #[error("{entity} {id} already exists")]
    Conflict { entity: &'static str, id: String },
    /// Internal lock poisoned by a panicking writer.
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// Backend-specific failure (connection, query, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence contract consumed by the rotator.
pub trait Storage: Send + Sync {
    fn create_slot(&self, description: &str) -> Result<Slot, StorageError>;

    fn create_banner(&self, description: &str) -> Result<Banner, StorageError>;

    fn create_group(&self, description: &str) -> Result<Group, StorageError>;

    /// Make `banner` eligible for `slot`.
    fn create_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError>;

    /// Remove `banner` from `slot`'s candidate set. Recorded history stays.
    fn delete_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError>;

    /// Banners in rotation for `slot` that have never been viewed there.
    fn eligible_not_yet_viewed_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError>;

    /// Every banner in rotation for `slot`.
    fn eligible_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError>;

    /// Complete view history of `slot`, in recording order.
    fn view_history(&self, slot: SlotId) -> Result<Vec<ViewEvent>, StorageError>;

    /// Complete click history of `slot`, in recording order.
    fn click_history(&self, slot: SlotId) -> Result<Vec<ClickEvent>, StorageError>;

    fn record_view(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    fn record_click(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}
