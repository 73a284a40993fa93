//! InMemoryStorage - BTreeMap-backed storage for testing and development.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{Storage, StorageError};
use crate::model::{
    Banner, BannerId, ClickEvent, Group, GroupId, Rotation, Slot, SlotId, ViewEvent,
};

#[derive(Default)]
struct Tables {
    slots: BTreeMap<SlotId, String>,
    banners: BTreeMap<BannerId, String>,
    groups: BTreeMap<GroupId, String>,
    rotations: BTreeSet<Rotation>,
    views: Vec<ViewEvent>,
    clicks: Vec<ClickEvent>,
    next_slot: i64,
    next_banner: i64,
    next_group: i64,
}

impl Tables {
    fn require_slot(&self, id: SlotId) -> Result<(), StorageError> {
        if self.slots.contains_key(&id) {
            Ok(())
        } else {
            Err(not_found("slot", id))
        }
    }

    fn require_banner(&self, id: BannerId) -> Result<(), StorageError> {
        if self.banners.contains_key(&id) {
            Ok(())
        } else {
            Err(not_found("banner", id))
        }
    }

    fn require_group(&self, id: GroupId) -> Result<(), StorageError> {
        if self.groups.contains_key(&id) {
            Ok(())
        } else {
            Err(not_found("group", id))
        }
    }

    fn slot_banners(&self, slot: SlotId) -> impl Iterator<Item = Banner> + '_ {
        let first = Rotation::new(slot, BannerId::new(i64::MIN));
        let last = Rotation::new(slot, BannerId::new(i64::MAX));
        self.rotations
            .range(first..=last)
            .filter_map(move |rotation| {
                self.banners.get(&rotation.banner_id).map(|description| Banner {
                    id: rotation.banner_id,
                    description: description.clone(),
                })
            })
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> StorageError {
    StorageError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// In-memory storage backed by ordered maps.
///
/// Enforces the referential rules a relational schema would: rotations and
/// events must reference existing rows, and a (slot, banner) rotation exists
/// at most once. Identifiers are assigned sequentially starting at 1.
/// Clone-friendly via Arc; clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::LockPoisoned(operation))
    }

    /// Number of views recorded for `banner` in `slot`.
    pub fn view_count(&self, slot: SlotId, banner: BannerId) -> Result<usize, StorageError> {
        let tables = self.read("view_count")?;
        Ok(tables
            .views
            .iter()
            .filter(|v| v.slot_id == slot && v.banner_id == banner)
            .count())
    }

    /// Number of clicks recorded for `banner` in `slot`.
    pub fn click_count(&self, slot: SlotId, banner: BannerId) -> Result<usize, StorageError> {
        let tables = self.read("click_count")?;
        Ok(tables
            .clicks
            .iter()
            .filter(|c| c.slot_id == slot && c.banner_id == banner)
            .count())
    }
}

impl Storage for InMemoryStorage {
    fn create_slot(&self, description: &str) -> Result<Slot, StorageError> {
        let mut tables = self.write("create_slot")?;
        let id = SlotId::new(next_id(&mut tables.next_slot));
        tables.slots.insert(id, description.to_string());
        Ok(Slot {
            id,
            description: description.to_string(),
        })
    }

    fn create_banner(&self, description: &str) -> Result<Banner, StorageError> {
        let mut tables = self.write("create_banner")?;
        let id = BannerId::new(next_id(&mut tables.next_banner));
        tables.banners.insert(id, description.to_string());
        Ok(Banner {
            id,
            description: description.to_string(),
        })
    }

    fn create_group(&self, description: &str) -> Result<Group, StorageError> {
        let mut tables = self.write("create_group")?;
        let id = GroupId::new(next_id(&mut tables.next_group));
        tables.groups.insert(id, description.to_string());
        Ok(Group {
            id,
            description: description.to_string(),
        })
    }

    fn create_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError> {
        let mut tables = self.write("create_rotation")?;
        tables.require_slot(slot)?;
        tables.require_banner(banner)?;
        if !tables.rotations.insert(Rotation::new(slot, banner)) {
            return Err(StorageError::Conflict {
                entity: "rotation",
                id: format!("{slot}/{banner}"),
            });
        }
        Ok(())
    }

    fn delete_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError> {
        let mut tables = self.write("delete_rotation")?;
        if !tables.rotations.remove(&Rotation::new(slot, banner)) {
            return Err(not_found("rotation", format!("{slot}/{banner}")));
        }
        Ok(())
    }

    fn eligible_not_yet_viewed_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError> {
        let tables = self.read("eligible_not_yet_viewed_banners")?;
        let viewed: BTreeSet<BannerId> = tables
            .views
            .iter()
            .filter(|v| v.slot_id == slot)
            .map(|v| v.banner_id)
            .collect();
        Ok(tables
            .slot_banners(slot)
            .filter(|banner| !viewed.contains(&banner.id))
            .collect())
    }

    fn eligible_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError> {
        let tables = self.read("eligible_banners")?;
        Ok(tables.slot_banners(slot).collect())
    }

    fn view_history(&self, slot: SlotId) -> Result<Vec<ViewEvent>, StorageError> {
        let tables = self.read("view_history")?;
        Ok(tables
            .views
            .iter()
            .filter(|v| v.slot_id == slot)
            .cloned()
            .collect())
    }

    fn click_history(&self, slot: SlotId) -> Result<Vec<ClickEvent>, StorageError> {
        let tables = self.read("click_history")?;
        Ok(tables
            .clicks
            .iter()
            .filter(|c| c.slot_id == slot)
            .cloned()
            .collect())
    }

    fn record_view(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tables = self.write("record_view")?;
        tables.require_slot(slot)?;
        tables.require_banner(banner)?;
        tables.require_group(group)?;
        tables.views.push(ViewEvent::new(slot, banner, group, date));
        Ok(())
    }

    fn record_click(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tables = self.write("record_click")?;
        tables.require_slot(slot)?;
        tables.require_banner(banner)?;
        tables.require_group(group)?;
        tables.clicks.push(ClickEvent::new(slot, banner, group, date));
        Ok(())
    }
}
