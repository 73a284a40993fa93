//! Shared fixtures: a seeded rotator over in-memory collaborators, plus
//! storage and publisher wrappers that fail on demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use banner_rotator::bus::{Event, InMemoryQueue, PublishError, Publisher};
use banner_rotator::model::{Banner, BannerId, ClickEvent, Group, GroupId, Slot, SlotId, ViewEvent};
use banner_rotator::storage::{InMemoryStorage, Storage, StorageError};
use banner_rotator::{Bandit, Rotator};
use chrono::{DateTime, Utc};

pub type TestRotator = Rotator<InMemoryStorage, InMemoryQueue>;

pub fn rotator(seed: u64) -> TestRotator {
    Rotator::new(InMemoryStorage::new(), InMemoryQueue::new(), Bandit::with_seed(seed))
}

/// A slot with `banners` banners in rotation, and one audience group.
pub struct Fixture {
    pub slot: SlotId,
    pub group: GroupId,
    pub banners: Vec<BannerId>,
}

pub fn seed_slot<S: Storage, P: Publisher>(rotator: &Rotator<S, P>, banners: usize) -> Fixture {
    let slot = rotator.create_slot("header").unwrap().id;
    let group = rotator.create_group("adults").unwrap().id;
    let banners = (0..banners)
        .map(|i| {
            let banner = rotator.create_banner(&format!("banner {i}")).unwrap().id;
            rotator.create_rotation(slot, banner).unwrap();
            banner
        })
        .collect();
    Fixture {
        slot,
        group,
        banners,
    }
}

/// Wraps `InMemoryStorage` and fails selected operations.
#[derive(Default)]
pub struct FlakyStorage {
    pub inner: InMemoryStorage,
    pub fail_record_view: AtomicBool,
    pub fail_history: AtomicBool,
    /// Views of this banner are left out of `view_history`.
    pub hide_views_of: Mutex<Option<BannerId>>,
}

impl FlakyStorage {
    pub fn fail_record_view(&self, fail: bool) {
        self.fail_record_view.store(fail, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn hide_views_of(&self, banner: BannerId) {
        *self.hide_views_of.lock().unwrap() = Some(banner);
    }
}

fn backend(what: &str) -> StorageError {
    StorageError::Backend(format!("{what} unavailable"))
}

impl Storage for FlakyStorage {
    fn create_slot(&self, description: &str) -> Result<Slot, StorageError> {
        self.inner.create_slot(description)
    }

    fn create_banner(&self, description: &str) -> Result<Banner, StorageError> {
        self.inner.create_banner(description)
    }

    fn create_group(&self, description: &str) -> Result<Group, StorageError> {
        self.inner.create_group(description)
    }

    fn create_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError> {
        self.inner.create_rotation(slot, banner)
    }

    fn delete_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), StorageError> {
        self.inner.delete_rotation(slot, banner)
    }

    fn eligible_not_yet_viewed_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError> {
        self.inner.eligible_not_yet_viewed_banners(slot)
    }

    fn eligible_banners(&self, slot: SlotId) -> Result<Vec<Banner>, StorageError> {
        self.inner.eligible_banners(slot)
    }

    fn view_history(&self, slot: SlotId) -> Result<Vec<ViewEvent>, StorageError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(backend("views"));
        }
        let hidden = *self.hide_views_of.lock().unwrap();
        let mut views = self.inner.view_history(slot)?;
        views.retain(|view| Some(view.banner_id) != hidden);
        Ok(views)
    }

    fn click_history(&self, slot: SlotId) -> Result<Vec<ClickEvent>, StorageError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(backend("clicks"));
        }
        self.inner.click_history(slot)
    }

    fn record_view(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if self.fail_record_view.load(Ordering::SeqCst) {
            return Err(backend("views"));
        }
        self.inner.record_view(slot, banner, group, date)
    }

    fn record_click(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
        date: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.inner.record_click(slot, banner, group, date)
    }
}

/// Publisher whose broker is always down.
#[derive(Default)]
pub struct DownPublisher;

impl Publisher for DownPublisher {
    fn publish(&self, _event: Event) -> Result<(), PublishError> {
        Err(PublishError::ConnectionFailed("broker unreachable".into()))
    }
}
