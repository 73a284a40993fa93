use chrono::Utc;
use tracing::{debug, warn};

use super::RotatorError;
use crate::bandit::Bandit;
use crate::bus::{Notification, Publisher};
use crate::lock::SlotLocks;
use crate::model::{Banner, BannerId, EventKind, Group, GroupId, Slot, SlotId};
use crate::storage::Storage;

/// Chooses banners for slots and records the resulting feedback.
///
/// Holds no per-request state; everything a selection depends on lives in
/// storage. Share one instance across request handlers (`Arc<Rotator<..>>`).
pub struct Rotator<S, P> {
    storage: S,
    publisher: P,
    bandit: Bandit,
    slot_locks: Option<SlotLocks>,
}

impl<S: Storage, P: Publisher> Rotator<S, P> {
    pub fn new(storage: S, publisher: P, bandit: Bandit) -> Self {
        Self {
            storage,
            publisher,
            bandit,
            slot_locks: None,
        }
    }

    /// Serialize select-and-record per slot, so concurrent exploration never
    /// hands out the same unexplored banner twice.
    pub fn with_slot_locking(mut self, enabled: bool) -> Self {
        self.slot_locks = enabled.then(SlotLocks::new);
        self
    }

    /// Whether `select_banner` may block waiting for another selection on
    /// the same slot.
    pub fn serializes_selection(&self) -> bool {
        self.slot_locks.is_some()
    }

    pub fn slot_locks(&self) -> Option<&SlotLocks> {
        self.slot_locks.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn create_slot(&self, description: &str) -> Result<Slot, RotatorError> {
        Ok(self.storage.create_slot(description.trim())?)
    }

    pub fn create_banner(&self, description: &str) -> Result<Banner, RotatorError> {
        Ok(self.storage.create_banner(description.trim())?)
    }

    pub fn create_group(&self, description: &str) -> Result<Group, RotatorError> {
        Ok(self.storage.create_group(description.trim())?)
    }

    pub fn create_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), RotatorError> {
        self.storage.create_rotation(slot, banner)?;
        debug!(%slot, %banner, "rotation created");
        Ok(())
    }

    pub fn delete_rotation(&self, slot: SlotId, banner: BannerId) -> Result<(), RotatorError> {
        self.storage.delete_rotation(slot, banner)?;
        debug!(%slot, %banner, "rotation deleted");
        Ok(())
    }

    /// Choose the next banner for `slot`, record the view, and notify.
    ///
    /// Unexplored banners are picked uniformly first; once every eligible
    /// banner has a view, the UCB ranking decides.
    pub fn select_banner(&self, slot: SlotId, group: GroupId) -> Result<Banner, RotatorError> {
        let _guard = match &self.slot_locks {
            Some(locks) => Some(
                locks
                    .acquire(slot)
                    .map_err(|source| RotatorError::Lock { slot, source })?,
            ),
            None => None,
        };

        let banner = self.choose(slot)?;
        self.record(EventKind::View, slot, banner.id, group)?;
        Ok(banner)
    }

    /// Record a view of `banner` in `slot` and notify.
    pub fn record_view(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
    ) -> Result<(), RotatorError> {
        self.record(EventKind::View, slot, banner, group)
    }

    /// Record a click on `banner` in `slot` and notify. Only affects future
    /// rankings.
    pub fn record_click(
        &self,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
    ) -> Result<(), RotatorError> {
        self.record(EventKind::Click, slot, banner, group)
    }

    fn choose(&self, slot: SlotId) -> Result<Banner, RotatorError> {
        let unexplored = self
            .storage
            .eligible_not_yet_viewed_banners(slot)
            .map_err(|source| RotatorError::FetchCandidates { slot, source })?;
        if let Ok(banner) = self.bandit.uniform_pick(&unexplored) {
            debug!(%slot, banner = %banner.id, unexplored = unexplored.len(), "exploring");
            return Ok(banner);
        }

        let candidates = self
            .storage
            .eligible_banners(slot)
            .map_err(|source| RotatorError::FetchCandidates { slot, source })?;
        let views = self
            .storage
            .view_history(slot)
            .map_err(|source| RotatorError::FetchHistory { slot, source })?;
        let clicks = self
            .storage
            .click_history(slot)
            .map_err(|source| RotatorError::FetchHistory { slot, source })?;

        let banner = self
            .bandit
            .ranked_pick(&candidates, &views, &clicks)
            .map_err(|source| RotatorError::Selection { slot, source })?;
        debug!(
            %slot,
            banner = %banner.id,
            candidates = candidates.len(),
            views = views.len(),
            clicks = clicks.len(),
            "exploiting"
        );
        Ok(banner)
    }

    fn record(
        &self,
        kind: EventKind,
        slot: SlotId,
        banner: BannerId,
        group: GroupId,
    ) -> Result<(), RotatorError> {
        let date = Utc::now();
        match kind {
            EventKind::View => self
                .storage
                .record_view(slot, banner, group, date)
                .map_err(|source| RotatorError::RecordView {
                    slot,
                    banner,
                    source,
                })?,
            EventKind::Click => self
                .storage
                .record_click(slot, banner, group, date)
                .map_err(|source| RotatorError::RecordClick {
                    slot,
                    banner,
                    source,
                })?,
        }

        Notification::new(kind, slot, banner, group, date)
            .to_event()
            .and_then(|event| self.publisher.publish(event))
            .map_err(|source| {
                warn!(%kind, %slot, %banner, error = %source, "recorded but not published");
                RotatorError::Publish {
                    kind,
                    slot,
                    banner,
                    source,
                }
            })
    }
}
