//! Error types for the rotator.

use thiserror::Error;

use crate::bandit::BanditError;
use crate::bus::PublishError;
use crate::lock::LockError;
use crate::model::{BannerId, EventKind, SlotId};
use crate::storage::StorageError;

/// How far a failed operation got before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// No banner could be chosen.
    NotChosen,
    /// A banner was chosen (or given) but the event was not durably recorded.
    NotRecorded,
    /// The event was recorded; only the notification failed.
    NotNotified,
    /// An administrative change (entity or rotation) was not applied.
    NotApplied,
}

/// Error type for rotator operations. Each variant names the failing step.
#[derive(Debug, Error)]
pub enum RotatorError {
    #[error("fetch candidates for slot {slot}: {source}")]
    FetchCandidates { slot: SlotId, source: StorageError },

    #[error("fetch history for slot {slot}: {source}")]
    FetchHistory { slot: SlotId, source: StorageError },

    #[error("select banner for slot {slot}: {source}")]
    Selection { slot: SlotId, source: BanditError },

    #[error("record view of banner {banner} in slot {slot}: {source}")]
    RecordView {
        slot: SlotId,
        banner: BannerId,
        source: StorageError,
    },

    #[error("record click on banner {banner} in slot {slot}: {source}")]
    RecordClick {
        slot: SlotId,
        banner: BannerId,
        source: StorageError,
    },

    #[error("publish {kind} of banner {banner} in slot {slot}: {source}")]
    Publish {
        kind: EventKind,
        slot: SlotId,
        banner: BannerId,
        source: PublishError,
    },

    #[error("lock slot {slot}: {source}")]
    Lock { slot: SlotId, source: LockError },

    /// Administrative storage operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl RotatorError {
    pub fn failure_stage(&self) -> FailureStage {
        match self {
            RotatorError::FetchCandidates { .. }
            | RotatorError::FetchHistory { .. }
            | RotatorError::Selection { .. }
            | RotatorError::Lock { .. } => FailureStage::NotChosen,
            RotatorError::RecordView { .. } | RotatorError::RecordClick { .. } => {
                FailureStage::NotRecorded
            }
            RotatorError::Storage(_) => FailureStage::NotApplied,
            RotatorError::Publish { .. } => FailureStage::NotNotified,
        }
    }

    /// The scoring engine's verdict, when selection itself failed.
    pub fn bandit_error(&self) -> Option<&BanditError> {
        match self {
            RotatorError::Selection { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The storage failure behind this error, if any.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            RotatorError::FetchCandidates { source, .. }
            | RotatorError::FetchHistory { source, .. }
            | RotatorError::RecordView { source, .. }
            | RotatorError::RecordClick { source, .. } => Some(source),
            RotatorError::Storage(source) => Some(source),
            _ => None,
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        if let Some(BanditError::EmptyCandidateSet) = self.bandit_error() {
            return 404;
        }
        match self.storage_error() {
            Some(StorageError::NotFound { .. }) => return 404,
            Some(StorageError::Conflict { .. }) => return 409,
            _ => {}
        }
        match self {
            RotatorError::Publish { .. } => 502,
            _ => 500,
        }
    }

    /// Banner that was durably recorded before the notification failed.
    pub fn recorded_banner(&self) -> Option<BannerId> {
        match self {
            RotatorError::Publish { banner, .. } => Some(*banner),
            _ => None,
        }
    }
}
