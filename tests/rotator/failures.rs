//! Partial failures report how far the operation got.

use banner_rotator::bandit::BanditError;
use banner_rotator::bus::InMemoryQueue;
use banner_rotator::storage::Storage;
use banner_rotator::{Bandit, FailureStage, Rotator, RotatorError};

use crate::support::{rotator, seed_slot, DownPublisher, FlakyStorage};

fn flaky() -> Rotator<FlakyStorage, InMemoryQueue> {
    Rotator::new(FlakyStorage::default(), InMemoryQueue::new(), Bandit::with_seed(2))
}

#[test]
fn unrecorded_view_is_not_published() {
    let r = flaky();
    let fx = seed_slot(&r, 2);
    r.storage().fail_record_view(true);

    let err = r.select_banner(fx.slot, fx.group).unwrap_err();
    assert!(matches!(err, RotatorError::RecordView { .. }));
    assert_eq!(err.failure_stage(), FailureStage::NotRecorded);
    assert!(r.publisher().is_empty());
    assert!(r.storage().inner.view_history(fx.slot).unwrap().is_empty());
}

#[test]
fn unpublished_view_is_still_recorded() {
    let r = Rotator::new(
        banner_rotator::InMemoryStorage::new(),
        DownPublisher,
        Bandit::with_seed(4),
    );
    let fx = seed_slot(&r, 1);

    let err = r.select_banner(fx.slot, fx.group).unwrap_err();
    assert_eq!(err.failure_stage(), FailureStage::NotNotified);
    assert_eq!(err.recorded_banner(), Some(fx.banners[0]));
    assert_eq!(err.status_code(), 502);
    assert_eq!(r.storage().view_count(fx.slot, fx.banners[0]).unwrap(), 1);
}

#[test]
fn history_failure_chooses_nothing() {
    let r = flaky();
    let fx = seed_slot(&r, 2);
    for _ in 0..2 {
        r.select_banner(fx.slot, fx.group).unwrap();
    }
    r.storage().fail_history(true);

    let err = r.select_banner(fx.slot, fx.group).unwrap_err();
    assert!(matches!(err, RotatorError::FetchHistory { .. }));
    assert_eq!(err.failure_stage(), FailureStage::NotChosen);
    assert_eq!(r.publisher().len(), 2);
}

#[test]
fn exploration_skips_history() {
    let r = flaky();
    let fx = seed_slot(&r, 2);
    r.storage().fail_history(true);

    // Unexplored banners are picked without consulting view or click history.
    r.select_banner(fx.slot, fx.group).unwrap();
    r.select_banner(fx.slot, fx.group).unwrap();
    assert!(r.select_banner(fx.slot, fx.group).is_err());
}

#[test]
fn inconsistent_history_is_reported() {
    let r = flaky();
    let fx = seed_slot(&r, 2);
    for _ in 0..2 {
        r.select_banner(fx.slot, fx.group).unwrap();
    }
    r.storage().hide_views_of(fx.banners[0]);

    let err = r.select_banner(fx.slot, fx.group).unwrap_err();
    assert_eq!(
        err.bandit_error(),
        Some(&BanditError::CandidateWithoutHistory(fx.banners[0]))
    );
    assert_eq!(err.status_code(), 500);
}

#[test]
fn empty_slot_is_not_found() {
    let r = rotator(1);
    let fx = seed_slot(&r, 0);

    let err = r.select_banner(fx.slot, fx.group).unwrap_err();
    assert_eq!(err.bandit_error(), Some(&BanditError::EmptyCandidateSet));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn duplicate_rotation_conflicts() {
    let r = rotator(1);
    let fx = seed_slot(&r, 1);

    let err = r.create_rotation(fx.slot, fx.banners[0]).unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.failure_stage(), FailureStage::NotApplied);
}
