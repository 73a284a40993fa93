//! Selections racing on one slot.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use banner_rotator::model::{BannerId, GroupId, SlotId};
use banner_rotator::storage::Storage;

use crate::support::{rotator, seed_slot};

#[test]
fn slot_locking_explores_distinct_banners() {
    let r = Arc::new(rotator(17).with_slot_locking(true));
    let fx = seed_slot(&r, 8);
    let (slot, group) = (fx.slot, fx.group);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let r = Arc::clone(&r);
            thread::spawn(move || r.select_banner(slot, group).unwrap().id)
        })
        .collect();
    let picked: BTreeSet<BannerId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(picked, fx.banners.iter().copied().collect());
}

#[test]
fn concurrent_selections_are_all_recorded() {
    let r = Arc::new(rotator(19));
    let fx = seed_slot(&r, 3);
    let (slot, group) = (fx.slot, fx.group);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let r = Arc::clone(&r);
            thread::spawn(move || {
                for _ in 0..25 {
                    r.select_banner(slot, group).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(r.storage().view_history(fx.slot).unwrap().len(), 100);
    assert_eq!(r.publisher().len(), 100);
}

#[test]
fn unknown_slots_leave_no_locks_behind() {
    let r = rotator(23).with_slot_locking(true);
    let group = GroupId::new(1);

    for id in 1_000..2_000 {
        assert!(r.select_banner(SlotId::new(id), group).is_err());
    }

    assert!(r.slot_locks().unwrap().is_empty());
}
