//! Explore-then-exploit behavior end to end.

use std::collections::BTreeSet;

use banner_rotator::model::{BannerId, EventKind};
use banner_rotator::storage::Storage;

use crate::support::{rotator, seed_slot};

#[test]
fn first_selections_explore_every_banner_once() {
    let r = rotator(7);
    let fx = seed_slot(&r, 3);

    let explored: BTreeSet<BannerId> = (0..3)
        .map(|_| r.select_banner(fx.slot, fx.group).unwrap().id)
        .collect();
    assert_eq!(explored, fx.banners.iter().copied().collect());

    // Ranking takes over once every banner has a view.
    let fourth = r.select_banner(fx.slot, fx.group).unwrap();
    assert!(fx.banners.contains(&fourth.id));
    let total: usize = fx
        .banners
        .iter()
        .map(|b| r.storage().view_count(fx.slot, *b).unwrap())
        .sum();
    assert_eq!(total, 4);
}

#[test]
fn newly_rotated_banner_is_explored_next() {
    let r = rotator(3);
    let fx = seed_slot(&r, 2);
    for _ in 0..5 {
        r.select_banner(fx.slot, fx.group).unwrap();
    }

    let fresh = r.create_banner("fresh").unwrap();
    r.create_rotation(fx.slot, fresh.id).unwrap();

    assert_eq!(r.select_banner(fx.slot, fx.group).unwrap().id, fresh.id);
}

#[test]
fn removed_banner_is_never_selected() {
    let r = rotator(11);
    let fx = seed_slot(&r, 3);
    for _ in 0..3 {
        r.select_banner(fx.slot, fx.group).unwrap();
    }
    let removed = fx.banners[1];
    // Give it a huge click-through rate so ranking would otherwise favor it.
    for _ in 0..20 {
        r.record_click(fx.slot, removed, fx.group).unwrap();
    }
    r.delete_rotation(fx.slot, removed).unwrap();

    for _ in 0..50 {
        assert_ne!(r.select_banner(fx.slot, fx.group).unwrap().id, removed);
    }
}

#[test]
fn clicks_steer_ranking() {
    let r = rotator(5);
    let fx = seed_slot(&r, 3);
    for _ in 0..3 {
        r.select_banner(fx.slot, fx.group).unwrap();
    }

    let favorite = fx.banners[2];
    for _ in 0..5 {
        r.record_click(fx.slot, favorite, fx.group).unwrap();
    }

    // 5 clicks on 1 view outscore the bare exploration bonus of the others
    // for the next several picks.
    for _ in 0..4 {
        assert_eq!(r.select_banner(fx.slot, fx.group).unwrap().id, favorite);
    }
}

#[test]
fn every_selection_is_recorded_and_notified() {
    let r = rotator(9);
    let fx = seed_slot(&r, 2);

    let picked: Vec<BannerId> = (0..6)
        .map(|_| r.select_banner(fx.slot, fx.group).unwrap().id)
        .collect();

    let notifications = r.publisher().notifications();
    assert_eq!(notifications.len(), 6);
    for (notification, banner) in notifications.iter().zip(&picked) {
        assert_eq!(notification.kind, EventKind::View);
        assert_eq!(notification.slot_id, fx.slot);
        assert_eq!(notification.group_id, fx.group);
        assert_eq!(notification.banner_id, *banner);
    }
    assert_eq!(r.storage().view_history(fx.slot).unwrap().len(), 6);
}

#[test]
fn no_clicks_still_selects_eligible_banners() {
    let r = rotator(13);
    let fx = seed_slot(&r, 4);
    for _ in 0..40 {
        let banner = r.select_banner(fx.slot, fx.group).unwrap();
        assert!(fx.banners.contains(&banner.id));
    }
}

#[test]
fn same_seed_same_choices() {
    let run = |seed| {
        let r = rotator(seed);
        let fx = seed_slot(&r, 4);
        r.record_click(fx.slot, fx.banners[0], fx.group).unwrap();
        (0..30)
            .map(|_| r.select_banner(fx.slot, fx.group).unwrap().id)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(21), run(21));
}
