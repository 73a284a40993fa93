//! Rotator - selection orchestration over storage, scoring, and the bus.
//!
//! For each `select_banner(slot, group)` request:
//!
//! 1. Ask storage for eligible banners never viewed in the slot. If any
//!    exist, pick one uniformly (forced exploration).
//! 2. Otherwise fetch the full candidate set and the slot's view and click
//!    history and let the scoring engine rank them (exploitation).
//! 3. Record a view for the chosen banner, then publish a `view`
//!    notification.
//!
//! Failures abort the request without retries. `RotatorError::failure_stage`
//! tells the caller whether no banner was chosen, the chosen banner was not
//! recorded, or the view was recorded but the notification was lost.
//! Administrative operations fail with `FailureStage::NotApplied`.
//!
//! ## Quick Start
//!
//! ```
//! use banner_rotator::bandit::Bandit;
//! use banner_rotator::bus::InMemoryQueue;
//! use banner_rotator::rotator::Rotator;
//! use banner_rotator::storage::InMemoryStorage;
//!
//! let rotator = Rotator::new(InMemoryStorage::new(), InMemoryQueue::new(), Bandit::with_seed(1));
//! let slot = rotator.create_slot("sidebar").unwrap();
//! let banner = rotator.create_banner("autumn sale").unwrap();
//! let group = rotator.create_group("returning visitors").unwrap();
//! rotator.create_rotation(slot.id, banner.id).unwrap();
//!
//! let shown = rotator.select_banner(slot.id, group.id).unwrap();
//! assert_eq!(shown, banner);
//! rotator.record_click(slot.id, shown.id, group.id).unwrap();
//! assert_eq!(rotator.publisher().event_types(), vec!["view", "click"]);
//! ```

mod error;
mod rotator;

pub use error::{FailureStage, RotatorError};
pub use rotator::Rotator;
