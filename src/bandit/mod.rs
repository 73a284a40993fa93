//! Scoring engine - UCB1-style banner selection.
//!
//! The engine is stateless with respect to the domain: every call receives
//! the full candidate set and history and returns a choice. The only state an
//! instance owns is its random source, which is seedable so selections can be
//! reproduced in tests.
//!
//! ## Selection
//!
//! - `uniform_pick` chooses one candidate with probability `1/n`. Used for
//!   forced exploration and for breaking ties.
//! - `ranked_pick` scores each candidate as
//!   `ctr + sqrt(2 * ln(N) / views)` where `N` is the number of click events
//!   in the slot, then picks uniformly among the candidates sharing the
//!   maximum score.
//!
//! `N` is clamped to at least 1. With no clicks in the slot the exploration
//! term is therefore 0, every candidate scores its click rate (0), and the
//! choice is uniform over all candidates.
//!
//! ## Example
//!
//! ```
//! use banner_rotator::bandit::Bandit;
//! use banner_rotator::model::{Banner, BannerId, ClickEvent, GroupId, SlotId, ViewEvent};
//!
//! let slot = SlotId::new(1);
//! let group = GroupId::new(1);
//! let banners: Vec<Banner> = (1..=2)
//!     .map(|id| Banner { id: BannerId::new(id), description: format!("banner {id}") })
//!     .collect();
//! let views: Vec<ViewEvent> = banners
//!     .iter()
//!     .map(|b| ViewEvent::now(slot, b.id, group))
//!     .collect();
//! let clicks = vec![ClickEvent::now(slot, BannerId::new(2), group)];
//!
//! let bandit = Bandit::with_seed(7);
//! let chosen = bandit.ranked_pick(&banners, &views, &clicks).unwrap();
//! assert_eq!(chosen.id, BannerId::new(2));
//! ```

mod engine;
mod error;

pub use engine::{score, Bandit};
pub use error::BanditError;
