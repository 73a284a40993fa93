//! Models - Entities and append-only events of the rotation domain.
//!
//! Entities (`Slot`, `Banner`, `Group`) are immutable once created and owned
//! by the storage layer. `Rotation` links a banner to a slot and is the only
//! source of a slot's candidate set. `ViewEvent` and `ClickEvent` are
//! append-only facts; they are never updated or deleted.
//!
//! ## Example
//!
//! ```
//! use banner_rotator::model::{BannerId, GroupId, SlotId, ViewEvent};
//!
//! let view = ViewEvent::now(SlotId::new(1), BannerId::new(7), GroupId::new(2));
//! assert_eq!(view.banner_id, BannerId::new(7));
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }

            /// Identifiers handed out by storage are strictly positive.
            pub const fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identity of a display slot.
    SlotId
);
id_type!(
    /// Identity of a banner.
    BannerId
);
id_type!(
    /// Identity of a viewer group.
    GroupId
);

/// A placement that can host zero or more banners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub description: String,
}

/// A creative that can be rotated through slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub description: String,
}

/// A viewer segment. Only tags events; scoring is not partitioned by group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub description: String,
}

/// States that a banner is currently eligible for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rotation {
    pub slot_id: SlotId,
    pub banner_id: BannerId,
}

impl Rotation {
    pub fn new(slot_id: SlotId, banner_id: BannerId) -> Self {
        Self { slot_id, banner_id }
    }
}

/// Kind of feedback event, also the notification type on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    View,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Click => "click",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded every time a banner is shown in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub slot_id: SlotId,
    pub banner_id: BannerId,
    pub group_id: GroupId,
    pub date: DateTime<Utc>,
}

impl ViewEvent {
    pub fn new(slot_id: SlotId, banner_id: BannerId, group_id: GroupId, date: DateTime<Utc>) -> Self {
        Self {
            slot_id,
            banner_id,
            group_id,
            date,
        }
    }

    pub fn now(slot_id: SlotId, banner_id: BannerId, group_id: GroupId) -> Self {
        Self::new(slot_id, banner_id, group_id, Utc::now())
    }
}

/// Recorded every time a shown banner is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub slot_id: SlotId,
    pub banner_id: BannerId,
    pub group_id: GroupId,
    pub date: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(slot_id: SlotId, banner_id: BannerId, group_id: GroupId, date: DateTime<Utc>) -> Self {
        Self {
            slot_id,
            banner_id,
            group_id,
            date,
        }
    }

    pub fn now(slot_id: SlotId, banner_id: BannerId, group_id: GroupId) -> Self {
        Self::new(slot_id, banner_id, group_id, Utc::now())
    }
}

/// Anything that is attributed to a single banner. Lets the scoring engine
/// aggregate views and clicks with one routine.
pub trait BannerEvent {
    fn banner_id(&self) -> BannerId;
}

impl BannerEvent for ViewEvent {
    fn banner_id(&self) -> BannerId {
        self.banner_id
    }
}

impl BannerEvent for ClickEvent {
    fn banner_id(&self) -> BannerId {
        self.banner_id
    }
}
