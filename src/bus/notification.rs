//! View/click notifications published after an event is recorded.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Event, PublishError};
use crate::model::{BannerId, EventKind, GroupId, SlotId};

/// Queue message describing one recorded view or click.
///
/// Serialized as
/// `{"type":"view","slotId":1,"bannerId":2,"groupId":3,"date":1700000000}`
/// with `date` in unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub slot_id: SlotId,
    pub banner_id: BannerId,
    pub group_id: GroupId,
    pub date: i64,
}

impl Notification {
    pub fn new(
        kind: EventKind,
        slot_id: SlotId,
        banner_id: BannerId,
        group_id: GroupId,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            slot_id,
            banner_id,
            group_id,
            date: date.timestamp(),
        }
    }

    /// Timestamp as a `DateTime`, if representable.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.date, 0).single()
    }

    /// Wrap in a bus envelope with a fresh id.
    pub fn to_event(&self) -> Result<Event, PublishError> {
        Event::encode(Uuid::new_v4().to_string(), self.kind.as_str(), self)
    }

    /// Read a notification back out of a bus envelope.
    pub fn from_event(event: &Event) -> Result<Self, PublishError> {
        event.decode()
    }
}
