//! Transport-neutral request types and their validation.
//!
//! The rotator core assumes strictly positive identifiers and non-empty
//! descriptions; transports check that here before calling it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BannerId, GroupId, SlotId};

/// A request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad request: {0}")]
pub struct InvalidRequest(pub &'static str);

fn positive<T: From<i64>>(raw: i64, what: &'static str) -> Result<T, InvalidRequest> {
    if raw > 0 {
        Ok(T::from(raw))
    } else {
        Err(InvalidRequest(what))
    }
}

/// Body of slot, banner and group creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
}

impl DescriptionRequest {
    pub fn validate(&self) -> Result<&str, InvalidRequest> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(InvalidRequest("incorrect description"));
        }
        Ok(description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRequest {
    pub slot_id: i64,
    pub banner_id: i64,
}

impl RotationRequest {
    pub fn validate(&self) -> Result<(SlotId, BannerId), InvalidRequest> {
        Ok((
            positive(self.slot_id, "incorrect slot id")?,
            positive(self.banner_id, "incorrect banner id")?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRequest {
    pub slot_id: i64,
    pub banner_id: i64,
    pub group_id: i64,
}

impl ClickRequest {
    pub fn validate(&self) -> Result<(SlotId, BannerId, GroupId), InvalidRequest> {
        Ok((
            positive(self.slot_id, "incorrect slot id")?,
            positive(self.banner_id, "incorrect banner id")?,
            positive(self.group_id, "incorrect group id")?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub slot_id: i64,
    pub group_id: i64,
}

impl SelectionRequest {
    pub fn validate(&self) -> Result<(SlotId, GroupId), InvalidRequest> {
        Ok((
            positive(self.slot_id, "incorrect slot id")?,
            positive(self.group_id, "incorrect group id")?,
        ))
    }
}
