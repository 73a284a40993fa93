//! Banner rotation with a UCB multi-armed bandit.
//!
//! A [`Rotator`] picks which banner to show in a slot, records the view,
//! and publishes a notification. Clicks recorded later steer future picks
//! through the [`Bandit`] scoring engine.

pub mod bandit;
pub mod bus;
pub mod config;
pub mod lock;
pub mod logger;
pub mod model;
pub mod request;
pub mod rotator;
pub mod storage;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "grpc")]
pub mod grpc;

pub use bandit::{Bandit, BanditError};
pub use bus::{InMemoryQueue, LogPublisher, Notification, PublishError, Publisher};
pub use config::{ConfigError, RotatorConfig};
pub use model::{Banner, BannerId, ClickEvent, EventKind, Group, GroupId, Slot, SlotId, ViewEvent};
pub use rotator::{FailureStage, Rotator, RotatorError};
pub use storage::{InMemoryStorage, Storage, StorageError};
