//! Notification bus - Event publishing abstractions
//!
//! Every recorded view or click is announced to downstream consumers
//! (statistics, billing) as a `Notification` wrapped in a bus `Event`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Rotator                              │
//! │  record view/click → Notification → Event (JSON payload)    │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Publisher + Subscriber Traits                  │
//! │  Publisher: publish(event) / publish_batch(events)          │
//! │  Subscriber: poll(timeout) / ack(id) / nack(id)             │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                     │
//!          ▼                  ▼                     ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────────────┐
//! │InMemoryQueue│    │LogPublisher │    │ RabbitMQ / Kafka    │
//! │ (included)  │    │ (included)  │    │    (external)       │
//! └─────────────┘    └─────────────┘    └─────────────────────┘
//! ```
//!
//! Delivery is at-least-once in intent; the rotator only checks the
//! immediate result of `publish`.

mod in_memory_queue;
mod log_publisher;
mod notification;
mod publisher;

pub use in_memory_queue::InMemoryQueue;
pub use log_publisher::LogPublisher;
pub use notification::Notification;
pub use publisher::{Event, PublishError, Publisher, Subscriber};
