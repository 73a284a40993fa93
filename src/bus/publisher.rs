//! Core publisher traits for the notification bus.

use std::error::Error as StdError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// An event envelope as handed to the bus.
#[derive(Clone, Debug)]
pub struct Event {
    /// Unique identifier for this event
    pub id: String,
    /// Event type (`"view"` or `"click"` for rotator notifications)
    pub event_type: String,
    /// Serialized payload
    pub payload: Vec<u8>,
    /// Optional metadata (headers, content type, ...)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Event {
    /// Create a new event with the given type and payload.
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create an event with a JSON payload.
    pub fn encode<T: Serialize>(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(Self::new(id, event_type, bytes).with_metadata("content-type", "application/json"))
    }

    /// Decode a JSON payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PublishError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Create an event with a string payload.
    pub fn with_string_payload(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(id, event_type, payload.into().into_bytes())
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Error type for bus operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection to the broker failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Serialization of the payload failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    /// The broker rejected the event
    #[error("event rejected: {0}")]
    Rejected(String),
    /// Timeout waiting for acknowledgment
    #[error("publish timeout")]
    Timeout,
    /// A local buffer or queue lock was poisoned
    #[error("bus lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// Other error
    #[error("publish error: {0}")]
    Other(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::SerializationFailed(err.to_string())
    }
}

/// Trait for publishing events to a message bus.
///
/// Implementations might include:
/// - `InMemoryQueue` - For testing and single-process scenarios
/// - `LogPublisher` - Emits events through `tracing`
/// - `RabbitMqPublisher` - For RabbitMQ (external)
/// - `KafkaPublisher` - For Apache Kafka (external)
pub trait Publisher: Send + Sync {
    /// Publish a single event to the bus.
    fn publish(&self, event: Event) -> Result<(), PublishError>;

    /// Publish multiple events to the bus.
    ///
    /// Default implementation publishes events sequentially.
    fn publish_batch(&self, events: Vec<Event>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event)?;
        }
        Ok(())
    }
}

/// Trait for consuming events from a message bus.
///
/// Pull-based; downstream consumers of rotator notifications poll, process,
/// then ack.
pub trait Subscriber: Send + Sync {
    /// Poll for the next event, blocking until one is available or timeout.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError>;

    /// Acknowledge that an event has been processed.
    fn ack(&self, event_id: &str) -> Result<(), PublishError>;

    /// Reject an event (will be redelivered or sent to dead letter queue).
    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError>;
}
