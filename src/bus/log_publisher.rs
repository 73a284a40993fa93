use std::sync::{Arc, Mutex};

use super::{Event, PublishError, Publisher};

/// A publisher that writes events to the `tracing` log or a buffer.
///
/// Used when no broker is configured; downstream consumers can tail the
/// `banner_rotator::notifications` target and filter on the `queue` field.
#[derive(Clone)]
pub struct LogPublisher {
    queue: String,
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPublisher {
    pub const DEFAULT_QUEUE: &'static str = "rotator";

    pub fn new() -> Self {
        Self::for_queue(Self::DEFAULT_QUEUE)
    }

    /// Tag every notification with the queue it stands in for.
    pub fn for_queue(queue: impl Into<String>) -> Self {
        LogPublisher {
            queue: queue.into(),
            buffer: None,
        }
    }

    pub fn with_buffer(mut self, buffer: Arc<Mutex<Vec<String>>>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

impl Publisher for LogPublisher {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        let payload = String::from_utf8_lossy(&event.payload);
        match &self.buffer {
            Some(buffer) => {
                let line = format!(
                    "{} [{}] {} {}",
                    self.queue, event.event_type, event.id, payload
                );
                buffer
                    .lock()
                    .map_err(|_| PublishError::LockPoisoned("log publish"))?
                    .push(line);
            }
            None => {
                tracing::info!(
                    target: "banner_rotator::notifications",
                    queue = %self.queue,
                    id = %event.id,
                    event_type = %event.event_type,
                    payload = %payload,
                    "notification"
                );
            }
        }
        Ok(())
    }
}
