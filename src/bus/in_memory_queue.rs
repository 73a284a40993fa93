//! In-memory queue for testing and single-process scenarios.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::{Event, Notification, PublishError, Publisher, Subscriber};

/// Thread-safe in-memory queue implementing both `Publisher` and `Subscriber`.
///
/// Events are stored in an append-only log; every subscriber created with
/// `new_subscriber()` tracks its own read position over the shared log.
///
/// ## Example
///
/// ```
/// use banner_rotator::bus::{Event, InMemoryQueue, Publisher, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Event::with_string_payload("evt-1", "view", "{}")).unwrap();
///
/// let consumer = queue.new_subscriber();
/// let event = consumer.poll(100).unwrap().unwrap();
/// assert_eq!(event.event_type, "view");
/// consumer.ack(&event.id).unwrap();
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    /// Shared event log
    log: Arc<RwLock<Vec<Event>>>,
    /// Per-subscriber read position
    position: Arc<Mutex<usize>>,
    /// Acknowledged event IDs
    acked: Arc<Mutex<Vec<String>>>,
    /// Rejected event IDs with reasons
    nacked: Arc<Mutex<Vec<(String, String)>>>,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            position: Arc::new(Mutex::new(0)),
            acked: Arc::new(Mutex::new(Vec::new())),
            nacked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a new subscriber that shares the same log but has its own position.
    pub fn new_subscriber(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            position: Arc::new(Mutex::new(0)),
            acked: Arc::new(Mutex::new(Vec::new())),
            nacked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // Inspection helpers below only read the log; a poisoned lock still
    // holds a valid Vec.

    /// Get all events in the log.
    pub fn events(&self) -> Vec<Event> {
        self.log.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Get all event types in order.
    pub fn event_types(&self) -> Vec<String> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    /// Decode every event in the log as a rotator notification, skipping
    /// foreign payloads.
    pub fn notifications(&self) -> Vec<Notification> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|e| Notification::from_event(e).ok())
            .collect()
    }

    /// Get the total number of events in the log.
    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find all events matching a type.
    pub fn find_all_by_type(&self, event_type: &str) -> Vec<Event> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Get the current subscriber position.
    pub fn current_position(&self) -> usize {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get acknowledged event IDs.
    pub fn acknowledged(&self) -> Vec<String> {
        self.acked.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Get rejected event IDs with their reasons.
    pub fn rejected(&self) -> Vec<(String, String)> {
        self.nacked.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish"))?
            .push(event);
        Ok(())
    }

    fn publish_batch(&self, events: Vec<Event>) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish_batch"))?
            .extend(events);
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            {
                let log = self.log.read().map_err(|_| PublishError::LockPoisoned("poll"))?;
                let mut pos = self
                    .position
                    .lock()
                    .map_err(|_| PublishError::LockPoisoned("poll"))?;

                if *pos < log.len() {
                    let event = log[*pos].clone();
                    *pos += 1;
                    return Ok(Some(event));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, event_id: &str) -> Result<(), PublishError> {
        self.acked
            .lock()
            .map_err(|_| PublishError::LockPoisoned("ack"))?
            .push(event_id.to_string());
        Ok(())
    }

    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError> {
        // No redelivery; the event stays in the log and the rejection is kept
        // for inspection.
        self.nacked
            .lock()
            .map_err(|_| PublishError::LockPoisoned("nack"))?
            .push((event_id.to_string(), reason.to_string()));
        Ok(())
    }
}
