//! In-process publish/subscribe bus for solver events.
//!
//! Topics are plain strings. Payloads travel as JSON values so the solver
//! side and the editor side agree only on the wire shape. There is no replay:
//! an event emitted on a topic with no subscribers is dropped.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::error::BusError;

/// Log events from the solver (`LogEntry` payloads).
pub const SIMULATION_LOG: &str = "terra://simulation-log";
/// Cancellation request for the running solver (no payload).
pub const SIMULATION_STOP: &str = "terra://simulation-stop-event";
/// Terminal completion signal (`RunFinished` payload).
pub const SIMULATION_FINISHED: &str = "terra://simulation-finished";

#[derive(Default)]
struct Hub {
    next_id: u64,
    senders: Vec<(u64, Sender<Value>)>,
}

type Topics = HashMap<String, Hub>;

/// Cheaply cloneable handle to a shared bus.
#[derive(Clone, Default)]
pub struct EventBus {
    topics: Arc<Mutex<Topics>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `payload` to every current subscriber of `topic`.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn emit<P: Serialize + ?Sized>(&self, topic: &str, payload: &P) -> Result<usize, BusError> {
        let value = serde_json::to_value(payload).map_err(|source| BusError::Encode {
            topic: topic.to_string(),
            source,
        })?;

        let mut topics = self.topics.lock();
        let Some(hub) = topics.get_mut(topic) else {
            log::trace!("Dropped event on {topic}: no subscribers");
            return Ok(0);
        };

        // Receivers dropped without close() are pruned here.
        hub.senders.retain(|(_, tx)| tx.send(value.clone()).is_ok());
        let delivered = hub.senders.len();
        if delivered == 0 {
            log::trace!("Dropped event on {topic}: no subscribers");
        }
        Ok(delivered)
    }

    pub fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut topics = self.topics.lock();
        let hub = topics.entry(topic.to_string()).or_default();
        let id = hub.next_id;
        hub.next_id += 1;
        hub.senders.push((id, tx));
        log::debug!("Subscribed to {topic} (id {id})");

        Subscription {
            topic: topic.to_string(),
            id,
            rx,
            bus: Arc::downgrade(&self.topics),
            closed: false,
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map_or(0, |hub| hub.senders.len())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.topics.lock();
        f.debug_map()
            .entries(topics.iter().map(|(topic, hub)| (topic, hub.senders.len())))
            .finish()
    }
}

/// A live subscription to one topic.
///
/// Detaches from the bus on [`close`](Self::close) or on drop, whichever
/// comes first. Events already queued stay readable after closing.
pub struct Subscription {
    topic: String,
    id: u64,
    rx: Receiver<Value>,
    bus: Weak<Mutex<Topics>>,
    closed: bool,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn try_recv(&self) -> Option<Value> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Value> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Take everything queued so far.
    pub fn drain(&self) -> Vec<Value> {
        self.rx.try_iter().collect()
    }

    /// Detach from the bus. Calling this more than once is harmless.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let Some(topics) = self.bus.upgrade() else {
            return;
        };
        let mut topics = topics.lock();
        if let Some(hub) = topics.get_mut(&self.topic) {
            hub.senders.retain(|(id, _)| *id != self.id);
            log::debug!("Unsubscribed from {} (id {})", self.topic, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(SIMULATION_LOG, &json!("early")).unwrap(), 0);

        let sub = bus.subscribe(SIMULATION_LOG);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_delivers_in_emission_order() {
        let bus = EventBus::new();
        let sub = bus.subscribe(SIMULATION_LOG);
        for i in 0..5 {
            bus.emit(SIMULATION_LOG, &i).unwrap();
        }
        assert_eq!(sub.drain(), (0..5).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_close_and_drop_detach() {
        let bus = EventBus::new();
        let mut a = bus.subscribe(SIMULATION_STOP);
        let b = bus.subscribe(SIMULATION_STOP);
        assert_eq!(bus.subscriber_count(SIMULATION_STOP), 2);

        a.close();
        a.close();
        assert_eq!(bus.subscriber_count(SIMULATION_STOP), 1);

        drop(b);
        assert_eq!(bus.subscriber_count(SIMULATION_STOP), 0);
        drop(a);
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = EventBus::new();
        let log = bus.subscribe(SIMULATION_LOG);
        assert_eq!(bus.emit(SIMULATION_STOP, &()).unwrap(), 0);
        assert!(log.try_recv().is_none());
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = EventBus::new();
        let sub = bus.subscribe(SIMULATION_FINISHED);
        let other = bus.clone();
        assert_eq!(other.emit(SIMULATION_FINISHED, &json!({"run_id": 1})).unwrap(), 1);
        assert_eq!(sub.try_recv(), Some(json!({"run_id": 1})));
    }
}
