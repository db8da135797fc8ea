//! Log ingestion: solver log events into store log lines.
//!
//! The pipeline must be attached by the owning scope before any run can be
//! started. The bus does not replay, so a late attach loses the first events.

use crate::bus::{EventBus, Subscription, SIMULATION_LOG};
use crate::particle_log;
use crate::store::{Action, Store};

#[derive(Debug)]
pub struct LogPipeline {
    subscription: Option<Subscription>,
}

impl LogPipeline {
    /// Subscribe to the simulation log topic.
    pub fn attach(bus: &EventBus) -> Self {
        log::info!("Log pipeline attached to {SIMULATION_LOG}");
        Self {
            subscription: Some(bus.subscribe(SIMULATION_LOG)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Move every queued event into the store, in arrival order.
    ///
    /// Returns the number of lines appended. Payloads that match no known
    /// entry kind are skipped with a warning.
    pub fn pump(&mut self, store: &mut Store) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };

        let mut appended = 0;
        for payload in subscription.drain() {
            match particle_log::normalize(&payload) {
                Ok(line) => {
                    store.dispatch(Action::AppendLog(line));
                    appended += 1;
                }
                Err(err) => log::warn!("Skipping log event: {err}"),
            }
        }
        appended
    }

    /// Unsubscribe. Safe to call repeatedly; also runs on drop.
    pub fn detach(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
            log::info!("Log pipeline detached from {SIMULATION_LOG}");
        }
    }
}

impl Drop for LogPipeline {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bad_payload_is_skipped() {
        let bus = EventBus::new();
        let mut store = Store::new();
        let mut pipeline = LogPipeline::attach(&bus);

        bus.emit(SIMULATION_LOG, &json!({ "kind": "Bogus" })).unwrap();
        bus.emit(SIMULATION_LOG, &json!({ "kind": "LogInfo", "data": "ok" }))
            .unwrap();

        assert_eq!(pipeline.pump(&mut store), 1);
        assert_eq!(store.runtime().log, vec!["[Info] ok".to_string()]);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let bus = EventBus::new();
        let mut pipeline = LogPipeline::attach(&bus);
        assert_eq!(bus.subscriber_count(SIMULATION_LOG), 1);

        pipeline.detach();
        pipeline.detach();
        assert!(!pipeline.is_attached());
        assert_eq!(bus.subscriber_count(SIMULATION_LOG), 0);

        let mut store = Store::new();
        assert_eq!(pipeline.pump(&mut store), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        {
            let _pipeline = LogPipeline::attach(&bus);
            assert_eq!(bus.subscriber_count(SIMULATION_LOG), 1);
        }
        assert_eq!(bus.subscriber_count(SIMULATION_LOG), 0);
    }
}
