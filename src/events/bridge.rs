//! Bounded hand-off from native threads to the event loop.

use crate::error::{HarnessError, Result};
use crate::types::RawEvent;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{EventEmitter, EventSource};

/// An event waiting to be dispatched.
#[derive(Clone, Debug)]
pub struct PostedEvent {
    /// Name of the emitter that should dispatch it.
    pub source: String,
    pub event: String,
    pub payload: RawEvent,
}

/// Producer side of the bridge. Cheap to clone, one per native thread.
#[derive(Clone)]
pub struct BridgeSender {
    sender: Sender<PostedEvent>,
    capacity: usize,
}

impl BridgeSender {
    /// Queue an event for dispatch. Never blocks.
    pub fn post(
        &self,
        source: impl Into<String>,
        event: impl Into<String>,
        payload: RawEvent,
    ) -> Result<()> {
        let posted = PostedEvent {
            source: source.into(),
            event: event.into(),
            payload,
        };
        match self.sender.try_send(posted) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    source = %dropped.source,
                    event = %dropped.event,
                    capacity = self.capacity,
                    "event bridge full, dropping event"
                );
                Err(HarnessError::BridgeFull(self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => Err(HarnessError::BridgeClosed),
        }
    }
}

/// Moves events posted from any thread onto whichever thread calls
/// [`EventBridge::pump`], then dispatches them through the registered
/// emitters one at a time.
pub struct EventBridge {
    sender: Sender<PostedEvent>,
    receiver: Receiver<PostedEvent>,
    capacity: usize,
    emitters: RwLock<HashMap<String, Arc<EventEmitter>>>,
}

impl EventBridge {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            emitters: RwLock::new(HashMap::new()),
        }
    }

    /// Route events addressed to `emitter.name()` through `emitter`.
    pub fn register(&self, emitter: Arc<EventEmitter>) {
        let name = emitter.name().to_string();
        tracing::debug!(source = %name, "bridge route registered");
        self.emitters.write().insert(name, emitter);
    }

    pub fn sender(&self) -> BridgeSender {
        BridgeSender {
            sender: self.sender.clone(),
            capacity: self.capacity,
        }
    }

    /// Number of events waiting to be pumped.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Dispatch every queued event without blocking.
    ///
    /// Returns how many events were taken off the queue.
    pub fn pump(&self) -> usize {
        let mut processed = 0;
        while let Ok(posted) = self.receiver.try_recv() {
            self.dispatch(posted);
            processed += 1;
        }
        processed
    }

    /// Wait up to `timeout` for the first event, then drain the queue.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(posted) => {
                self.dispatch(posted);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn dispatch(&self, posted: PostedEvent) {
        let emitter = self.emitters.read().get(&posted.source).cloned();
        match emitter {
            Some(emitter) => {
                emitter.emit(&posted.event, &posted.payload);
            }
            None => {
                tracing::warn!(
                    source = %posted.source,
                    event = %posted.event,
                    "no emitter registered for bridged event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::thread;

    fn counting_emitter(name: &str, event: &str) -> (Arc<EventEmitter>, Arc<Mutex<Vec<RawEvent>>>) {
        let emitter = Arc::new(EventEmitter::new(name));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        emitter
            .add_listener(event, Arc::new(move |e: &RawEvent| sink.lock().push(e.clone())))
            .unwrap();
        (emitter, seen)
    }

    #[test]
    fn test_pump_dispatches_in_post_order() {
        let bridge = EventBridge::new(16);
        let (emitter, seen) = counting_emitter("beacons", "BeaconSighting");
        bridge.register(emitter);

        let sender = bridge.sender();
        for rssi in [-60, -61, -62] {
            sender
                .post("beacons", "BeaconSighting", json!({ "rssi": rssi }))
                .unwrap();
        }

        // Nothing is delivered until the loop pumps.
        assert!(seen.lock().is_empty());
        assert_eq!(bridge.pending(), 3);

        assert_eq!(bridge.pump(), 3);
        let rssis: Vec<i64> = seen.lock().iter().map(|e| e["rssi"].as_i64().unwrap()).collect();
        assert_eq!(rssis, vec![-60, -61, -62]);
    }

    #[test]
    fn test_full_bridge_rejects() {
        let bridge = EventBridge::new(1);
        let sender = bridge.sender();

        sender.post("beacons", "BeaconSighting", json!({})).unwrap();
        let result = sender.post("beacons", "BeaconSighting", json!({}));
        assert!(matches!(result, Err(HarnessError::BridgeFull(1))));
    }

    #[test]
    fn test_closed_bridge_rejects() {
        let bridge = EventBridge::new(4);
        let sender = bridge.sender();
        drop(bridge);

        let result = sender.post("beacons", "BeaconSighting", json!({}));
        assert!(matches!(result, Err(HarnessError::BridgeClosed)));
    }

    #[test]
    fn test_unrouted_events_are_dropped() {
        let bridge = EventBridge::new(4);
        bridge.sender().post("nobody", "Anything", json!(1)).unwrap();
        assert_eq!(bridge.pump(), 1);
        assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn test_posts_from_other_threads() {
        let bridge = EventBridge::new(64);
        let (emitter, seen) = counting_emitter("places", "VisitStart");
        bridge.register(emitter);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = bridge.sender();
                thread::spawn(move || {
                    for j in 0..5 {
                        sender
                            .post("places", "VisitStart", json!({ "visitId": format!("{}-{}", i, j) }))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bridge.pump_timeout(Duration::from_millis(100)), 20);
        assert_eq!(seen.lock().len(), 20);
    }
}
