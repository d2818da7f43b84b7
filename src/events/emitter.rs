//! In-process event emitter with synchronous dispatch.

use crate::error::Result;
use crate::types::RawEvent;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{EventSource, Listener, ListenerId};

/// Internal registration state.
struct Registration {
    event: String,
    listener: Listener,
}

/// Emits named events to registered listeners.
///
/// Dispatch happens on the caller's thread, in registration order. The
/// listener table lock is released before any listener runs, so listeners
/// may add or remove registrations on the same emitter.
pub struct EventEmitter {
    name: String,
    /// Registrations keyed by id; ids are monotonic so iteration order is
    /// registration order.
    listeners: RwLock<BTreeMap<ListenerId, Registration>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Deliver `payload` to every listener registered for `event`.
    ///
    /// Returns how many listeners were invoked.
    pub fn emit(&self, event: &str, payload: &RawEvent) -> usize {
        let targets: Vec<Listener> = {
            let listeners = self.listeners.read();
            listeners
                .values()
                .filter(|r| r.event == event)
                .map(|r| r.listener.clone())
                .collect()
        };

        tracing::trace!(source = %self.name, event, listeners = targets.len(), "emit");

        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .values()
            .filter(|r| r.event == event)
            .count()
    }

    /// Number of listeners across all events.
    pub fn total_listeners(&self) -> usize {
        self.listeners.read().len()
    }
}

impl EventSource for EventEmitter {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_listener(&self, event: &str, listener: Listener) -> Result<ListenerId> {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().insert(
            id,
            Registration {
                event: event.to_string(),
                listener,
            },
        );
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.write().remove(&id);
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("name", &self.name)
            .field("listeners", &self.total_listeners())
            .finish()
    }
}
