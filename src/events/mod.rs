//! Push-style event sources.
//!
//! This module provides the listener side of the harness:
//! - The [`EventSource`] trait every SDK event emitter implements
//! - [`ListenerGuard`], a scoped listener registration
//! - [`EventEmitter`], an in-process emitter with synchronous dispatch
//! - [`EventBridge`], a bounded queue that moves events posted from other
//!   threads onto the single thread that pumps it
//!
//! # Example
//!
//! ```ignore
//! let emitter = Arc::new(EventEmitter::new("beacons"));
//! let guard = listen(emitter.clone(), "BeaconSighting", Arc::new(|event| {
//!     println!("sighting: {}", event);
//! }));
//!
//! emitter.emit("BeaconSighting", &json!({"rssi": -67, "timeInMillis": 1000}));
//! drop(guard); // listener removed
//! ```

mod bridge;
mod emitter;

pub use bridge::{BridgeSender, EventBridge, PostedEvent};
pub use emitter::EventEmitter;

use crate::error::Result;
use crate::types::RawEvent;
use std::sync::Arc;

/// Callback invoked for every event a listener is registered for.
pub type Listener = Arc<dyn Fn(&RawEvent) + Send + Sync>;

/// Identifier of one listener registration within a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// An external collaborator that emits named events.
///
/// Implementations must not invoke listeners while holding any lock that
/// `add_listener` or `remove_listener` also take.
pub trait EventSource: Send + Sync {
    /// Name used for routing and logging.
    fn name(&self) -> &str;

    /// Register `listener` for `event`.
    fn add_listener(&self, event: &str, listener: Listener) -> Result<ListenerId>;

    /// Remove a registration. Events emitted after this returns do not reach
    /// the listener; a dispatch already in flight may. Unknown ids are
    /// ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Scoped listener registration. Dropping it removes the listener.
pub struct ListenerGuard {
    source: Arc<dyn EventSource>,
    event: String,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.source.remove_listener(self.id);
        tracing::debug!(
            source = self.source.name(),
            event = %self.event,
            "listener removed"
        );
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("source", &self.source.name())
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

/// Register `listener` on `source` and return a guard that owns the
/// registration.
pub fn listen(
    source: Arc<dyn EventSource>,
    event: &str,
    listener: Listener,
) -> Result<ListenerGuard> {
    let id = source.add_listener(event, listener)?;
    tracing::debug!(source = source.name(), event, "listener added");
    Ok(ListenerGuard {
        source,
        event: event.to_string(),
        id,
    })
}
