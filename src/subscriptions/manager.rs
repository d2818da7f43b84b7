//! Subscription store mirroring event sources into keyed state.

use crate::error::{HarnessError, Result};
use crate::events::{listen, EventSource, Listener, ListenerGuard};
use crate::types::{DisplayValue, RawEvent};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::types::{Snapshot, SubscriptionId, Transform};

/// Internal subscription state.
struct ActiveSubscription {
    id: SubscriptionId,
    event: String,
    /// Dropping the guard detaches the listener from its source.
    _guard: ListenerGuard,
}

struct StoreState {
    /// Latest value per key. Shared with snapshots; copied on write.
    values: Arc<BTreeMap<String, DisplayValue>>,
    revision: u64,
    /// Keys with an active subscription.
    active: HashMap<String, ActiveSubscription>,
}

struct StoreInner {
    state: Mutex<StoreState>,
    next_id: AtomicU64,
}

impl StoreInner {
    /// Apply one event for `key`. Only the currently active subscription
    /// for the key may write; anything else is a leftover delivery.
    fn on_event(&self, key: &str, id: SubscriptionId, transform: &Transform, raw: &RawEvent) {
        // Transforms run outside the lock so they may read the store.
        let value = match transform(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "dropping event, keeping previous value");
                return;
            }
        };

        let mut state = self.state.lock();
        match state.active.get(key) {
            Some(sub) if sub.id == id => {}
            _ => {
                tracing::trace!(key, "ignoring event for inactive subscription");
                return;
            }
        }

        Arc::make_mut(&mut state.values).insert(key.to_string(), value);
        state.revision += 1;
    }
}

/// Owns a fixed set of state keys and the subscriptions that feed them.
///
/// Each key is inactive or active. `subscribe` on an active key and
/// `unsubscribe` on an inactive key are no-ops. Dropping the store
/// releases every outstanding listener.
pub struct SubscriptionStore {
    inner: Arc<StoreInner>,
}

impl SubscriptionStore {
    /// Create a store whose keys all start out unset.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let values: BTreeMap<String, DisplayValue> = keys
            .into_iter()
            .map(|k| (k.into(), DisplayValue::Unset))
            .collect();

        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    values: Arc::new(values),
                    revision: 0,
                    active: HashMap::new(),
                }),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Start mirroring `event` from `source` into `key`.
    ///
    /// Returns `UnknownKey` if `key` was not declared when the store was
    /// built. Subscribing an already active key does nothing.
    pub fn subscribe<F>(
        &self,
        key: &str,
        source: Arc<dyn EventSource>,
        event: &str,
        transform: F,
    ) -> Result<()>
    where
        F: Fn(&RawEvent) -> Result<DisplayValue> + Send + Sync + 'static,
    {
        {
            let state = self.inner.state.lock();
            if !state.values.contains_key(key) {
                return Err(HarnessError::UnknownKey(key.to_string()));
            }
            if state.active.contains_key(key) {
                tracing::debug!(key, "already subscribed");
                return Ok(());
            }
        }

        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let listener = Self::make_listener(
            Arc::downgrade(&self.inner),
            key.to_string(),
            id,
            Arc::new(transform),
        );
        let source_name = source.name().to_string();
        let guard = listen(source, event, listener)?;

        let mut state = self.inner.state.lock();
        if state.active.contains_key(key) {
            // Another caller activated the key while we were registering.
            drop(state);
            drop(guard);
            return Ok(());
        }
        state.active.insert(
            key.to_string(),
            ActiveSubscription {
                id,
                event: event.to_string(),
                _guard: guard,
            },
        );
        drop(state);

        tracing::info!(key, source = %source_name, event, "subscribed");
        Ok(())
    }

    fn make_listener(
        inner: Weak<StoreInner>,
        key: String,
        id: SubscriptionId,
        transform: Transform,
    ) -> Listener {
        Arc::new(move |raw: &RawEvent| {
            if let Some(inner) = inner.upgrade() {
                inner.on_event(&key, id, &transform, raw);
            }
        })
    }

    /// Stop mirroring into `key`. Returns whether a subscription was removed.
    ///
    /// Once this returns no event can change `key`.
    pub fn unsubscribe(&self, key: &str) -> bool {
        let removed = self.inner.state.lock().active.remove(key);
        match removed {
            Some(sub) => {
                tracing::info!(key, event = %sub.event, "unsubscribed");
                // Detach outside the store lock.
                drop(sub);
                true
            }
            None => false,
        }
    }

    /// Unsubscribe every active key. Returns how many were removed.
    pub fn unsubscribe_all(&self) -> usize {
        let drained: Vec<ActiveSubscription> = {
            let mut state = self.inner.state.lock();
            std::mem::take(&mut state.active).into_values().collect()
        };
        let count = drained.len();
        drop(drained);

        if count > 0 {
            tracing::info!(count, "unsubscribed all");
        }
        count
    }

    /// Current state as an immutable copy.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.lock();
        Snapshot {
            values: Arc::clone(&state.values),
            revision: state.revision,
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.inner.state.lock().active.contains_key(key)
    }

    /// Keys with an active subscription, sorted.
    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state.lock().active.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Every key the store was built with.
    pub fn keys(&self) -> Vec<String> {
        self.inner.state.lock().values.keys().cloned().collect()
    }
}

impl Drop for SubscriptionStore {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl std::fmt::Debug for SubscriptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SubscriptionStore")
            .field("keys", &state.values.len())
            .field("active", &state.active.len())
            .field("revision", &state.revision)
            .finish()
    }
}
