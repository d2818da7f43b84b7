//! Subscription store for mirroring event sources into observable state.
//!
//! The store owns a fixed set of keys. Each key can be fed by at most one
//! subscription at a time; every event the subscription receives is run
//! through its transform and the result replaces the key's value.
//!
//! Guarantees:
//! - A malformed event is logged and dropped; the previous value stays
//! - After `unsubscribe` returns, no event can change the key
//! - Readers only ever see immutable snapshots
//!
//! # Example
//!
//! ```ignore
//! let store = SubscriptionStore::new(["beacon"]);
//! let beacons = Arc::new(EventEmitter::new("beacons"));
//!
//! store.subscribe("beacon", beacons.clone(), "BeaconSighting", |raw| {
//!     Ok(DisplayValue::from(raw["rssi"].to_string()))
//! })?;
//!
//! beacons.emit("BeaconSighting", &json!({"rssi": -67}));
//! assert_eq!(store.snapshot().text("beacon"), Some("-67"));
//!
//! store.unsubscribe_all();
//! ```

mod manager;
mod types;

pub use manager::SubscriptionStore;
pub use types::{Snapshot, SubscriptionId, Transform};
