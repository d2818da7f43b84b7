//! # Beaconboard
//!
//! A manual-test harness for a places/beacon SDK, a push SDK and the adapter
//! between them. The SDKs themselves are collaborators behind traits; this
//! crate owns the glue.
//!
//! ## Core Concepts
//!
//! - **Subscriptions**: Keyed, idempotent listeners that mirror SDK events
//!   into an observable state map
//! - **Events**: Push-style sources, an in-process emitter and a bounded
//!   bridge onto the event loop
//! - **Transforms**: Payload-to-display rendering for every SDK event
//! - **Console**: Async actions that drive the SDKs and mirror their status
//!
//! ## Example
//!
//! ```ignore
//! use beaconboard::{Console, HarnessConfig, LogChannel};
//!
//! let console = Console::new(HarnessConfig::load("harness.json")?, collaborators).await?;
//! console.mount().await;
//!
//! console.start_places().await;
//! console.start_place_monitoring().await;
//! console.set_logging(LogChannel::Place, true).await;
//!
//! // Render
//! let values = console.snapshot();
//! println!("Visit ID: {}", values["visit_start"]);
//! if let Some(error) = console.banner() {
//!     println!("{}", error);
//! }
//!
//! console.unmount();
//! ```

pub mod collaborators;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod subscriptions;
pub mod transforms;
pub mod types;

// Re-exports
pub use collaborators::{
    BeaconManager, Collaborators, ConsentManager, DebugLogControls, EstablishedLocations,
    PermissionProvider, PlaceManager, PlacesSdk, PushAdapter, PushNotifications,
};
pub use config::{HarnessConfig, PlatformValues};
pub use console::{Console, ErrorBanner, StatusBoard};
pub use error::{HarnessError, Result};
pub use events::{
    listen, BridgeSender, EventBridge, EventEmitter, EventSource, Listener, ListenerGuard,
    ListenerId, PostedEvent,
};
pub use subscriptions::{Snapshot, SubscriptionId, SubscriptionStore, Transform};
pub use transforms::{keys, Binding, DisplayFormat};
pub use types::*;
