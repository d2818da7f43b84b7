//! Capability traits for the external SDKs the harness drives.
//!
//! Every call is async and fallible; implementations report SDK failures as
//! `HarnessError::SdkCallFailed`. Event-emitting collaborators expose their
//! emitter through `events()`.

use crate::error::Result;
use crate::events::EventSource;
use crate::types::{
    ConsentKind, ConsentState, EstablishedLocation, GrantState, LogChannel, NotificationOptions,
    PermissionId, RequirementState,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Platform permission APIs.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn check(&self, permission: PermissionId) -> Result<GrantState>;

    /// Prompt the user if needed and return the resulting state.
    async fn request(&self, permission: PermissionId) -> Result<GrantState>;
}

/// Places SDK lifecycle.
#[async_trait]
pub trait PlacesSdk: Send + Sync {
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn is_started(&self) -> Result<bool>;
    async fn instance_id(&self) -> Result<String>;
}

/// Place monitoring. Emits `VisitStart`, `VisitStartWithDelay`, `VisitEnd`,
/// `BeaconSighting` and `LocationDetected`.
#[async_trait]
pub trait PlaceManager: Send + Sync {
    async fn start_monitoring(&self) -> Result<()>;
    async fn stop_monitoring(&self) -> Result<()>;
    async fn is_monitoring(&self) -> Result<bool>;
    fn events(&self) -> Arc<dyn EventSource>;
}

/// Raw beacon sightings. Emits `BeaconSighting`.
#[async_trait]
pub trait BeaconManager: Send + Sync {
    async fn start_listening(&self) -> Result<()>;
    async fn stop_listening(&self) -> Result<()>;
    fn events(&self) -> Arc<dyn EventSource>;
}

/// Locations the device frequents.
#[async_trait]
pub trait EstablishedLocations: Send + Sync {
    async fn start_monitoring(&self) -> Result<()>;
    async fn stop_monitoring(&self) -> Result<()>;
    async fn is_monitoring(&self) -> Result<bool>;
    async fn locations(&self) -> Result<Vec<EstablishedLocation>>;
}

/// Adapter forwarding places events to the push SDK. Emits `regionEnter`
/// and `regionExit`.
#[async_trait]
pub trait PushAdapter: Send + Sync {
    /// Start with the places API key. Returns the adapter's reported status.
    async fn start(&self, api_key: &str) -> Result<bool>;
    async fn stop(&self) -> Result<()>;
    async fn is_started(&self) -> Result<bool>;
    fn events(&self) -> Arc<dyn EventSource>;
}

/// Push SDK notification settings.
#[async_trait]
pub trait PushNotifications: Send + Sync {
    async fn set_user_notifications_enabled(&self, enabled: bool) -> Result<()>;
    async fn configure(&self, options: &NotificationOptions) -> Result<()>;
}

/// Privacy consent.
#[async_trait]
pub trait ConsentManager: Send + Sync {
    async fn set_consent(&self, kind: ConsentKind, state: ConsentState) -> Result<()>;
    async fn consent(&self, kind: ConsentKind) -> Result<ConsentState>;
    async fn requirement(&self) -> Result<RequirementState>;
}

/// SDK-side logging toggles.
#[async_trait]
pub trait DebugLogControls: Send + Sync {
    async fn enable(&self, channel: LogChannel) -> Result<()>;
    async fn disable(&self, channel: LogChannel) -> Result<()>;
    async fn is_enabled(&self, channel: LogChannel) -> Result<bool>;
}

/// Every collaborator the console talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub permissions: Arc<dyn PermissionProvider>,
    pub places: Arc<dyn PlacesSdk>,
    pub place_manager: Arc<dyn PlaceManager>,
    pub beacon_manager: Arc<dyn BeaconManager>,
    pub established_locations: Arc<dyn EstablishedLocations>,
    pub push_adapter: Arc<dyn PushAdapter>,
    pub notifications: Arc<dyn PushNotifications>,
    pub consent: Arc<dyn ConsentManager>,
    pub debug_logs: Arc<dyn DebugLogControls>,
}
