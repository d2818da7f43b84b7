//! In-memory collaborators for console tests.

#![allow(dead_code)]

use async_trait::async_trait;
use beaconboard::{
    BeaconManager, Collaborators, ConsentKind, ConsentManager, ConsentState, DebugLogControls,
    EstablishedLocation, EstablishedLocations, EventEmitter, EventSource, GrantState,
    HarnessConfig, HarnessError, LogChannel, NotificationOptions, PermissionId,
    PermissionProvider, PlaceManager, PlacesSdk, Platform, PlatformValues, PushAdapter, PushNotifications,
    RequirementState, Result,
};
use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Recorded state of the fake SDKs.
pub struct FakeState {
    pub checks: HashMap<PermissionId, GrantState>,
    pub on_request: HashMap<PermissionId, GrantState>,
    pub failing: HashSet<&'static str>,
    pub calls: Vec<&'static str>,

    pub places_started: bool,
    pub push_started: bool,
    pub push_api_key: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub notification_options: Option<NotificationOptions>,
    pub place_monitoring: bool,
    pub beacon_listening: bool,
    pub established_monitoring: bool,
    pub locations: Vec<EstablishedLocation>,
    pub consent: ConsentState,
    pub requirement: RequirementState,
    pub logging: HashMap<LogChannel, bool>,
}

impl FakeState {
    fn with_grant(grant: GrantState) -> Self {
        let all = [
            PermissionId::LocationAlways,
            PermissionId::LocationWhenInUse,
            PermissionId::AccessFineLocation,
        ];
        Self {
            checks: all.iter().map(|p| (*p, grant)).collect(),
            on_request: all.iter().map(|p| (*p, grant)).collect(),
            failing: HashSet::new(),
            calls: Vec::new(),
            places_started: false,
            push_started: false,
            push_api_key: None,
            notifications_enabled: None,
            notification_options: None,
            place_monitoring: false,
            beacon_listening: false,
            established_monitoring: false,
            locations: Vec::new(),
            consent: ConsentState::Unknown,
            requirement: RequirementState::Unknown,
            logging: HashMap::new(),
        }
    }
}

/// One object standing in for every SDK.
pub struct FakeSdk {
    pub place_events: Arc<EventEmitter>,
    pub beacon_events: Arc<EventEmitter>,
    pub region_events: Arc<EventEmitter>,
    state: Mutex<FakeState>,
}

impl FakeSdk {
    /// All permissions granted.
    pub fn granted() -> Arc<Self> {
        Self::with_grant(GrantState::Granted)
    }

    /// All permission checks and requests denied.
    pub fn denied() -> Arc<Self> {
        Self::with_grant(GrantState::Denied)
    }

    fn with_grant(grant: GrantState) -> Arc<Self> {
        Arc::new(Self {
            place_events: Arc::new(EventEmitter::new("places")),
            beacon_events: Arc::new(EventEmitter::new("beacons")),
            region_events: Arc::new(EventEmitter::new("push_adapter")),
            state: Mutex::new(FakeState::with_grant(grant)),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }

    /// Make every later call named `call` fail.
    pub fn fail(&self, call: &'static str) {
        self.state.lock().failing.insert(call);
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            permissions: self.clone(),
            places: self.clone(),
            place_manager: self.clone(),
            beacon_manager: self.clone(),
            established_locations: self.clone(),
            push_adapter: self.clone(),
            notifications: self.clone(),
            consent: self.clone(),
            debug_logs: self.clone(),
        }
    }

    fn call(&self, name: &'static str) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock();
        state.calls.push(name);
        if state.failing.contains(name) {
            return Err(HarnessError::sdk(format!("{} unavailable", name)));
        }
        Ok(state)
    }
}

pub fn test_config(platform: Platform) -> HarnessConfig {
    HarnessConfig {
        platform: Some(platform),
        places_api_key: PlatformValues {
            ios: "ios-test-key".to_string(),
            android: "android-test-key".to_string(),
        },
        error_display_ms: 200,
        ..Default::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[async_trait]
impl PermissionProvider for FakeSdk {
    async fn check(&self, permission: PermissionId) -> Result<GrantState> {
        let state = self.call("permissions.check")?;
        Ok(state.checks[&permission])
    }

    async fn request(&self, permission: PermissionId) -> Result<GrantState> {
        let mut state = self.call("permissions.request")?;
        let grant = state.on_request[&permission];
        state.checks.insert(permission, grant);
        Ok(grant)
    }
}

#[async_trait]
impl PlacesSdk for FakeSdk {
    async fn start(&self) -> Result<()> {
        self.call("places.start")?.places_started = true;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.call("places.stop")?.places_started = false;
        Ok(())
    }

    async fn is_started(&self) -> Result<bool> {
        Ok(self.call("places.is_started")?.places_started)
    }

    async fn instance_id(&self) -> Result<String> {
        self.call("places.instance_id")?;
        Ok("instance-0001".to_string())
    }
}

#[async_trait]
impl PlaceManager for FakeSdk {
    async fn start_monitoring(&self) -> Result<()> {
        self.call("place_manager.start")?.place_monitoring = true;
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.call("place_manager.stop")?.place_monitoring = false;
        Ok(())
    }

    async fn is_monitoring(&self) -> Result<bool> {
        Ok(self.call("place_manager.is_monitoring")?.place_monitoring)
    }

    fn events(&self) -> Arc<dyn EventSource> {
        self.place_events.clone()
    }
}

#[async_trait]
impl BeaconManager for FakeSdk {
    async fn start_listening(&self) -> Result<()> {
        self.call("beacon_manager.start")?.beacon_listening = true;
        Ok(())
    }

    async fn stop_listening(&self) -> Result<()> {
        self.call("beacon_manager.stop")?.beacon_listening = false;
        Ok(())
    }

    fn events(&self) -> Arc<dyn EventSource> {
        self.beacon_events.clone()
    }
}

#[async_trait]
impl EstablishedLocations for FakeSdk {
    async fn start_monitoring(&self) -> Result<()> {
        self.call("established.start")?.established_monitoring = true;
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.call("established.stop")?.established_monitoring = false;
        Ok(())
    }

    async fn is_monitoring(&self) -> Result<bool> {
        Ok(self.call("established.is_monitoring")?.established_monitoring)
    }

    async fn locations(&self) -> Result<Vec<EstablishedLocation>> {
        Ok(self.call("established.locations")?.locations.clone())
    }
}

#[async_trait]
impl PushAdapter for FakeSdk {
    async fn start(&self, api_key: &str) -> Result<bool> {
        let mut state = self.call("push.start")?;
        state.push_started = true;
        state.push_api_key = Some(api_key.to_string());
        Ok(true)
    }

    async fn stop(&self) -> Result<()> {
        self.call("push.stop")?.push_started = false;
        Ok(())
    }

    async fn is_started(&self) -> Result<bool> {
        Ok(self.call("push.is_started")?.push_started)
    }

    fn events(&self) -> Arc<dyn EventSource> {
        self.region_events.clone()
    }
}

#[async_trait]
impl PushNotifications for FakeSdk {
    async fn set_user_notifications_enabled(&self, enabled: bool) -> Result<()> {
        self.call("notifications.enable")?.notifications_enabled = Some(enabled);
        Ok(())
    }

    async fn configure(&self, options: &NotificationOptions) -> Result<()> {
        self.call("notifications.configure")?.notification_options = Some(options.clone());
        Ok(())
    }
}

#[async_trait]
impl ConsentManager for FakeSdk {
    async fn set_consent(&self, _kind: ConsentKind, state: ConsentState) -> Result<()> {
        self.call("consent.set")?.consent = state;
        Ok(())
    }

    async fn consent(&self, _kind: ConsentKind) -> Result<ConsentState> {
        Ok(self.call("consent.get")?.consent)
    }

    async fn requirement(&self) -> Result<RequirementState> {
        Ok(self.call("consent.requirement")?.requirement)
    }
}

#[async_trait]
impl DebugLogControls for FakeSdk {
    async fn enable(&self, channel: LogChannel) -> Result<()> {
        self.call("logs.enable")?.logging.insert(channel, true);
        Ok(())
    }

    async fn disable(&self, channel: LogChannel) -> Result<()> {
        self.call("logs.disable")?.logging.insert(channel, false);
        Ok(())
    }

    async fn is_enabled(&self, channel: LogChannel) -> Result<bool> {
        let state = self.call("logs.is_enabled")?;
        Ok(state.logging.get(&channel).copied().unwrap_or(false))
    }
}
