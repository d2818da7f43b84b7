//! The console: manual-test actions against the SDK collaborators.

use crate::collaborators::Collaborators;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::events::EventSource;
use crate::subscriptions::{Snapshot, SubscriptionStore};
use crate::transforms::{all_keys, Binding, DisplayFormat, BEACON_BINDINGS, PLACE_BINDINGS, REGION_BINDINGS};
use crate::types::{
    ConsentKind, ConsentState, EstablishedLocation, LogChannel, PermissionId, Platform,
    RequirementState,
};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ErrorBanner, StatusBoard};

/// Drives the collaborators and mirrors what they report.
///
/// Every public action catches its own failure and shows it on the error
/// banner instead of returning it. Actions that fetch a value also return
/// it (`None` on failure).
pub struct Console {
    platform: Platform,
    config: HarnessConfig,
    format: DisplayFormat,
    sdk: Collaborators,
    store: Arc<SubscriptionStore>,
    status: RwLock<StatusBoard>,
    banner: ErrorBanner,
}

impl Console {
    /// Build a console and enable user notifications on the push SDK.
    ///
    /// Fails only on invalid configuration or an unsupported platform.
    pub async fn new(config: HarnessConfig, sdk: Collaborators) -> Result<Self> {
        config.validate()?;
        let platform = config.resolve_platform()?;
        let format = config.display_format()?;
        let banner = ErrorBanner::new(config.error_display());

        let console = Self {
            platform,
            config,
            format,
            sdk,
            store: Arc::new(SubscriptionStore::new(all_keys())),
            status: RwLock::new(StatusBoard::default()),
            banner,
        };

        let notifications = Arc::clone(&console.sdk.notifications);
        console
            .guard("Error enabling notifications", async move {
                notifications.set_user_notifications_enabled(true).await
            })
            .await;

        info!(platform = %console.platform, "console ready");
        Ok(console)
    }

    // --- Read API ---

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn store(&self) -> &Arc<SubscriptionStore> {
        &self.store
    }

    /// Event-driven state.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Query-driven state.
    pub fn status(&self) -> StatusBoard {
        self.status.read().clone()
    }

    /// The error currently on display, if any.
    pub fn banner(&self) -> Option<String> {
        self.banner.message()
    }

    // --- Lifecycle ---

    /// Refresh permission state and start listening for region events.
    pub async fn mount(&self) {
        self.check_permissions().await;
        if let Err(e) = self.subscribe_all(&REGION_BINDINGS, self.sdk.push_adapter.events()) {
            self.report("Error listening for region events", e);
        }
    }

    /// Release every subscription. Returns how many were active.
    pub fn unmount(&self) -> usize {
        let released = self.store.unsubscribe_all();
        debug!(released, "console unmounted");
        released
    }

    // --- Permissions ---

    /// Re-read every required permission. Returns whether all are granted.
    pub async fn check_permissions(&self) -> Option<bool> {
        self.guard("Error checking permission status", self.evaluate_permissions())
            .await
    }

    /// Prompt for every required permission. Returns whether all are granted.
    pub async fn request_permissions(&self) -> Option<bool> {
        self.guard("Error requesting permissions", self.prompt_permissions())
            .await
    }

    /// Whether every required permission is currently granted. Always
    /// queries the provider; a failed query counts as not granted.
    pub async fn permissions_granted(&self) -> bool {
        self.check_permissions().await.unwrap_or(false)
    }

    async fn evaluate_permissions(&self) -> Result<bool> {
        let mut all_granted = true;
        for &permission in PermissionId::required_for(self.platform) {
            let grant = self.sdk.permissions.check(permission).await?;
            debug!(?permission, ?grant, "permission checked");
            self.status.write().permissions.insert(permission, grant);
            all_granted &= grant.is_granted();
        }
        Ok(all_granted)
    }

    async fn prompt_permissions(&self) -> Result<bool> {
        let mut all_granted = true;
        for &permission in PermissionId::required_for(self.platform) {
            let grant = self.sdk.permissions.request(permission).await?;
            info!(?permission, ?grant, "permission requested");
            self.status.write().permissions.insert(permission, grant);
            all_granted &= grant.is_granted();
        }
        self.status.write().permissions_requested = true;
        Ok(all_granted)
    }

    /// Succeeds if permissions are granted, prompting once if they are not.
    async fn require_permissions(&self) -> Result<()> {
        if self.evaluate_permissions().await? || self.prompt_permissions().await? {
            return Ok(());
        }
        Err(HarnessError::PermissionDenied(
            "location permission is required".to_string(),
        ))
    }

    // --- Push adapter ---

    pub async fn start_push(&self) {
        self.guard("Error starting push adapter", async {
            self.require_permissions().await?;

            let options = self.config.notifications.select(self.platform);
            self.sdk.notifications.configure(options).await?;

            let api_key = self.config.api_key(self.platform)?;
            let status = self.sdk.push_adapter.start(api_key).await?;
            info!(status, "push adapter started");
            self.status.write().push_status = status;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn stop_push(&self) {
        self.guard("Error stopping push adapter", async {
            self.sdk.push_adapter.stop().await?;
            self.status.write().push_status = false;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn refresh_push_started(&self) -> Option<bool> {
        self.guard("Cannot query push adapter", async {
            let started = self.sdk.push_adapter.is_started().await?;
            self.status.write().push_started = Some(started);
            Ok::<_, HarnessError>(started)
        })
        .await
    }

    // --- Places SDK ---

    pub async fn start_places(&self) {
        self.guard("Error starting places SDK", async {
            self.require_permissions().await?;
            self.sdk.places.start().await?;
            info!("places SDK started");
            self.status.write().places_status = true;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn stop_places(&self) {
        self.guard("Error stopping places SDK", async {
            self.sdk.places.stop().await?;
            self.status.write().places_status = false;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn refresh_places_started(&self) -> Option<bool> {
        self.guard("Cannot query places SDK", async {
            let started = self.sdk.places.is_started().await?;
            self.status.write().places_started = Some(started);
            Ok::<_, HarnessError>(started)
        })
        .await
    }

    pub async fn fetch_instance_id(&self) -> Option<String> {
        self.guard("Cannot get app instance identifier", async {
            let id = self.sdk.places.instance_id().await?;
            self.status.write().instance_id = Some(id.clone());
            Ok::<_, HarnessError>(id)
        })
        .await
    }

    // --- Consent ---

    pub async fn set_consent(&self, state: ConsentState) {
        self.guard("Error setting user consent", async {
            self.sdk.consent.set_consent(ConsentKind::Places, state).await?;
            info!(%state, "consent set");
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn fetch_consent(&self) -> Option<ConsentState> {
        self.guard("Error getting user consent", async {
            let state = self.sdk.consent.consent(ConsentKind::Places).await?;
            self.status.write().consent = Some(state);
            Ok::<_, HarnessError>(state)
        })
        .await
    }

    pub async fn fetch_consent_requirement(&self) -> Option<RequirementState> {
        self.guard("Error getting consent requirement", async {
            let requirement = self.sdk.consent.requirement().await?;
            self.status.write().consent_requirement = Some(requirement);
            Ok::<_, HarnessError>(requirement)
        })
        .await
    }

    // --- Debug logging ---

    /// Toggle an SDK log channel, then read back its state.
    pub async fn set_logging(&self, channel: LogChannel, enabled: bool) -> Option<bool> {
        let context = format!("Error toggling {} logging", channel);
        self.guard(&context, async {
            if enabled {
                self.sdk.debug_logs.enable(channel).await
            } else {
                self.sdk.debug_logs.disable(channel).await
            }
        })
        .await;
        self.refresh_logging(channel).await
    }

    pub async fn refresh_logging(&self, channel: LogChannel) -> Option<bool> {
        let context = format!("Error checking {} logging", channel);
        self.guard(&context, async {
            let enabled = self.sdk.debug_logs.is_enabled(channel).await?;
            self.status.write().logging.insert(channel, enabled);
            Ok::<_, HarnessError>(enabled)
        })
        .await
    }

    // --- Place monitoring ---

    pub async fn start_place_monitoring(&self) {
        self.guard("Error starting place monitoring", async {
            self.subscribe_all(&PLACE_BINDINGS, self.sdk.place_manager.events())?;
            self.sdk.place_manager.start_monitoring().await
        })
        .await;
        self.refresh_place_monitoring().await;
    }

    pub async fn stop_place_monitoring(&self) {
        self.guard("Error stopping place monitoring", self.sdk.place_manager.stop_monitoring())
            .await;
        self.unsubscribe_all(&PLACE_BINDINGS);
        self.refresh_place_monitoring().await;
    }

    pub async fn refresh_place_monitoring(&self) -> Option<bool> {
        self.guard("Error checking place monitoring", async {
            let monitoring = self.sdk.place_manager.is_monitoring().await?;
            self.status.write().monitoring_places = Some(monitoring);
            Ok::<_, HarnessError>(monitoring)
        })
        .await
    }

    /// Re-attach place listeners if the SDK is already monitoring, e.g.
    /// after the console was rebuilt while monitoring continued natively.
    pub async fn restore_place_monitoring(&self) -> Option<bool> {
        self.guard("Error restoring place monitoring", async {
            let monitoring = self.sdk.place_manager.is_monitoring().await?;
            if monitoring {
                self.subscribe_all(&PLACE_BINDINGS, self.sdk.place_manager.events())?;
            }
            self.status.write().monitoring_places = Some(monitoring);
            Ok::<_, HarnessError>(monitoring)
        })
        .await
    }

    // --- Beacon monitoring ---

    pub async fn start_beacon_monitoring(&self) {
        self.guard("Error starting beacon monitoring", async {
            self.subscribe_all(&BEACON_BINDINGS, self.sdk.beacon_manager.events())?;
            self.sdk.beacon_manager.start_listening().await
        })
        .await;
    }

    pub async fn stop_beacon_monitoring(&self) {
        self.guard("Error stopping beacon monitoring", self.sdk.beacon_manager.stop_listening())
            .await;
        self.unsubscribe_all(&BEACON_BINDINGS);
    }

    // --- Established locations ---

    pub async fn start_established_monitoring(&self) {
        self.guard("Error starting established locations", async {
            self.sdk.established_locations.start_monitoring().await?;
            self.status.write().monitoring_established = true;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn stop_established_monitoring(&self) {
        self.guard("Error stopping established locations", async {
            self.sdk.established_locations.stop_monitoring().await?;
            self.status.write().monitoring_established = false;
            Ok::<_, HarnessError>(())
        })
        .await;
    }

    pub async fn refresh_established_status(&self) -> Option<bool> {
        self.guard("Error checking established locations", async {
            let monitoring = self.sdk.established_locations.is_monitoring().await?;
            self.status.write().established_status = Some(monitoring);
            Ok::<_, HarnessError>(monitoring)
        })
        .await
    }

    pub async fn fetch_established_locations(&self) -> Option<Vec<EstablishedLocation>> {
        self.guard("Error getting established locations", async {
            let locations = self.sdk.established_locations.locations().await?;
            debug!(count = locations.len(), "established locations fetched");
            self.status.write().established_locations = locations.clone();
            Ok::<_, HarnessError>(locations)
        })
        .await
    }

    // --- Helpers ---

    fn subscribe_all(
        &self,
        bindings: &[Binding],
        source: Arc<dyn EventSource>,
    ) -> Result<()> {
        for binding in bindings {
            binding.subscribe(&self.store, Arc::clone(&source), self.format)?;
        }
        Ok(())
    }

    fn unsubscribe_all(&self, bindings: &[Binding]) {
        for binding in bindings {
            self.store.unsubscribe(binding.key);
        }
    }

    /// Await `action`; on failure show `"<context>: <error>"` on the banner.
    async fn guard<T, F>(&self, context: &str, action: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match action.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(context, e);
                None
            }
        }
    }

    fn report(&self, context: &str, error: HarnessError) {
        warn!(context, error = %error, "action failed");
        self.banner.show(format!("{}: {}", context, error));
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("platform", &self.platform)
            .field("store", &self.store)
            .finish()
    }
}
