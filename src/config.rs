//! Harness configuration, resolved once at startup.

use crate::error::{HarnessError, Result};
use crate::events::EventBridge;
use crate::transforms::DisplayFormat;
use crate::types::{NotificationOptions, Platform};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A value that differs between platforms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformValues<T> {
    pub ios: T,
    pub android: T,
}

impl<T> PlatformValues<T> {
    pub fn new(ios: T, android: T) -> Self {
        Self { ios, android }
    }

    pub fn select(&self, platform: Platform) -> &T {
        match platform {
            Platform::Ios => &self.ios,
            Platform::Android => &self.android,
        }
    }
}

/// Harness configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Platform to run as. `None` means the compile target's platform.
    pub platform: Option<Platform>,

    /// Places SDK key handed to the push adapter on start.
    pub places_api_key: PlatformValues<String>,

    /// Notification presentation applied before the push adapter starts.
    pub notifications: PlatformValues<NotificationOptions>,

    /// How long an error message stays visible.
    /// Default: 3000
    pub error_display_ms: u64,

    /// Offset east of UTC used when rendering event times.
    pub utc_offset_seconds: i32,

    /// Max events queued on the bridge before posts are rejected.
    /// Default: 1024
    pub bridge_capacity: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            platform: None,
            places_api_key: PlatformValues::new(
                "YOUR_PLACES_IOS_API_KEY".to_string(),
                "YOUR_PLACES_ANDROID_API_KEY".to_string(),
            ),
            notifications: PlatformValues::new(
                NotificationOptions::default(),
                NotificationOptions {
                    alert: false,
                    badge: false,
                    sound: false,
                },
            ),
            error_display_ms: 3000,
            utc_offset_seconds: 0,
            bridge_capacity: 1024,
        }
    }
}

impl HarnessConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HarnessConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded harness config");
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bridge_capacity == 0 {
            return Err(HarnessError::Config("bridge_capacity must be positive".into()));
        }
        if self.error_display_ms == 0 {
            return Err(HarnessError::Config("error_display_ms must be positive".into()));
        }
        self.display_format()?;
        Ok(())
    }

    /// The configured platform, or the one this binary was built for.
    pub fn resolve_platform(&self) -> Result<Platform> {
        match self.platform.or_else(current_platform) {
            Some(platform) => Ok(platform),
            None => Err(HarnessError::UnsupportedPlatform(
                std::env::consts::OS.to_string(),
            )),
        }
    }

    pub fn api_key(&self, platform: Platform) -> Result<&str> {
        let key = self.places_api_key.select(platform);
        if key.trim().is_empty() {
            return Err(HarnessError::Config(format!("no places API key for {}", platform)));
        }
        Ok(key)
    }

    pub fn display_format(&self) -> Result<DisplayFormat> {
        DisplayFormat::with_offset_seconds(self.utc_offset_seconds)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    /// A bridge sized for this configuration.
    pub fn event_bridge(&self) -> EventBridge {
        EventBridge::new(self.bridge_capacity)
    }
}

/// Platform of the compile target, if it is a mobile one.
pub fn current_platform() -> Option<Platform> {
    #[cfg(target_os = "ios")]
    {
        Some(Platform::Ios)
    }

    #[cfg(target_os = "android")]
    {
        Some(Platform::Android)
    }

    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        None
    }
}
