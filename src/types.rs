//! Core types shared by the store, the transforms and the console.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw event payload as delivered by an event source.
pub type RawEvent = serde_json::Value;

/// A display-ready value held in observable state.
///
/// Values are immutable once written; a key only ever changes by having a
/// new value written over it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    /// Nothing has been received yet.
    Unset,
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<DisplayValue>),
    Record(BTreeMap<String, DisplayValue>),
}

impl DisplayValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, DisplayValue::Unset)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DisplayValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Build a record from `(name, value)` pairs.
    pub fn record<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DisplayValue>,
    {
        DisplayValue::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Default for DisplayValue {
    fn default() -> Self {
        DisplayValue::Unset
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Unset => write!(f, "--"),
            DisplayValue::Flag(b) => write!(f, "{}", b),
            DisplayValue::Number(n) => write!(f, "{}", format_number(*n)),
            DisplayValue::Text(s) => write!(f, "{}", s),
            DisplayValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            DisplayValue::Record(fields) => {
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for DisplayValue {
    fn from(s: String) -> Self {
        DisplayValue::Text(s)
    }
}

impl From<&str> for DisplayValue {
    fn from(s: &str) -> Self {
        DisplayValue::Text(s.to_string())
    }
}

impl From<bool> for DisplayValue {
    fn from(b: bool) -> Self {
        DisplayValue::Flag(b)
    }
}

impl From<f64> for DisplayValue {
    fn from(n: f64) -> Self {
        DisplayValue::Number(n)
    }
}

impl From<i64> for DisplayValue {
    fn from(n: i64) -> Self {
        DisplayValue::Number(n as f64)
    }
}

/// Format a number the way a JS runtime prints it: integral values have no
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Round half-up to `decimals` places (matches `Math.round(x * 10^d) / 10^d`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Mobile platform the harness runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

/// Location permissions the places SDK needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionId {
    /// iOS "always" location access.
    LocationAlways,
    /// iOS "when in use" location access.
    LocationWhenInUse,
    /// Android fine location access.
    AccessFineLocation,
}

impl PermissionId {
    /// Permissions that must all be granted before starting the SDKs.
    pub fn required_for(platform: Platform) -> &'static [PermissionId] {
        match platform {
            Platform::Ios => &[PermissionId::LocationAlways, PermissionId::LocationWhenInUse],
            Platform::Android => &[PermissionId::AccessFineLocation],
        }
    }
}

/// Result of a permission check or request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantState {
    Granted,
    Denied,
    Restricted,
    Unavailable,
}

impl GrantState {
    pub fn is_granted(self) -> bool {
        self == GrantState::Granted
    }
}

/// Kind of consent tracked by the consent manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentKind {
    Places,
}

/// User consent state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentState {
    Granted,
    Refused,
    Unknown,
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentState::Granted => write!(f, "Granted"),
            ConsentState::Refused => write!(f, "Refused"),
            ConsentState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Whether consent is required in the current jurisdiction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementState {
    Required,
    NotRequired,
    Unknown,
}

impl fmt::Display for RequirementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementState::Required => write!(f, "Required"),
            RequirementState::NotRequired => write!(f, "Not Required"),
            RequirementState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Independent SDK logging toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogChannel {
    Debug,
    Place,
    BeaconSightings,
}

impl LogChannel {
    pub const ALL: [LogChannel; 3] = [LogChannel::Debug, LogChannel::Place, LogChannel::BeaconSightings];
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogChannel::Debug => write!(f, "Debug"),
            LogChannel::Place => write!(f, "Place"),
            LogChannel::BeaconSightings => write!(f, "Beacon"),
        }
    }
}

/// A location the places SDK has learned the device frequents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishedLocation {
    pub score: f64,
    pub boundary_radius: f64,
    pub boundary_center_latitude: f64,
    pub boundary_center_longitude: f64,
}

impl EstablishedLocation {
    /// Rounded, display-ready form.
    pub fn display(&self) -> DisplayValue {
        DisplayValue::record([
            ("score", round_to(self.score, 0)),
            ("radius", round_to(self.boundary_radius, 2)),
            ("lat", round_to(self.boundary_center_latitude, 6)),
            ("lon", round_to(self.boundary_center_longitude, 6)),
        ])
    }
}

/// Presentation options applied to the push SDK before it starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationOptions {
    /// Show an alert while the app is in the foreground.
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            alert: true,
            badge: true,
            sound: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_renders_placeholder() {
        assert_eq!(DisplayValue::Unset.to_string(), "--");
        assert!(DisplayValue::default().is_unset());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(-67.0), "-67");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(DisplayValue::from(42i64).to_string(), "42");
    }

    #[test]
    fn test_display_value_serializes_untagged() {
        let value = DisplayValue::record([("rssi", DisplayValue::from(-67i64))]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"rssi": -67.0}));
        assert_eq!(serde_json::to_value(DisplayValue::Unset).unwrap(), json!(null));
    }

    #[test]
    fn test_established_location_rounding() {
        let loc: EstablishedLocation = serde_json::from_value(json!({
            "score": 3.6,
            "boundaryRadius": 120.456,
            "boundaryCenterLatitude": 37.12345678,
            "boundaryCenterLongitude": -122.98765432
        }))
        .unwrap();

        assert_eq!(
            loc.display().to_string(),
            "lat: 37.123457, lon: -122.987654, radius: 120.46, score: 4"
        );
    }

    #[test]
    fn test_required_permissions_per_platform() {
        assert_eq!(PermissionId::required_for(Platform::Ios).len(), 2);
        assert_eq!(
            PermissionId::required_for(Platform::Android),
            &[PermissionId::AccessFineLocation]
        );
    }
}
