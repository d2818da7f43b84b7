//! Display transforms for the places, beacon and region events.
//!
//! Each [`Binding`] ties a state key to one SDK event and the function that
//! renders its payload. A payload missing a field the transform needs is a
//! `MalformedEvent`.

use crate::error::{HarnessError, Result};
use crate::events::EventSource;
use crate::subscriptions::SubscriptionStore;
use crate::types::{format_number, DisplayValue, RawEvent};
use chrono::{FixedOffset, Offset, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;

/// State keys fed by SDK events.
pub mod keys {
    pub const VISIT_START: &str = "visit_start";
    pub const VISIT_START_WITH_DELAY: &str = "visit_start_with_delay";
    pub const VISIT_END: &str = "visit_end";
    pub const PLACE_BEACON_SIGHTING: &str = "place_beacon_sighting";
    pub const LOCATION_DETECTED: &str = "location_detected";
    pub const BEACON_SIGHTING: &str = "beacon_sighting";
    pub const REGION_ENTER: &str = "region_enter";
    pub const REGION_EXIT: &str = "region_exit";
}

/// Event names emitted by the SDKs.
pub mod event_names {
    pub const VISIT_START: &str = "VisitStart";
    pub const VISIT_START_WITH_DELAY: &str = "VisitStartWithDelay";
    pub const VISIT_END: &str = "VisitEnd";
    pub const BEACON_SIGHTING: &str = "BeaconSighting";
    pub const LOCATION_DETECTED: &str = "LocationDetected";
    pub const REGION_ENTER: &str = "regionEnter";
    pub const REGION_EXIT: &str = "regionExit";
}

/// Coordinates are cut to this many characters of their decimal text.
const COORDINATE_WIDTH: usize = 9;

/// Formatting settings shared by all transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayFormat {
    offset: FixedOffset,
}

impl DisplayFormat {
    /// Format times in a fixed offset east of UTC.
    pub fn with_offset_seconds(seconds: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(seconds).ok_or_else(|| {
            HarnessError::Config(format!("utc offset out of range: {}s", seconds))
        })?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// 12-hour time of day, e.g. `4:05:09 PM`.
    pub fn time_of_day(&self, millis: i64) -> Result<String> {
        let instant = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| HarnessError::malformed(format!("timestamp out of range: {}", millis)))?;
        Ok(instant
            .with_timezone(&self.offset)
            .format("%-I:%M:%S %p")
            .to_string())
    }

    /// `"<rssi>, <time>"` for a sighting record.
    fn sighting(&self, sighting: &Value) -> Result<DisplayValue> {
        let rssi = field(sighting, "rssi").and_then(scalar_text)?;
        let millis = field(sighting, "timeInMillis").and_then(as_millis)?;
        Ok(DisplayValue::Text(format!("{}, {}", rssi, self.time_of_day(millis)?)))
    }

    /// Beacon manager sighting: `{rssi, timeInMillis}`.
    pub fn beacon_sighting(&self, raw: &RawEvent) -> Result<DisplayValue> {
        self.sighting(raw)
    }

    /// Place manager sighting: `{beaconSighting: {rssi, timeInMillis}}`.
    pub fn place_beacon_sighting(&self, raw: &RawEvent) -> Result<DisplayValue> {
        self.sighting(field(raw, "beaconSighting")?)
    }

    pub fn visit_id(&self, raw: &RawEvent) -> Result<DisplayValue> {
        field(raw, "visitId").and_then(scalar)
    }

    pub fn visit_delay(&self, raw: &RawEvent) -> Result<DisplayValue> {
        field(raw, "delay").and_then(scalar)
    }

    /// `"<lat>, <lon>"`, each cut to nine characters.
    pub fn location_detected(&self, raw: &RawEvent) -> Result<DisplayValue> {
        let lat = field(raw, "latitude").and_then(scalar_text)?;
        let lon = field(raw, "longitude").and_then(scalar_text)?;
        Ok(DisplayValue::Text(format!(
            "{}, {}",
            truncate(&lat, COORDINATE_WIDTH),
            truncate(&lon, COORDINATE_WIDTH)
        )))
    }

    /// `"<place name>, <arrival time>"`.
    pub fn region_enter(&self, raw: &RawEvent) -> Result<DisplayValue> {
        region(raw, "arrivalTime")
    }

    /// `"<place name>, <departure time>"`.
    pub fn region_exit(&self, raw: &RawEvent) -> Result<DisplayValue> {
        region(raw, "departureTime")
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::utc()
    }
}

fn region(raw: &RawEvent, time_field: &str) -> Result<DisplayValue> {
    let name = field(raw, "place")
        .and_then(|place| field(place, "name"))
        .and_then(scalar_text)?;
    let time = field(raw, time_field).and_then(scalar_text)?;
    Ok(DisplayValue::Text(format!("{}, {}", name, time)))
}

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    match value.get(name) {
        Some(Value::Null) | None => Err(HarnessError::malformed(format!("missing `{}`", name))),
        Some(v) => Ok(v),
    }
}

fn scalar(value: &Value) -> Result<DisplayValue> {
    match value {
        Value::String(s) => Ok(DisplayValue::Text(s.clone())),
        Value::Number(n) => n
            .as_f64()
            .map(DisplayValue::Number)
            .ok_or_else(|| HarnessError::malformed(format!("unrepresentable number {}", n))),
        Value::Bool(b) => Ok(DisplayValue::Flag(*b)),
        other => Err(HarnessError::malformed(format!("expected a scalar, got {}", other))),
    }
}

fn scalar_text(value: &Value) -> Result<String> {
    scalar(value).map(|v| match v {
        DisplayValue::Number(n) => format_number(n),
        other => other.to_string(),
    })
}

fn as_millis(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| HarnessError::malformed(format!("expected milliseconds, got {}", value)))
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Ties a state key to the SDK event that feeds it.
#[derive(Clone, Copy)]
pub struct Binding {
    pub key: &'static str,
    pub event: &'static str,
    pub transform: fn(&DisplayFormat, &RawEvent) -> Result<DisplayValue>,
}

impl Binding {
    /// Subscribe `key` on `store` to `event` from `source`.
    pub fn subscribe(
        &self,
        store: &SubscriptionStore,
        source: Arc<dyn EventSource>,
        format: DisplayFormat,
    ) -> Result<()> {
        let transform = self.transform;
        store.subscribe(self.key, source, self.event, move |raw: &RawEvent| {
            transform(&format, raw)
        })
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("event", &self.event)
            .finish()
    }
}

/// Place manager events.
pub const PLACE_BINDINGS: [Binding; 5] = [
    Binding {
        key: keys::VISIT_START,
        event: event_names::VISIT_START,
        transform: DisplayFormat::visit_id,
    },
    Binding {
        key: keys::VISIT_START_WITH_DELAY,
        event: event_names::VISIT_START_WITH_DELAY,
        transform: DisplayFormat::visit_delay,
    },
    Binding {
        key: keys::VISIT_END,
        event: event_names::VISIT_END,
        transform: DisplayFormat::visit_id,
    },
    Binding {
        key: keys::PLACE_BEACON_SIGHTING,
        event: event_names::BEACON_SIGHTING,
        transform: DisplayFormat::place_beacon_sighting,
    },
    Binding {
        key: keys::LOCATION_DETECTED,
        event: event_names::LOCATION_DETECTED,
        transform: DisplayFormat::location_detected,
    },
];

/// Beacon manager events.
pub const BEACON_BINDINGS: [Binding; 1] = [Binding {
    key: keys::BEACON_SIGHTING,
    event: event_names::BEACON_SIGHTING,
    transform: DisplayFormat::beacon_sighting,
}];

/// Push adapter region events.
pub const REGION_BINDINGS: [Binding; 2] = [
    Binding {
        key: keys::REGION_ENTER,
        event: event_names::REGION_ENTER,
        transform: DisplayFormat::region_enter,
    },
    Binding {
        key: keys::REGION_EXIT,
        event: event_names::REGION_EXIT,
        transform: DisplayFormat::region_exit,
    },
];

/// Every key any binding writes to.
pub fn all_keys() -> impl Iterator<Item = &'static str> {
    PLACE_BINDINGS
        .iter()
        .chain(BEACON_BINDINGS.iter())
        .chain(REGION_BINDINGS.iter())
        .map(|b| b.key)
}
