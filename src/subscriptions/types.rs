//! Subscription types for the state store.

use crate::error::Result;
use crate::types::{DisplayValue, RawEvent};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::ops::Index;
use std::sync::Arc;

/// Turns a raw event payload into the value stored under a key.
pub type Transform = Arc<dyn Fn(&RawEvent) -> Result<DisplayValue> + Send + Sync>;

/// Unique identifier for one activation of a subscription.
///
/// A key that is unsubscribed and subscribed again gets a new id, so a
/// listener left over from the earlier activation can never write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Immutable copy of the state map.
///
/// Cloning is cheap; the underlying map is shared until the store writes
/// again.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub(crate) values: Arc<BTreeMap<String, DisplayValue>>,
    pub(crate) revision: u64,
}

impl Snapshot {
    /// Value held under `key`, or `None` if the store has no such key.
    pub fn get(&self, key: &str) -> Option<&DisplayValue> {
        self.values.get(key)
    }

    /// Text value under `key`, if it holds text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(DisplayValue::as_text)
    }

    /// Number of writes the store had applied when this snapshot was taken.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DisplayValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_map(&self) -> BTreeMap<String, DisplayValue> {
        (*self.values).clone()
    }
}

impl Index<&str> for Snapshot {
    type Output = DisplayValue;

    fn index(&self, key: &str) -> &DisplayValue {
        match self.values.get(key) {
            Some(value) => value,
            None => panic!("no state key named {:?}", key),
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.values.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
