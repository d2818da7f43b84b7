//! Mirrored SDK status that is not driven by events.

use crate::types::{
    ConsentState, EstablishedLocation, GrantState, LogChannel, PermissionId, RequirementState,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest known result of every status query the console has made.
///
/// `None` and missing map entries mean the value has not been fetched yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatusBoard {
    /// Status reported by the push adapter's last start.
    pub push_status: bool,
    pub push_started: Option<bool>,

    /// Whether the places SDK was started from this console.
    pub places_status: bool,
    pub places_started: Option<bool>,
    pub instance_id: Option<String>,

    pub consent: Option<ConsentState>,
    pub consent_requirement: Option<RequirementState>,

    pub logging: BTreeMap<LogChannel, bool>,

    pub permissions: BTreeMap<PermissionId, GrantState>,
    pub permissions_requested: bool,

    pub monitoring_places: Option<bool>,

    pub monitoring_established: bool,
    pub established_status: Option<bool>,
    pub established_locations: Vec<EstablishedLocation>,
}

impl StatusBoard {
    pub fn logging_enabled(&self, channel: LogChannel) -> Option<bool> {
        self.logging.get(&channel).copied()
    }

    pub fn grant(&self, permission: PermissionId) -> Option<GrantState> {
        self.permissions.get(&permission).copied()
    }
}
