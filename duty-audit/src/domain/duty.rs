//! Duties: a crew member's ordered unit of work.
//!
//! A duty owns its list of events. Entries of kind `vehicle_event` do not own
//! the vehicle event they stand for; they hold its [`EventKey`], which is
//! resolved through the reference index.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{DutyId, EventKey, EventSequence, EventSpan, UnknownEventType, VehicleId};

/// Kind of an entry in a duty's event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyEventType {
    SignOn,
    SignOff,
    Taxi,
    VehicleEvent,
}

impl DutyEventType {
    pub const ALL: [DutyEventType; 4] = [
        DutyEventType::SignOn,
        DutyEventType::SignOff,
        DutyEventType::Taxi,
        DutyEventType::VehicleEvent,
    ];

    /// The type's name as it appears in datasets.
    pub fn as_str(&self) -> &'static str {
        match self {
            DutyEventType::SignOn => "sign_on",
            DutyEventType::SignOff => "sign_off",
            DutyEventType::Taxi => "taxi",
            DutyEventType::VehicleEvent => "vehicle_event",
        }
    }
}

impl FromStr for DutyEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

impl fmt::Display for DutyEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a duty's event list.
#[derive(Debug, Clone, PartialEq)]
pub enum DutyEvent {
    /// Crew-only activity (sign on, sign off, taxi) with its own span.
    Crew { kind: DutyEventType, span: EventSpan },
    /// Work on a vehicle, addressed by `(vehicle_id, sequence)`.
    Vehicle(EventKey),
}

impl DutyEvent {
    pub fn kind(&self) -> DutyEventType {
        match self {
            DutyEvent::Crew { kind, .. } => *kind,
            DutyEvent::Vehicle(_) => DutyEventType::VehicleEvent,
        }
    }

    /// The referenced vehicle event, for `vehicle_event` entries.
    pub fn vehicle_key(&self) -> Option<&EventKey> {
        match self {
            DutyEvent::Vehicle(key) => Some(key),
            DutyEvent::Crew { .. } => None,
        }
    }
}

/// A duty and its ordered events.
#[derive(Debug, Clone, PartialEq)]
pub struct Duty {
    pub duty_id: DutyId,
    pub events: Vec<DutyEvent>,
}

impl Duty {
    /// Returns the duty's events in list order.
    pub fn events(&self) -> &[DutyEvent] {
        &self.events
    }

    /// Vehicle events claimed by this duty, with their position in the list.
    pub fn vehicle_claims(&self) -> impl Iterator<Item = (usize, &EventKey)> + '_ {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(pos, event)| event.vehicle_key().map(|key| (pos, key)))
    }

    /// Vehicles this duty works on, in order of first appearance.
    pub fn vehicle_ids(&self) -> Vec<&VehicleId> {
        let mut seen: Vec<&VehicleId> = Vec::new();
        for (_, key) in self.vehicle_claims() {
            if !seen.contains(&&key.vehicle_id) {
                seen.push(&key.vehicle_id);
            }
        }
        seen
    }

    /// Sequences of `vehicle_id` claimed by this duty, sorted ascending.
    ///
    /// Repeated claims are kept so callers can detect them.
    pub fn claimed_sequences(&self, vehicle_id: &VehicleId) -> Vec<EventSequence> {
        let mut sequences: Vec<EventSequence> = self
            .vehicle_claims()
            .filter(|(_, key)| &key.vehicle_id == vehicle_id)
            .map(|(_, key)| key.sequence)
            .collect();
        sequences.sort();
        sequences
    }
}
