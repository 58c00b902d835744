//! Vehicles and their operational timelines.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{DutyId, EventKey, EventSequence, EventSpan, TripId, VehicleId};

/// Error returned when an event type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0:?}")]
pub struct UnknownEventType(pub String);

/// Kind of an event in a vehicle's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleEventType {
    Attendance,
    Deadhead,
    DepotPullIn,
    DepotPullOut,
    PreTrip,
    ServiceTrip,
}

impl VehicleEventType {
    pub const ALL: [VehicleEventType; 6] = [
        VehicleEventType::Attendance,
        VehicleEventType::Deadhead,
        VehicleEventType::DepotPullIn,
        VehicleEventType::DepotPullOut,
        VehicleEventType::PreTrip,
        VehicleEventType::ServiceTrip,
    ];

    /// The type's name as it appears in datasets.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleEventType::Attendance => "attendance",
            VehicleEventType::Deadhead => "deadhead",
            VehicleEventType::DepotPullIn => "depot_pull_in",
            VehicleEventType::DepotPullOut => "depot_pull_out",
            VehicleEventType::PreTrip => "pre_trip",
            VehicleEventType::ServiceTrip => "service_trip",
        }
    }
}

impl FromStr for VehicleEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

impl fmt::Display for VehicleEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event in a vehicle's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleEvent {
    pub sequence: EventSequence,
    pub kind: VehicleEventType,
    /// Set on service trips; any other kind carrying one is malformed
    pub trip_id: Option<TripId>,
    /// Stored span of non-service events. Service trips take theirs from the trip.
    pub span: Option<EventSpan>,
    /// Duty the dataset says this event belongs to. Informational only.
    pub duty_id: Option<DutyId>,
}

impl VehicleEvent {
    pub fn is_service_trip(&self) -> bool {
        self.kind == VehicleEventType::ServiceTrip
    }
}

/// A vehicle and its ordered timeline of events.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    /// Events as listed in the dataset (not necessarily in sequence order)
    pub events: Vec<VehicleEvent>,
}

impl Vehicle {
    /// Returns the vehicle's events sorted by sequence number.
    pub fn events_in_sequence(&self) -> Vec<&VehicleEvent> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_by_key(|e| e.sequence);
        events
    }

    /// Find the event with the given sequence number.
    pub fn event(&self, sequence: EventSequence) -> Option<&VehicleEvent> {
        self.events.iter().find(|e| e.sequence == sequence)
    }

    /// Composite key of one of this vehicle's events.
    pub fn key_of(&self, event: &VehicleEvent) -> EventKey {
        EventKey::new(self.vehicle_id.clone(), event.sequence)
    }
}
