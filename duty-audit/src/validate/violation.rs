//! Violation records produced by the validator.

use std::fmt;

use serde::Serialize;

use crate::domain::{DutyId, EventKey, StopId, TripId, VehicleId};

/// The six dataset rules, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Exactly the service trips carry a trip id, and it resolves.
    EventTripCorrespondence,
    /// No depot is a trip endpoint.
    DepotExclusivity,
    /// No two stops share a geographic point.
    GeoUniqueness,
    /// No vehicle event is claimed by two duties.
    VehicleEventExclusivity,
    /// Each duty claims a gap-free, repeat-free range of each vehicle's events.
    SequenceContiguity,
    /// Every referenced id resolves.
    ReferentialCompleteness,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::EventTripCorrespondence,
        Rule::DepotExclusivity,
        Rule::GeoUniqueness,
        Rule::VehicleEventExclusivity,
        Rule::SequenceContiguity,
        Rule::ReferentialCompleteness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::EventTripCorrespondence => "event_trip_correspondence",
            Rule::DepotExclusivity => "depot_exclusivity",
            Rule::GeoUniqueness => "geo_uniqueness",
            Rule::VehicleEventExclusivity => "vehicle_event_exclusivity",
            Rule::SequenceContiguity => "sequence_contiguity",
            Rule::ReferentialCompleteness => "referential_completeness",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed reference to an entity involved in a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Stop(StopId),
    Trip(TripId),
    Vehicle(VehicleId),
    Duty(DutyId),
    VehicleEvent(EventKey),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Stop(id) => write!(f, "stop {id}"),
            EntityRef::Trip(id) => write!(f, "trip {id}"),
            EntityRef::Vehicle(id) => write!(f, "vehicle {id}"),
            EntityRef::Duty(id) => write!(f, "duty {id}"),
            EntityRef::VehicleEvent(key) => write!(f, "vehicle event {key}"),
        }
    }
}

/// One broken rule, with enough context to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: Rule,
    /// Offending entities; the first one is the primary subject.
    pub entity_ids: Vec<EntityRef>,
    pub detail: String,
}

impl Violation {
    pub fn new(rule: Rule, entity_ids: Vec<EntityRef>, detail: impl Into<String>) -> Self {
        Self {
            rule,
            entity_ids,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.detail)
    }
}

/// Put violations in report order: by rule, then by entity ids.
///
/// The sort is stable, so equal keys keep the order they were found in.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| (a.rule, &a.entity_ids).cmp(&(b.rule, &b.entity_ids)));
}
