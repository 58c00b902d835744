//! The rule checks.
//!
//! Each [`Rule`] runs independently against the dataset and its index and
//! returns every violation it finds. Checks that need a reference skip it
//! when it does not resolve; `referential_completeness` reports it once.

use std::collections::BTreeMap;

use crate::domain::{
    Dataset, DutyEvent, DutyId, EventKey, EventSpan, PointKey, Stop, StopId,
};
use crate::index::ReferenceIndex;

use super::contiguity::check_contiguity;
use super::violation::{EntityRef, Rule, Violation};

impl Rule {
    /// Run this rule's check.
    pub fn run(&self, dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<Violation> {
        match self {
            Rule::EventTripCorrespondence => event_trip_correspondence(dataset, index),
            Rule::DepotExclusivity => depot_exclusivity(dataset, index),
            Rule::GeoUniqueness => geo_uniqueness(dataset),
            Rule::VehicleEventExclusivity => vehicle_event_exclusivity(dataset),
            Rule::SequenceContiguity => sequence_contiguity(dataset),
            Rule::ReferentialCompleteness => referential_completeness(dataset, index),
        }
    }
}

/// `service_trip` iff a trip id is present and resolves.
fn event_trip_correspondence(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<Violation> {
    let rule = Rule::EventTripCorrespondence;
    let mut violations = Vec::new();

    for vehicle in &dataset.vehicles {
        for event in vehicle.events_in_sequence() {
            let key = vehicle.key_of(event);
            match (&event.trip_id, event.is_service_trip()) {
                (None, true) => violations.push(Violation::new(
                    rule,
                    vec![EntityRef::VehicleEvent(key.clone())],
                    format!("service_trip event {key} carries no trip_id"),
                )),
                (Some(trip_id), true) if index.trip(trip_id.as_str()).is_none() => {
                    violations.push(Violation::new(
                        rule,
                        vec![
                            EntityRef::VehicleEvent(key.clone()),
                            EntityRef::Trip(trip_id.clone()),
                        ],
                        format!("service_trip event {key} references unknown trip {trip_id}"),
                    ))
                }
                (Some(trip_id), false) => violations.push(Violation::new(
                    rule,
                    vec![
                        EntityRef::VehicleEvent(key.clone()),
                        EntityRef::Trip(trip_id.clone()),
                    ],
                    format!("{} event {key} carries trip_id {trip_id}", event.kind),
                )),
                _ => {}
            }
        }
    }

    violations
}

/// No depot is a trip's origin or destination.
fn depot_exclusivity(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for trip in &dataset.trips {
        let endpoints = [
            ("origin", &trip.origin_stop_id),
            ("destination", &trip.destination_stop_id),
        ];
        for (role, stop_id) in endpoints {
            if index.stop(stop_id.as_str()).is_some_and(|s| s.is_depot) {
                violations.push(Violation::new(
                    Rule::DepotExclusivity,
                    vec![
                        EntityRef::Trip(trip.trip_id.clone()),
                        EntityRef::Stop(stop_id.clone()),
                    ],
                    format!("trip {} has depot {stop_id} as its {role}", trip.trip_id),
                ));
            }
        }
    }

    violations
}

/// No two stops share the exact same coordinates.
fn geo_uniqueness(dataset: &Dataset) -> Vec<Violation> {
    let mut by_point: BTreeMap<PointKey, Vec<&Stop>> = BTreeMap::new();
    for stop in &dataset.stops {
        by_point.entry(stop.point_key()).or_default().push(stop);
    }

    by_point
        .into_values()
        .filter(|stops| stops.len() > 1)
        .map(|stops| {
            let mut ids: Vec<&StopId> = stops.iter().map(|s| &s.stop_id).collect();
            ids.sort();
            let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            Violation::new(
                Rule::GeoUniqueness,
                ids.iter().map(|id| EntityRef::Stop((*id).clone())).collect(),
                format!(
                    "stops {} share the point ({}, {})",
                    names.join(", "),
                    stops[0].latitude,
                    stops[0].longitude
                ),
            )
        })
        .collect()
}

/// No vehicle event is claimed by more than one duty.
///
/// A duty claiming the same event twice is a contiguity problem, not an
/// exclusivity one.
fn vehicle_event_exclusivity(dataset: &Dataset) -> Vec<Violation> {
    let mut claims: BTreeMap<&EventKey, Vec<&DutyId>> = BTreeMap::new();
    for duty in &dataset.duties {
        for (_, key) in duty.vehicle_claims() {
            let claimants = claims.entry(key).or_default();
            if !claimants.contains(&&duty.duty_id) {
                claimants.push(&duty.duty_id);
            }
        }
    }

    claims
        .into_iter()
        .filter(|(_, duties)| duties.len() > 1)
        .map(|(key, duties)| {
            let names: Vec<&str> = duties.iter().map(|d| d.as_str()).collect();
            let mut entity_ids = vec![EntityRef::VehicleEvent(key.clone())];
            entity_ids.extend(duties.iter().map(|d| EntityRef::Duty((*d).clone())));
            Violation::new(
                Rule::VehicleEventExclusivity,
                entity_ids,
                format!(
                    "vehicle event {key} is claimed by duties {}",
                    names.join(", ")
                ),
            )
        })
        .collect()
}

/// Each duty claims a contiguous range of each vehicle's sequences.
fn sequence_contiguity(dataset: &Dataset) -> Vec<Violation> {
    let mut violations = Vec::new();

    for duty in &dataset.duties {
        for vehicle_id in duty.vehicle_ids() {
            let sequences = duty.claimed_sequences(vehicle_id);
            if let Err(gap) = check_contiguity(&sequences) {
                let claimed: Vec<String> = sequences.iter().map(|s| s.to_string()).collect();
                violations.push(Violation::new(
                    Rule::SequenceContiguity,
                    vec![
                        EntityRef::Duty(duty.duty_id.clone()),
                        EntityRef::Vehicle(vehicle_id.clone()),
                    ],
                    format!(
                        "duty {} claims vehicle {vehicle_id} sequences [{}]: {gap}",
                        duty.duty_id,
                        claimed.join(", ")
                    ),
                ));
            }
        }
    }

    violations
}

/// Every stop, trip, vehicle and vehicle event reference resolves.
///
/// Trip ids count as references on `service_trip` events only.
fn referential_completeness(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<Violation> {
    let rule = Rule::ReferentialCompleteness;
    let mut violations = Vec::new();

    let check_span = |subject: EntityRef, span: &EventSpan, violations: &mut Vec<Violation>| {
        for stop_id in [&span.origin_stop_id, &span.destination_stop_id] {
            if index.stop(stop_id.as_str()).is_none() {
                violations.push(Violation::new(
                    rule,
                    vec![subject.clone(), EntityRef::Stop(stop_id.clone())],
                    format!("{subject} references unknown stop {stop_id}"),
                ));
            }
        }
    };

    for trip in &dataset.trips {
        check_span(EntityRef::Trip(trip.trip_id.clone()), &trip.span(), &mut violations);
    }

    for vehicle in &dataset.vehicles {
        for event in vehicle.events_in_sequence() {
            let subject = EntityRef::VehicleEvent(vehicle.key_of(event));
            // A trip id on any other kind is a correspondence error, not a reference
            if let (Some(trip_id), true) = (&event.trip_id, event.is_service_trip()) {
                if index.trip(trip_id.as_str()).is_none() {
                    violations.push(Violation::new(
                        rule,
                        vec![subject.clone(), EntityRef::Trip(trip_id.clone())],
                        format!("{subject} references unknown trip {trip_id}"),
                    ));
                }
            }
            if let Some(span) = &event.span {
                check_span(subject, span, &mut violations);
            }
        }
    }

    for duty in &dataset.duties {
        let subject = EntityRef::Duty(duty.duty_id.clone());
        for event in duty.events() {
            match event {
                DutyEvent::Crew { span, .. } => check_span(subject.clone(), span, &mut violations),
                DutyEvent::Vehicle(key) => {
                    if index.vehicle(key.vehicle_id.as_str()).is_none() {
                        violations.push(Violation::new(
                            rule,
                            vec![subject.clone(), EntityRef::Vehicle(key.vehicle_id.clone())],
                            format!("{subject} references unknown vehicle {}", key.vehicle_id),
                        ));
                    } else if index.vehicle_event(key).is_none() {
                        violations.push(Violation::new(
                            rule,
                            vec![subject.clone(), EntityRef::VehicleEvent(key.clone())],
                            format!("{subject} references unknown vehicle event {key}"),
                        ));
                    }
                }
            }
        }
    }

    violations
}
