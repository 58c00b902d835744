//! Reference index over a dataset.
//!
//! Entities refer to each other only by id. The index turns those ids back
//! into entities with O(1) lookups, including the composite
//! `(vehicle_id, sequence)` key that duties use to point into vehicle
//! timelines. It borrows the dataset, is cheap to rebuild, and holds no
//! state of its own beyond the maps.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use tracing::debug;

use crate::domain::{
    Dataset, Duty, DutyEvent, EventKey, EventSequence, EventSpan, SchemaError, Stop, Trip,
    Vehicle, VehicleEvent, VehicleId,
};

/// Entity families addressable by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Stop,
    Trip,
    Vehicle,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Stop => "stop",
            EntityKind::Trip => "trip",
            EntityKind::Vehicle => "vehicle",
        })
    }
}

/// An entity returned by [`ReferenceIndex::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Stop(&'a Stop),
    Trip(&'a Trip),
    Vehicle(&'a Vehicle),
}

/// An id that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {id:?} not found")]
pub struct NotFound {
    pub kind: EntityKind,
    pub id: String,
}

/// Id-to-entity lookups for one dataset.
#[derive(Debug)]
pub struct ReferenceIndex<'a> {
    stops: HashMap<&'a str, &'a Stop>,
    trips: HashMap<&'a str, &'a Trip>,
    vehicles: HashMap<&'a str, &'a Vehicle>,
    /// vehicle id -> sequence -> event
    events: HashMap<&'a str, HashMap<EventSequence, &'a VehicleEvent>>,
}

impl<'a> ReferenceIndex<'a> {
    /// Build the index.
    ///
    /// Fails if two entities of one collection share an id, or if a vehicle
    /// has two events with the same sequence number.
    pub fn build(dataset: &'a Dataset) -> Result<Self, SchemaError> {
        let stops = unique_by_id(&dataset.stops, "stops", |s| s.stop_id.as_str())?;
        let trips = unique_by_id(&dataset.trips, "trips", |t| t.trip_id.as_str())?;
        let vehicles = unique_by_id(&dataset.vehicles, "vehicles", |v| v.vehicle_id.as_str())?;

        // Duties are not looked up by id, but their ids must still be unique.
        unique_by_id(&dataset.duties, "duties", |d| d.duty_id.as_str())?;

        let mut events = HashMap::with_capacity(dataset.vehicles.len());
        for vehicle in &dataset.vehicles {
            let mut by_sequence = HashMap::with_capacity(vehicle.events.len());
            for event in &vehicle.events {
                if by_sequence.insert(event.sequence, event).is_some() {
                    return Err(SchemaError::DuplicateEventSequence {
                        vehicle_id: vehicle.vehicle_id.clone(),
                        sequence: event.sequence,
                    });
                }
            }
            events.insert(vehicle.vehicle_id.as_str(), by_sequence);
        }

        debug!(
            stops = stops.len(),
            trips = trips.len(),
            vehicles = vehicles.len(),
            "Built reference index"
        );

        Ok(Self {
            stops,
            trips,
            vehicles,
            events,
        })
    }

    /// Resolve an id of the given kind.
    pub fn resolve(&self, kind: EntityKind, id: &str) -> Result<Entity<'a>, NotFound> {
        let found = match kind {
            EntityKind::Stop => self.stop(id).map(Entity::Stop),
            EntityKind::Trip => self.trip(id).map(Entity::Trip),
            EntityKind::Vehicle => self.vehicle(id).map(Entity::Vehicle),
        };
        found.ok_or_else(|| NotFound {
            kind,
            id: id.to_string(),
        })
    }

    pub fn stop(&self, id: &str) -> Option<&'a Stop> {
        self.stops.get(id).copied()
    }

    pub fn trip(&self, id: &str) -> Option<&'a Trip> {
        self.trips.get(id).copied()
    }

    pub fn vehicle(&self, id: &str) -> Option<&'a Vehicle> {
        self.vehicles.get(id).copied()
    }

    /// Look up a vehicle event by its composite key.
    pub fn vehicle_event(&self, key: &EventKey) -> Option<&'a VehicleEvent> {
        self.events
            .get(key.vehicle_id.as_str())?
            .get(&key.sequence)
            .copied()
    }

    /// Events of `vehicle_id` claimed by `duty`, in sequence order.
    ///
    /// Claims that do not resolve are skipped.
    pub fn claimed_events(&self, duty: &Duty, vehicle_id: &VehicleId) -> Vec<&'a VehicleEvent> {
        duty.claimed_sequences(vehicle_id)
            .into_iter()
            .filter_map(|sequence| {
                self.vehicle_event(&EventKey::new(vehicle_id.clone(), sequence))
            })
            .collect()
    }

    /// Where and when a vehicle event happens.
    ///
    /// Service trips take their span from the trip they carry; other events
    /// carry their own. Returns `None` if a service trip's trip is missing
    /// or does not resolve.
    pub fn event_span(&self, event: &VehicleEvent) -> Option<EventSpan> {
        if event.is_service_trip() {
            let trip_id = event.trip_id.as_ref()?;
            return self.trip(trip_id.as_str()).map(Trip::span);
        }
        event.span.clone()
    }

    /// Where and when a duty event happens, following vehicle event keys.
    pub fn duty_event_span(&self, event: &DutyEvent) -> Option<EventSpan> {
        match event {
            DutyEvent::Crew { span, .. } => Some(span.clone()),
            DutyEvent::Vehicle(key) => self.event_span(self.vehicle_event(key)?),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}

fn unique_by_id<'a, T>(
    items: &'a [T],
    collection: &'static str,
    id: impl Fn(&'a T) -> &'a str,
) -> Result<HashMap<&'a str, &'a T>, SchemaError> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        match map.entry(id(item)) {
            Entry::Occupied(entry) => {
                return Err(SchemaError::DuplicateId {
                    collection,
                    id: (*entry.key()).to_string(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(item);
            }
        }
    }
    Ok(map)
}
