//! Reduced test fixtures.
//!
//! [`subset_document`] cuts a document down to a chosen set of duties and
//! everything they reach: the vehicles they work, the trips those vehicles
//! run, and every stop those records mention. Vehicles are kept whole, so a
//! clean document stays clean after subsetting.

use std::collections::HashSet;

use tracing::debug;

use crate::document::{Document, DutyRecord};
use crate::domain::{DutyEventType, DutyId, VehicleEventType};

/// Error from subsetting a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubsetError {
    #[error("duty {0:?} not found in document")]
    UnknownDuty(String),
}

/// Keep only `duty_ids` and the records they reference.
///
/// Records keep their document order. References that do not resolve are
/// dropped silently; the validator reports them on the full document.
pub fn subset_document(document: &Document, duty_ids: &[DutyId]) -> Result<Document, SubsetError> {
    let wanted: HashSet<&str> = duty_ids.iter().map(DutyId::as_str).collect();
    let duties: Vec<&DutyRecord> = document
        .duties
        .iter()
        .flatten()
        .filter(|d| d.duty_id.as_deref().is_some_and(|id| wanted.contains(id)))
        .collect();

    for id in duty_ids {
        if !duties.iter().any(|d| d.duty_id.as_deref() == Some(id.as_str())) {
            return Err(SubsetError::UnknownDuty(id.to_string()));
        }
    }

    let mut vehicle_ids: HashSet<&str> = HashSet::new();
    let mut trip_ids: HashSet<&str> = HashSet::new();
    let mut stop_ids: HashSet<&str> = HashSet::new();

    for event in duties.iter().flat_map(|d| d.duty_events.iter().flatten()) {
        if event.duty_event_type.as_deref() == Some(DutyEventType::VehicleEvent.as_str()) {
            vehicle_ids.extend(event.vehicle_id.as_deref());
        } else {
            stop_ids.extend(event.origin_stop_id.as_deref());
            stop_ids.extend(event.destination_stop_id.as_deref());
        }
    }

    let vehicles: Vec<_> = document
        .vehicles
        .iter()
        .flatten()
        .filter(|v| v.vehicle_id.as_deref().is_some_and(|id| vehicle_ids.contains(id)))
        .collect();

    for event in vehicles.iter().flat_map(|v| v.vehicle_events.iter().flatten()) {
        if event.vehicle_event_type.as_deref() == Some(VehicleEventType::ServiceTrip.as_str()) {
            trip_ids.extend(event.trip_id.as_deref());
        } else {
            stop_ids.extend(event.origin_stop_id.as_deref());
            stop_ids.extend(event.destination_stop_id.as_deref());
        }
    }

    let trips: Vec<_> = document
        .trips
        .iter()
        .flatten()
        .filter(|t| t.trip_id.as_deref().is_some_and(|id| trip_ids.contains(id)))
        .collect();

    for trip in &trips {
        stop_ids.extend(trip.origin_stop_id.as_deref());
        stop_ids.extend(trip.destination_stop_id.as_deref());
    }

    let stops: Vec<_> = document
        .stops
        .iter()
        .flatten()
        .filter(|s| s.stop_id.as_deref().is_some_and(|id| stop_ids.contains(id)))
        .cloned()
        .collect();

    debug!(
        duties = duties.len(),
        vehicles = vehicles.len(),
        trips = trips.len(),
        stops = stops.len(),
        "Subset document"
    );

    Ok(Document {
        stops: Some(stops),
        trips: Some(trips.into_iter().cloned().collect()),
        vehicles: Some(vehicles.into_iter().cloned().collect()),
        duties: Some(duties.into_iter().cloned().collect()),
    })
}
