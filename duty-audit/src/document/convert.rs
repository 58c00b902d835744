//! Conversion from document DTOs to domain types.
//!
//! Required fields are checked here, record by record, and every failure
//! names the record's location in the document (e.g.
//! `vehicles[2].vehicle_events[5]`). Id references are NOT resolved here;
//! that is the job of the reference index and the validator.

use crate::domain::{
    Dataset, Duty, DutyEvent, DutyEventType, DutyId, EventKey, EventSequence, EventSpan,
    ScheduleTime, SchemaError, Stop, StopId, Trip, TripId, Vehicle, VehicleEvent,
    UnknownEventType, VehicleEventType, VehicleId,
};

use super::types::{
    Document, DutyEventRecord, DutyRecord, SequenceValue, StopRecord, TripRecord,
    VehicleEventRecord, VehicleRecord,
};

impl Dataset {
    /// Build the domain model from a parsed document.
    ///
    /// Fails on the first missing or unparseable required field. No partial
    /// model is produced.
    pub fn from_document(document: &Document) -> Result<Self, SchemaError> {
        convert_document(document)
    }
}

/// Convert a whole document.
pub fn convert_document(document: &Document) -> Result<Dataset, SchemaError> {
    let stops = collection(&document.stops, "stops")?
        .iter()
        .enumerate()
        .map(|(i, record)| convert_stop(record, &format!("stops[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let trips = collection(&document.trips, "trips")?
        .iter()
        .enumerate()
        .map(|(i, record)| convert_trip(record, &format!("trips[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let vehicles = collection(&document.vehicles, "vehicles")?
        .iter()
        .enumerate()
        .map(|(i, record)| convert_vehicle(record, &format!("vehicles[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let duties = collection(&document.duties, "duties")?
        .iter()
        .enumerate()
        .map(|(i, record)| convert_duty(record, &format!("duties[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dataset {
        stops,
        trips,
        vehicles,
        duties,
    })
}

fn collection<'a, T>(
    records: &'a Option<Vec<T>>,
    name: &'static str,
) -> Result<&'a [T], SchemaError> {
    records.as_deref().ok_or_else(|| SchemaError::MissingField {
        location: "document".to_string(),
        field: name,
    })
}

/// Convert a stop record.
pub fn convert_stop(record: &StopRecord, location: &str) -> Result<Stop, SchemaError> {
    Ok(Stop {
        stop_id: StopId::new(required(&record.stop_id, location, "stop_id")?),
        name: record.stop_name.clone(),
        latitude: *required(&record.latitude, location, "latitude")?,
        longitude: *required(&record.longitude, location, "longitude")?,
        is_depot: *required(&record.is_depot, location, "is_depot")?,
    })
}

/// Convert a trip record.
pub fn convert_trip(record: &TripRecord, location: &str) -> Result<Trip, SchemaError> {
    Ok(Trip {
        trip_id: TripId::new(required(&record.trip_id, location, "trip_id")?),
        route_number: record.route_number.clone(),
        origin_stop_id: StopId::new(required(&record.origin_stop_id, location, "origin_stop_id")?),
        destination_stop_id: StopId::new(required(
            &record.destination_stop_id,
            location,
            "destination_stop_id",
        )?),
        departure: time(&record.departure_time, location, "departure_time")?,
        arrival: time(&record.arrival_time, location, "arrival_time")?,
    })
}

/// Convert a vehicle record and its events.
pub fn convert_vehicle(record: &VehicleRecord, location: &str) -> Result<Vehicle, SchemaError> {
    let vehicle_id = VehicleId::new(required(&record.vehicle_id, location, "vehicle_id")?);
    let events = required(&record.vehicle_events, location, "vehicle_events")?
        .iter()
        .enumerate()
        .map(|(i, event)| {
            convert_vehicle_event(event, &format!("{location}.vehicle_events[{i}]"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Vehicle { vehicle_id, events })
}

/// Convert one vehicle event.
///
/// Non-service events must carry their own span. A `trip_id` is kept
/// whatever the event type, so the validator can report events that carry
/// one when they should not.
pub fn convert_vehicle_event(
    record: &VehicleEventRecord,
    location: &str,
) -> Result<VehicleEvent, SchemaError> {
    let sequence = sequence(
        &record.vehicle_event_sequence,
        location,
        "vehicle_event_sequence",
    )?;

    let kind_str = required(&record.vehicle_event_type, location, "vehicle_event_type")?;
    let kind: VehicleEventType = kind_str.parse().map_err(|e: UnknownEventType| {
        SchemaError::InvalidField {
            location: location.to_string(),
            field: "vehicle_event_type",
            value: kind_str.clone(),
            reason: e.to_string(),
        }
    })?;

    let span = if kind == VehicleEventType::ServiceTrip {
        None
    } else {
        Some(span(
            location,
            &record.origin_stop_id,
            &record.destination_stop_id,
            &record.start_time,
            &record.end_time,
        )?)
    };

    Ok(VehicleEvent {
        sequence,
        kind,
        trip_id: record.trip_id.as_deref().map(TripId::new),
        span,
        duty_id: record.duty_id.as_deref().map(DutyId::new),
    })
}

/// Convert a duty record and its events.
pub fn convert_duty(record: &DutyRecord, location: &str) -> Result<Duty, SchemaError> {
    let duty_id = DutyId::new(required(&record.duty_id, location, "duty_id")?);
    let events = required(&record.duty_events, location, "duty_events")?
        .iter()
        .enumerate()
        .map(|(i, event)| convert_duty_event(event, &format!("{location}.duty_events[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Duty { duty_id, events })
}

/// Convert one duty event.
pub fn convert_duty_event(
    record: &DutyEventRecord,
    location: &str,
) -> Result<DutyEvent, SchemaError> {
    let kind_str = required(&record.duty_event_type, location, "duty_event_type")?;
    let kind: DutyEventType = kind_str.parse().map_err(|e: UnknownEventType| {
        SchemaError::InvalidField {
            location: location.to_string(),
            field: "duty_event_type",
            value: kind_str.clone(),
            reason: e.to_string(),
        }
    })?;

    if kind == DutyEventType::VehicleEvent {
        let vehicle_id = VehicleId::new(required(&record.vehicle_id, location, "vehicle_id")?);
        let sequence = sequence(
            &record.vehicle_event_sequence,
            location,
            "vehicle_event_sequence",
        )?;
        return Ok(DutyEvent::Vehicle(EventKey::new(vehicle_id, sequence)));
    }

    Ok(DutyEvent::Crew {
        kind,
        span: span(
            location,
            &record.origin_stop_id,
            &record.destination_stop_id,
            &record.start_time,
            &record.end_time,
        )?,
    })
}

fn required<'a, T>(
    value: &'a Option<T>,
    location: &str,
    field: &'static str,
) -> Result<&'a T, SchemaError> {
    value.as_ref().ok_or_else(|| SchemaError::MissingField {
        location: location.to_string(),
        field,
    })
}

fn time(
    value: &Option<String>,
    location: &str,
    field: &'static str,
) -> Result<ScheduleTime, SchemaError> {
    let raw = required(value, location, field)?;
    ScheduleTime::parse(raw).map_err(|e| SchemaError::InvalidField {
        location: location.to_string(),
        field,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

fn sequence(
    value: &Option<SequenceValue>,
    location: &str,
    field: &'static str,
) -> Result<EventSequence, SchemaError> {
    let raw = required(value, location, field)?;
    raw.as_u32()
        .map(EventSequence)
        .ok_or_else(|| SchemaError::InvalidField {
            location: location.to_string(),
            field,
            value: raw.to_string(),
            reason: "expected a non-negative integer".to_string(),
        })
}

fn span(
    location: &str,
    origin: &Option<String>,
    destination: &Option<String>,
    start: &Option<String>,
    end: &Option<String>,
) -> Result<EventSpan, SchemaError> {
    Ok(EventSpan {
        origin_stop_id: StopId::new(required(origin, location, "origin_stop_id")?),
        destination_stop_id: StopId::new(required(destination, location, "destination_stop_id")?),
        start: time(start, location, "start_time")?,
        end: time(end, location, "end_time")?,
    })
}
