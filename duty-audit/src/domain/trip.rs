//! Trips: timetabled passenger services.

use super::{EventSpan, ScheduleTime, StopId, TripId};

/// A timetabled trip between two stops.
///
/// Trips are shared reference data. They only enter a vehicle's timeline as
/// the cargo of a `service_trip` vehicle event.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub trip_id: TripId,
    pub route_number: Option<String>,
    pub origin_stop_id: StopId,
    pub destination_stop_id: StopId,
    pub departure: ScheduleTime,
    pub arrival: ScheduleTime,
}

impl Trip {
    /// The time span and endpoints of this trip.
    pub fn span(&self) -> EventSpan {
        EventSpan {
            origin_stop_id: self.origin_stop_id.clone(),
            destination_stop_id: self.destination_stop_id.clone(),
            start: self.departure,
            end: self.arrival,
        }
    }

    /// Returns true if the trip starts or ends at `stop_id`.
    pub fn serves(&self, stop_id: &StopId) -> bool {
        &self.origin_stop_id == stop_id || &self.destination_stop_id == stop_id
    }
}
