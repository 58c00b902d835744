//! Time spans of schedule events.

use serde::Serialize;

use super::{ScheduleTime, StopId};

/// Where and when an event starts and ends.
///
/// Crew events and non-service vehicle events store this directly. Service
/// trips borrow it from their [`Trip`](super::Trip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSpan {
    pub origin_stop_id: StopId,
    pub destination_stop_id: StopId,
    pub start: ScheduleTime,
    pub end: ScheduleTime,
}

impl EventSpan {
    /// Returns true if `next` starts at the instant this span ends.
    pub fn adjoins(&self, next: &EventSpan) -> bool {
        self.end == next.start
    }

    /// Length of the span in whole minutes.
    pub fn duration_mins(&self) -> i64 {
        self.end.minutes_since(self.start)
    }
}
