//! Per-duty summaries and the breaks listed for each duty.

use tracing::warn;

use crate::breaks::{BreakKind, InferredBreak};
use crate::domain::{
    Dataset, Duty, DutyEvent, DutyId, EventKey, EventSpan, ScheduleTime, StopId, Trip,
};
use crate::index::ReferenceIndex;

use super::policy::BreakPolicy;

/// When a duty runs and where its service starts and ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutySummary {
    pub duty_id: DutyId,
    /// Start of the duty's first event.
    pub start: ScheduleTime,
    /// End of the duty's last event.
    pub end: ScheduleTime,
    /// Origin and destination names of the first and last service trips.
    /// `None` if the duty has no service trips.
    pub service_stops: Option<(String, String)>,
}

/// Why a duty cannot be summarised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unsummarizable {
    #[error("duty has no events")]
    NoEvents,

    #[error("vehicle event {0} cannot be resolved")]
    Unresolved(EventKey),
}

/// A break as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyBreak {
    pub start: ScheduleTime,
    pub minutes: i64,
    pub stop_name: String,
}

/// Summarise one duty.
pub fn summarize_duty(
    duty: &Duty,
    index: &ReferenceIndex<'_>,
) -> Result<DutySummary, Unsummarizable> {
    let (first, last) = match duty.events() {
        [] => return Err(Unsummarizable::NoEvents),
        [only] => (only, only),
        [first, .., last] => (first, last),
    };
    let start = span_of(index, first)?.start;
    let end = span_of(index, last)?.end;

    let trips = service_trips(duty, index)?;
    let service_stops = match (trips.first(), trips.last()) {
        (Some(first), Some(last)) => Some((
            stop_name(index, &first.origin_stop_id),
            stop_name(index, &last.destination_stop_id),
        )),
        _ => None,
    };

    Ok(DutySummary {
        duty_id: duty.duty_id.clone(),
        start,
        end,
        service_stops,
    })
}

/// Summarise every duty that can be summarised, ordered by duty id.
///
/// Duties that cannot be summarised are skipped with a warning.
pub fn summarize_duties(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<DutySummary> {
    dataset
        .duties_by_id()
        .into_iter()
        .filter_map(|duty| match summarize_duty(duty, index) {
            Ok(summary) => {
                if summary.service_stops.is_none() {
                    warn!(
                        duty_id = %duty.duty_id,
                        "Duty has no service trips; start and end stops unknown"
                    );
                }
                Some(summary)
            }
            Err(e) => {
                warn!(duty_id = %duty.duty_id, error = %e, "Skipping duty");
                None
            }
        })
        .collect()
}

/// Breaks of one duty that pass `policy`, ordered by start time.
///
/// Layovers and splits come from `inferred`; records of other duties are
/// ignored. Events of an explicit break type are added as breaks of their
/// own length. Returns `None` if the duty's inference was indeterminate or
/// an explicit break event cannot be resolved.
pub fn duty_breaks(
    duty: &Duty,
    index: &ReferenceIndex<'_>,
    inferred: &[InferredBreak],
    policy: &BreakPolicy,
) -> Option<Vec<DutyBreak>> {
    let mut breaks = Vec::new();

    for record in inferred.iter().filter(|b| b.duty_id == duty.duty_id) {
        match (record.kind, &record.gap) {
            (BreakKind::Indeterminate, _) => return None,
            (_, Some(gap)) => breaks.push(DutyBreak {
                start: gap.start,
                minutes: gap.minutes,
                stop_name: stop_name(index, &gap.stop_id),
            }),
            (_, None) => {}
        }
    }

    for event in duty.events() {
        let explicit = match event {
            DutyEvent::Crew { kind, .. } => policy.is_explicit_duty_break(*kind),
            DutyEvent::Vehicle(key) => {
                let vehicle_event = index.vehicle_event(key)?;
                policy.is_explicit_vehicle_break(vehicle_event.kind)
            }
        };
        if explicit {
            let span = index.duty_event_span(event)?;
            breaks.push(DutyBreak {
                start: span.start,
                minutes: span.duration_mins(),
                stop_name: stop_name(index, &span.destination_stop_id),
            });
        }
    }

    breaks.retain(|b| policy.is_long_enough(b.minutes));
    breaks.sort_by_key(|b| b.start);
    Some(breaks)
}

/// Trips of the duty's service trip events, in duty-list order.
fn service_trips<'a>(
    duty: &Duty,
    index: &ReferenceIndex<'a>,
) -> Result<Vec<&'a Trip>, Unsummarizable> {
    let mut trips = Vec::new();
    for (_, key) in duty.vehicle_claims() {
        let event = index
            .vehicle_event(key)
            .ok_or_else(|| Unsummarizable::Unresolved(key.clone()))?;
        if !event.is_service_trip() {
            continue;
        }
        let trip = event
            .trip_id
            .as_ref()
            .and_then(|id| index.trip(id.as_str()))
            .ok_or_else(|| Unsummarizable::Unresolved(key.clone()))?;
        trips.push(trip);
    }
    Ok(trips)
}

/// Display name of a stop; falls back to the id if the stop has no name or
/// does not resolve.
fn stop_name(index: &ReferenceIndex<'_>, stop_id: &StopId) -> String {
    index
        .stop(stop_id.as_str())
        .map_or(stop_id.as_str(), |stop| stop.display_name())
        .to_string()
}

fn span_of(index: &ReferenceIndex<'_>, event: &DutyEvent) -> Result<EventSpan, Unsummarizable> {
    match event {
        DutyEvent::Crew { span, .. } => Ok(span.clone()),
        DutyEvent::Vehicle(key) => index
            .vehicle_event(key)
            .and_then(|e| index.event_span(e))
            .ok_or_else(|| Unsummarizable::Unresolved(key.clone())),
    }
}
