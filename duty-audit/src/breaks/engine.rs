//! Layover and split inference over one duty at a time.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{Dataset, Duty, EventKey, EventSpan, VehicleId};
use crate::index::ReferenceIndex;
use crate::validate::check_contiguity;

use super::types::{
    BoundingEvent, BreakGap, IndeterminateReason, InferredBreak, sort_breaks,
};

/// A `vehicle_event` entry of a duty with its resolved span.
#[derive(Debug)]
struct Claim<'d> {
    position: usize,
    key: &'d EventKey,
    span: EventSpan,
}

impl Claim<'_> {
    fn bound(&self) -> BoundingEvent {
        BoundingEvent::new(self.position, self.key.clone())
    }
}

/// Infer breaks for every duty, in report order.
pub fn infer_breaks(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<InferredBreak> {
    let mut breaks: Vec<InferredBreak> = dataset
        .duties
        .iter()
        .flat_map(|duty| infer_duty(duty, index))
        .collect();
    sort_breaks(&mut breaks);

    debug!(
        duties = dataset.duties.len(),
        breaks = breaks.len(),
        "Inferred breaks"
    );
    breaks
}

/// Infer the breaks of a single duty, ordered by duty-list position.
///
/// If any claimed vehicle has non-contiguous claims, or any claimed event
/// cannot be placed in time, only `Indeterminate` records are returned.
pub fn infer_duty(duty: &Duty, index: &ReferenceIndex<'_>) -> Vec<InferredBreak> {
    let mut indeterminate = non_contiguous(duty);

    let mut claims = Vec::new();
    for (position, key) in duty.vehicle_claims() {
        let span = index
            .vehicle_event(key)
            .and_then(|event| index.event_span(event));
        match span {
            Some(span) => claims.push(Claim { position, key, span }),
            None => {
                warn!(
                    duty_id = %duty.duty_id,
                    event = %key,
                    "Claimed vehicle event cannot be resolved"
                );
                let bound = BoundingEvent::new(position, key.clone());
                indeterminate.push(InferredBreak::indeterminate(
                    duty.duty_id.clone(),
                    key.vehicle_id.clone(),
                    bound.clone(),
                    bound,
                    IndeterminateReason::UnresolvedReference,
                ));
            }
        }
    }

    if !indeterminate.is_empty() {
        indeterminate.sort_by_key(|b| b.from.position);
        return indeterminate;
    }

    let blocks = vehicle_blocks(&claims);
    let mut breaks = Vec::new();

    for pair in blocks.windows(2) {
        let (Some(last), Some(first)) = (pair[0].last(), pair[1].first()) else {
            continue;
        };
        breaks.push(InferredBreak::split(
            duty.duty_id.clone(),
            last.bound(),
            first.bound(),
            gap_between(&last.span, &first.span),
        ));
    }

    // Claims are contiguous here, so each event's successor is `sequence + 1`
    let mut placed: HashMap<&EventKey, (usize, &Claim<'_>)> = HashMap::new();
    for (block_no, block) in blocks.iter().enumerate() {
        for claim in block.iter() {
            placed.insert(claim.key, (block_no, claim));
        }
    }

    for (block_no, block) in blocks.iter().enumerate() {
        for prev in block.iter() {
            let successor = EventKey::new(prev.key.vehicle_id.clone(), prev.key.sequence.next());
            let Some(&(next_block, next)) = placed.get(&successor) else {
                continue;
            };
            if next_block == block_no && !prev.span.adjoins(&next.span) {
                breaks.push(InferredBreak::layover(
                    duty.duty_id.clone(),
                    prev.key.vehicle_id.clone(),
                    prev.bound(),
                    next.bound(),
                    gap_between(&prev.span, &next.span),
                ));
            }
        }
    }

    breaks.sort_by_key(|b| b.from.position);
    breaks
}

/// One indeterminate record per vehicle whose claims are not a range.
fn non_contiguous(duty: &Duty) -> Vec<InferredBreak> {
    let mut records = Vec::new();
    for vehicle_id in duty.vehicle_ids() {
        if let Err(gap) = check_contiguity(&duty.claimed_sequences(vehicle_id)) {
            debug!(
                duty_id = %duty.duty_id,
                vehicle_id = %vehicle_id,
                %gap,
                "Claims are not contiguous"
            );
            let Some((from, to)) = claim_extent(duty, vehicle_id) else {
                continue;
            };
            records.push(InferredBreak::indeterminate(
                duty.duty_id.clone(),
                vehicle_id.clone(),
                from,
                to,
                IndeterminateReason::NonContiguousClaims,
            ));
        }
    }
    records
}

/// First and last entries of the duty that claim `vehicle_id`.
fn claim_extent(duty: &Duty, vehicle_id: &VehicleId) -> Option<(BoundingEvent, BoundingEvent)> {
    let mut claims = duty
        .vehicle_claims()
        .filter(|(_, key)| &key.vehicle_id == vehicle_id)
        .map(|(position, key)| BoundingEvent::new(position, key.clone()));
    let first = claims.next()?;
    let last = claims.last().unwrap_or_else(|| first.clone());
    Some((first, last))
}

/// Maximal runs of claims on the same vehicle, in duty-list order.
///
/// Crew entries between two claims do not end a run, since `claims` only
/// holds the duty's `vehicle_event` entries.
fn vehicle_blocks<'c, 'd>(claims: &'c [Claim<'d>]) -> Vec<&'c [Claim<'d>]> {
    claims
        .chunk_by(|a, b| a.key.vehicle_id == b.key.vehicle_id)
        .collect()
}

fn gap_between(before: &EventSpan, after: &EventSpan) -> BreakGap {
    BreakGap::new(before.end, after.start, before.destination_stop_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::BreakKind;
    use crate::domain::{
        DutyEvent, DutyEventType, DutyId, EventSequence, ScheduleTime, StopId, Trip, TripId,
        Vehicle, VehicleEvent, VehicleEventType,
    };

    fn time(s: &str) -> ScheduleTime {
        ScheduleTime::parse(s).unwrap()
    }

    fn span(origin: &str, destination: &str, start: &str, end: &str) -> EventSpan {
        EventSpan {
            origin_stop_id: StopId::new(origin),
            destination_stop_id: StopId::new(destination),
            start: time(start),
            end: time(end),
        }
    }

    fn deadhead(seq: u32, span: EventSpan) -> VehicleEvent {
        VehicleEvent {
            sequence: EventSequence(seq),
            kind: VehicleEventType::Deadhead,
            trip_id: None,
            span: Some(span),
            duty_id: None,
        }
    }

    fn service(seq: u32, trip_id: &str) -> VehicleEvent {
        VehicleEvent {
            sequence: EventSequence(seq),
            kind: VehicleEventType::ServiceTrip,
            trip_id: Some(TripId::new(trip_id)),
            span: None,
            duty_id: None,
        }
    }

    fn trip(id: &str, origin: &str, destination: &str, dep: &str, arr: &str) -> Trip {
        Trip {
            trip_id: TripId::new(id),
            route_number: None,
            origin_stop_id: StopId::new(origin),
            destination_stop_id: StopId::new(destination),
            departure: time(dep),
            arrival: time(arr),
        }
    }

    fn crew(kind: DutyEventType, at: &str) -> DutyEvent {
        DutyEvent::Crew {
            kind,
            span: span("A", "A", at, at),
        }
    }

    fn claim(vehicle: &str, seq: u32) -> DutyEvent {
        DutyEvent::Vehicle(EventKey::new(vehicle.into(), EventSequence(seq)))
    }

    fn dataset(vehicles: Vec<Vehicle>, trips: Vec<Trip>, events: Vec<DutyEvent>) -> Dataset {
        Dataset {
            stops: vec![],
            trips,
            vehicles,
            duties: vec![Duty {
                duty_id: DutyId::new("D1"),
                events,
            }],
        }
    }

    fn infer(data: &Dataset) -> Vec<InferredBreak> {
        let index = ReferenceIndex::build(data).unwrap();
        infer_duty(&data.duties[0], &index)
    }

    #[test]
    fn one_split_at_vehicle_change() {
        let data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![
                        deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                        deadhead(2, span("B", "C", "0.08:30", "0.09:00")),
                    ],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![deadhead(1, span("C", "A", "0.09:25", "0.10:00"))],
                },
            ],
            vec![],
            vec![
                crew(DutyEventType::SignOn, "0.07:50"),
                claim("V1", 1),
                claim("V1", 2),
                claim("V2", 1),
                crew(DutyEventType::SignOff, "0.10:05"),
            ],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        let split = &breaks[0];
        assert_eq!(split.kind, BreakKind::Split);
        assert_eq!(split.vehicle_ids, vec![VehicleId::new("V1"), VehicleId::new("V2")]);
        assert_eq!(split.from.position, 2);
        assert_eq!(split.from.event.to_string(), "V1#2");
        assert_eq!(split.to.position, 3);
        assert_eq!(split.to.event.to_string(), "V2#1");

        let gap = split.gap.as_ref().unwrap();
        assert_eq!(gap.start, time("0.09:00"));
        assert_eq!(gap.end, time("0.09:25"));
        assert_eq!(gap.minutes, 25);
        assert_eq!(gap.stop_id, StopId::new("C"));
        assert!(split.reason.is_none());
    }

    #[test]
    fn split_is_recorded_even_without_a_gap() {
        let data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![deadhead(1, span("A", "B", "0.08:00", "0.08:30"))],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![deadhead(4, span("B", "A", "0.08:30", "0.09:00"))],
                },
            ],
            vec![],
            vec![claim("V1", 1), claim("V2", 4)],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].kind, BreakKind::Split);
        assert_eq!(breaks[0].gap.as_ref().unwrap().minutes, 0);
    }

    #[test]
    fn one_layover_between_service_trips() {
        let data = dataset(
            vec![Vehicle {
                vehicle_id: "V".into(),
                events: vec![service(1, "T1"), service(2, "T2")],
            }],
            vec![
                trip("T1", "A", "B", "0.08:00", "0.08:40"),
                trip("T2", "B", "A", "0.08:55", "0.09:30"),
            ],
            vec![
                crew(DutyEventType::SignOn, "0.07:50"),
                claim("V", 1),
                claim("V", 2),
                crew(DutyEventType::SignOff, "0.09:40"),
            ],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        let layover = &breaks[0];
        assert_eq!(layover.kind, BreakKind::Layover);
        assert_eq!(layover.vehicle_ids, vec![VehicleId::new("V")]);
        assert_eq!(layover.from.event.sequence, EventSequence(1));
        assert_eq!(layover.to.event.sequence, EventSequence(2));

        let gap = layover.gap.as_ref().unwrap();
        assert_eq!(gap.minutes, 15);
        assert_eq!(gap.stop_id, StopId::new("B"));
    }

    #[test]
    fn adjoining_events_have_no_layover() {
        let data = dataset(
            vec![Vehicle {
                vehicle_id: "V".into(),
                events: vec![service(1, "T1"), deadhead(2, span("B", "A", "0.08:40", "0.09:00"))],
            }],
            vec![trip("T1", "A", "B", "0.08:00", "0.08:40")],
            vec![claim("V", 1), claim("V", 2)],
        );
        assert!(infer(&data).is_empty());
    }

    #[test]
    fn layover_follows_sequence_order_not_list_order() {
        let data = dataset(
            vec![Vehicle {
                vehicle_id: "V".into(),
                events: vec![
                    deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                    deadhead(2, span("B", "C", "0.08:45", "0.09:00")),
                ],
            }],
            vec![],
            vec![claim("V", 2), claim("V", 1)],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].from.position, 1);
        assert_eq!(breaks[0].from.event.sequence, EventSequence(1));
        assert_eq!(breaks[0].to.position, 0);
    }

    #[test]
    fn layover_needs_consecutive_events_in_one_block() {
        let data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![
                        deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                        deadhead(2, span("B", "C", "0.09:00", "0.09:30")),
                        deadhead(3, span("C", "A", "0.10:00", "0.10:30")),
                    ],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![deadhead(1, span("A", "B", "0.10:45", "0.11:00"))],
                },
            ],
            vec![],
            vec![claim("V1", 1), claim("V1", 3), claim("V2", 1), claim("V1", 2)],
        );

        // V1#1 and V1#3 share a block but V1#2 lies between them
        let breaks = infer(&data);
        let kinds: Vec<BreakKind> = breaks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BreakKind::Split, BreakKind::Split]);
        assert_eq!(breaks[0].from.event.to_string(), "V1#3");
        assert_eq!(breaks[0].to.event.to_string(), "V2#1");
        assert_eq!(breaks[1].from.event.to_string(), "V2#1");
        assert_eq!(breaks[1].to.event.to_string(), "V1#2");
    }

    #[test]
    fn gap_in_claims_is_indeterminate() {
        let data = dataset(
            vec![Vehicle {
                vehicle_id: "V".into(),
                events: vec![
                    deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                    deadhead(2, span("B", "C", "0.08:30", "0.09:00")),
                    deadhead(3, span("C", "A", "0.09:30", "0.10:00")),
                ],
            }],
            vec![],
            vec![claim("V", 1), claim("V", 3)],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        let stuck = &breaks[0];
        assert_eq!(stuck.kind, BreakKind::Indeterminate);
        assert_eq!(stuck.reason, Some(IndeterminateReason::NonContiguousClaims));
        assert_eq!(stuck.vehicle_ids, vec![VehicleId::new("V")]);
        assert_eq!(stuck.from.event.sequence, EventSequence(1));
        assert_eq!(stuck.to.event.sequence, EventSequence(3));
        assert!(stuck.gap.is_none());
    }

    #[test]
    fn indeterminate_suppresses_other_breaks() {
        let data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![deadhead(1, span("A", "B", "0.08:00", "0.08:30"))],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![
                        deadhead(1, span("B", "C", "0.09:00", "0.09:30")),
                        deadhead(2, span("C", "B", "0.09:45", "0.10:00")),
                    ],
                },
            ],
            vec![],
            // V1 is claimed twice; the V1 -> V2 split is not reported
            vec![claim("V1", 1), claim("V1", 1), claim("V2", 1), claim("V2", 2)],
        );

        let breaks = infer(&data);
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].kind, BreakKind::Indeterminate);
        assert_eq!(breaks[0].vehicle_ids, vec![VehicleId::new("V1")]);
    }

    #[test]
    fn unresolved_claim_is_indeterminate() {
        let data = dataset(
            vec![Vehicle {
                vehicle_id: "V".into(),
                events: vec![
                    deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                    service(2, "T404"),
                ],
            }],
            vec![],
            vec![claim("V", 1), claim("V", 2), claim("W", 1)],
        );

        let breaks = infer(&data);
        let positions: Vec<usize> = breaks.iter().map(|b| b.from.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(breaks.iter().all(|b| b.kind == BreakKind::Indeterminate
            && b.reason == Some(IndeterminateReason::UnresolvedReference)));
    }

    #[test]
    fn returning_to_a_vehicle_is_two_splits() {
        let data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![
                        deadhead(1, span("A", "B", "0.08:00", "0.08:30")),
                        deadhead(2, span("C", "A", "0.10:00", "0.10:30")),
                    ],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![deadhead(1, span("B", "C", "0.09:00", "0.09:30"))],
                },
            ],
            vec![],
            vec![
                claim("V1", 1),
                crew(DutyEventType::Taxi, "0.08:45"),
                claim("V2", 1),
                claim("V1", 2),
            ],
        );

        let breaks = infer(&data);
        let kinds: Vec<BreakKind> = breaks.iter().map(|b| b.kind).collect();
        // V1#1 and V1#2 sit in different blocks, so there is no layover
        assert_eq!(kinds, vec![BreakKind::Split, BreakKind::Split]);
        assert_eq!(breaks[0].from.position, 0);
        assert_eq!(breaks[0].to.position, 2);
        assert_eq!(breaks[1].from.position, 2);
        assert_eq!(breaks[1].gap.as_ref().unwrap().minutes, 30);
    }

    #[test]
    fn crew_only_duty_has_no_breaks() {
        let data = dataset(
            vec![],
            vec![],
            vec![
                crew(DutyEventType::SignOn, "0.07:00"),
                crew(DutyEventType::SignOff, "0.15:00"),
            ],
        );
        assert!(infer(&data).is_empty());
    }

    #[test]
    fn all_duties_sorted_by_id() {
        let mut data = dataset(
            vec![
                Vehicle {
                    vehicle_id: "V1".into(),
                    events: vec![deadhead(1, span("A", "B", "0.08:00", "0.08:30"))],
                },
                Vehicle {
                    vehicle_id: "V2".into(),
                    events: vec![deadhead(1, span("B", "A", "0.09:00", "0.09:30"))],
                },
            ],
            vec![],
            vec![claim("V1", 1), claim("V2", 1)],
        );
        data.duties.insert(
            0,
            Duty {
                duty_id: DutyId::new("D2"),
                events: vec![claim("V1", 1), claim("V2", 1)],
            },
        );

        let index = ReferenceIndex::build(&data).unwrap();
        let breaks = infer_breaks(&data, &index);
        let duties: Vec<&str> = breaks.iter().map(|b| b.duty_id.as_str()).collect();
        assert_eq!(duties, vec!["D1", "D2"]);
    }
}
