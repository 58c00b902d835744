//! Inferred break records.

use std::fmt;

use serde::Serialize;

use crate::domain::{DutyId, EventKey, ScheduleTime, StopId, VehicleId};

/// What kind of rest period a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Gap between consecutive events of one vehicle inside one duty block.
    Layover,
    /// Gap where a duty moves from one vehicle to another.
    Split,
    /// The duty's breaks could not be derived.
    Indeterminate,
}

impl fmt::Display for BreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BreakKind::Layover => "layover",
            BreakKind::Split => "split",
            BreakKind::Indeterminate => "indeterminate",
        })
    }
}

/// Why a duty's breaks are indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminateReason {
    /// The duty's claims on a vehicle have gaps or repeats.
    NonContiguousClaims,
    /// A claimed vehicle event, or the trip behind it, does not resolve.
    UnresolvedReference,
}

impl fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndeterminateReason::NonContiguousClaims => "non_contiguous_claims",
            IndeterminateReason::UnresolvedReference => "unresolved_reference",
        })
    }
}

/// One end of a break: a `vehicle_event` entry of the duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundingEvent {
    /// Index of the entry in the duty's event list
    pub position: usize,
    pub event: EventKey,
}

impl BoundingEvent {
    pub fn new(position: usize, event: EventKey) -> Self {
        Self { position, event }
    }
}

/// When and where a break is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakGap {
    pub start: ScheduleTime,
    pub end: ScheduleTime,
    /// Negative if the bounding events overlap.
    pub minutes: i64,
    /// Destination of the event before the break.
    pub stop_id: StopId,
}

impl BreakGap {
    pub fn new(start: ScheduleTime, end: ScheduleTime, stop_id: StopId) -> Self {
        Self {
            start,
            end,
            minutes: end.minutes_since(start),
            stop_id,
        }
    }
}

/// A rest period inferred from event ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredBreak {
    pub kind: BreakKind,
    pub duty_id: DutyId,
    /// One vehicle for layovers, two for splits.
    pub vehicle_ids: Vec<VehicleId>,
    /// Bounds in time order. For a layover `to` is the next event of the
    /// vehicle after `from`, wherever the duty lists it; for a split `to`
    /// comes after `from` in the duty list.
    pub from: BoundingEvent,
    pub to: BoundingEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<BreakGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IndeterminateReason>,
}

impl InferredBreak {
    pub fn layover(
        duty_id: DutyId,
        vehicle_id: VehicleId,
        from: BoundingEvent,
        to: BoundingEvent,
        gap: BreakGap,
    ) -> Self {
        Self {
            kind: BreakKind::Layover,
            duty_id,
            vehicle_ids: vec![vehicle_id],
            from,
            to,
            gap: Some(gap),
            reason: None,
        }
    }

    pub fn split(duty_id: DutyId, from: BoundingEvent, to: BoundingEvent, gap: BreakGap) -> Self {
        Self {
            kind: BreakKind::Split,
            duty_id,
            vehicle_ids: vec![from.event.vehicle_id.clone(), to.event.vehicle_id.clone()],
            from,
            to,
            gap: Some(gap),
            reason: None,
        }
    }

    pub fn indeterminate(
        duty_id: DutyId,
        vehicle_id: VehicleId,
        from: BoundingEvent,
        to: BoundingEvent,
        reason: IndeterminateReason,
    ) -> Self {
        Self {
            kind: BreakKind::Indeterminate,
            duty_id,
            vehicle_ids: vec![vehicle_id],
            from,
            to,
            gap: None,
            reason: Some(reason),
        }
    }
}

impl fmt::Display for InferredBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in duty {}: {} -> {}",
            self.kind, self.duty_id, self.from.event, self.to.event
        )?;
        if let Some(gap) = &self.gap {
            write!(f, " ({} min at {}, {})", gap.minutes, gap.stop_id, gap.start)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Put breaks in report order: by duty id, then by the `from` position.
///
/// The sort is stable.
pub fn sort_breaks(breaks: &mut [InferredBreak]) {
    breaks.sort_by(|a, b| {
        (&a.duty_id, a.from.position).cmp(&(&b.duty_id, b.from.position))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventSequence;

    fn bound(position: usize, vehicle: &str, seq: u32) -> BoundingEvent {
        BoundingEvent::new(position, EventKey::new(vehicle.into(), EventSequence(seq)))
    }

    fn time(s: &str) -> ScheduleTime {
        ScheduleTime::parse(s).unwrap()
    }

    #[test]
    fn gap_minutes_cross_midnight() {
        let gap = BreakGap::new(time("0.23:50"), time("1.00:20"), StopId::new("S1"));
        assert_eq!(gap.minutes, 30);
    }

    #[test]
    fn display() {
        let split = InferredBreak::split(
            DutyId::new("D1"),
            bound(2, "V1", 2),
            bound(3, "V2", 1),
            BreakGap::new(time("0.09:00"), time("0.09:20"), StopId::new("S2")),
        );
        assert_eq!(split.vehicle_ids, vec![VehicleId::new("V1"), VehicleId::new("V2")]);
        assert_eq!(
            split.to_string(),
            "split in duty D1: V1#2 -> V2#1 (20 min at S2, 0.09:00)"
        );

        let stuck = InferredBreak::indeterminate(
            DutyId::new("D2"),
            VehicleId::new("V1"),
            bound(1, "V1", 1),
            bound(2, "V1", 3),
            IndeterminateReason::NonContiguousClaims,
        );
        assert_eq!(
            stuck.to_string(),
            "indeterminate in duty D2: V1#1 -> V1#3 (non_contiguous_claims)"
        );
    }

    #[test]
    fn json_omits_empty_fields() {
        let stuck = InferredBreak::indeterminate(
            DutyId::new("D2"),
            VehicleId::new("V1"),
            bound(1, "V1", 1),
            bound(1, "V1", 1),
            IndeterminateReason::UnresolvedReference,
        );
        let json = serde_json::to_value(&stuck).unwrap();
        assert_eq!(json["kind"], "indeterminate");
        assert_eq!(json["reason"], "unresolved_reference");
        assert_eq!(json["from"]["event"]["vehicle_id"], "V1");
        assert!(json.get("gap").is_none());
    }

    #[test]
    fn sort_by_duty_then_position() {
        let gap = || BreakGap::new(time("0.09:00"), time("0.09:10"), StopId::new("S"));
        let mut breaks = vec![
            InferredBreak::split(DutyId::new("D2"), bound(1, "V1", 1), bound(2, "V2", 1), gap()),
            InferredBreak::split(DutyId::new("D1"), bound(5, "V1", 1), bound(6, "V2", 1), gap()),
            InferredBreak::layover(
                DutyId::new("D1"),
                VehicleId::new("V1"),
                bound(3, "V1", 1),
                bound(4, "V1", 2),
                gap(),
            ),
        ];
        sort_breaks(&mut breaks);

        let keys: Vec<(&str, usize)> = breaks
            .iter()
            .map(|b| (b.duty_id.as_str(), b.from.position))
            .collect();
        assert_eq!(keys, vec![("D1", 3), ("D1", 5), ("D2", 1)]);
    }
}
