//! Which gaps count as breaks in the duty-breaks report.

use crate::domain::{DutyEventType, VehicleEventType};

/// Downstream break policy.
///
/// Inference reports every gap; the policy decides which ones are worth
/// listing. Events whose type is listed as an explicit break type count as
/// breaks in their own right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakPolicy {
    /// Breaks shorter than this are dropped (minutes).
    pub min_duration_mins: i64,

    /// Vehicle event types that are breaks in themselves.
    pub explicit_vehicle_types: Vec<VehicleEventType>,

    /// Crew event types that are breaks in themselves.
    pub explicit_duty_types: Vec<DutyEventType>,
}

impl BreakPolicy {
    /// Create a new policy with the given parameters.
    pub fn new(
        min_duration_mins: i64,
        explicit_vehicle_types: Vec<VehicleEventType>,
        explicit_duty_types: Vec<DutyEventType>,
    ) -> Self {
        Self {
            min_duration_mins,
            explicit_vehicle_types,
            explicit_duty_types,
        }
    }

    pub fn is_long_enough(&self, minutes: i64) -> bool {
        minutes >= self.min_duration_mins
    }

    pub fn is_explicit_vehicle_break(&self, kind: VehicleEventType) -> bool {
        self.explicit_vehicle_types.contains(&kind)
    }

    pub fn is_explicit_duty_break(&self, kind: DutyEventType) -> bool {
        self.explicit_duty_types.contains(&kind)
    }
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            min_duration_mins: 16,
            explicit_vehicle_types: vec![],
            explicit_duty_types: vec![],
        }
    }
}
