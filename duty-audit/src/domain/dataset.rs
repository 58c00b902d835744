//! The loaded scheduling dataset.

use super::{Duty, DutyId, Stop, Trip, Vehicle};

/// All four entity collections of one scheduling dataset.
///
/// The dataset is built once from an input document and is read-only
/// afterwards. Collections keep the order of the input document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub vehicles: Vec<Vehicle>,
    pub duties: Vec<Duty>,
}

impl Dataset {
    /// Find a duty by id.
    pub fn duty(&self, duty_id: &DutyId) -> Option<&Duty> {
        self.duties.iter().find(|d| &d.duty_id == duty_id)
    }

    /// Returns the duties ordered by id.
    pub fn duties_by_id(&self) -> Vec<&Duty> {
        let mut duties: Vec<_> = self.duties.iter().collect();
        duties.sort_by(|a, b| a.duty_id.cmp(&b.duty_id));
        duties
    }

    /// Returns true if the dataset has no entities at all.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
            && self.trips.is_empty()
            && self.vehicles.is_empty()
            && self.duties.is_empty()
    }
}
