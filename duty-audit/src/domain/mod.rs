//! Domain types for crew and vehicle schedules.
//!
//! This module contains the typed model of a scheduling dataset: stops,
//! trips, vehicles with their event timelines, and duties. The types are
//! plain data with structural queries; validation lives in
//! [`crate::validate`] and break inference in [`crate::breaks`].

mod dataset;
mod duty;
mod error;
mod ids;
mod span;
mod stop;
mod time;
mod trip;
mod vehicle;

pub use dataset::Dataset;
pub use duty::{Duty, DutyEvent, DutyEventType};
pub use error::SchemaError;
pub use ids::{DutyId, EventKey, EventSequence, StopId, TripId, VehicleId};
pub use span::EventSpan;
pub use stop::{PointKey, Stop};
pub use time::{ScheduleTime, TimeError};
pub use trip::Trip;
pub use vehicle::{UnknownEventType, Vehicle, VehicleEvent, VehicleEventType};
