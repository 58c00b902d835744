//! Scheduling document input and output.
//!
//! The document is a single JSON object with four collections: `stops`,
//! `trips`, `vehicles` and `duties`. This module owns the raw DTOs, reading
//! and writing them, and their conversion into the [`crate::domain`] model.
//! Nothing here resolves references between entities.

mod convert;
mod error;
mod load;
mod types;

pub use convert::convert_document;
pub use error::LoadError;
pub use load::{load_dataset, load_document, parse_document, write_document};
pub use types::{
    Document, DutyEventRecord, DutyRecord, SequenceValue, StopRecord, TripRecord,
    VehicleEventRecord, VehicleRecord,
};
