//! Schema errors.
//!
//! These are the only fatal errors of a run: a dataset that raises one
//! cannot be turned into a model, and nothing is validated or inferred.

use super::{EventSequence, VehicleId};

/// Structural problems that prevent building the domain model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A required field is absent
    #[error("{location}: missing required field `{field}`")]
    MissingField {
        location: String,
        field: &'static str,
    },

    /// A field is present but its value cannot be interpreted
    #[error("{location}: invalid `{field}` value {value:?}: {reason}")]
    InvalidField {
        location: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Two entities of one collection share an id
    #[error("duplicate id {id:?} in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },

    /// Two events of one vehicle share a sequence number
    #[error("vehicle {vehicle_id} has more than one event with sequence {sequence}")]
    DuplicateEventSequence {
        vehicle_id: VehicleId,
        sequence: EventSequence,
    },
}
