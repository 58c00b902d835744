//! Input document DTOs.
//!
//! These types map directly to the JSON scheduling document. Every field is
//! an `Option` so that a missing field surfaces as a
//! [`SchemaError`](crate::domain::SchemaError) naming the exact record,
//! rather than as an opaque deserialization failure.

use serde::{Deserialize, Serialize};

/// The whole scheduling document: four top-level collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<StopRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trips: Option<Vec<TripRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<VehicleRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duties: Option<Vec<DutyRecord>>,
}

/// A stop record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: Option<String>,

    /// Display name (optional; reports fall back to the id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_depot: Option<bool>,
}

/// A trip record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_number: Option<String>,

    pub origin_stop_id: Option<String>,
    pub destination_stop_id: Option<String>,

    /// Day-offset time ("D.HH:MM").
    pub departure_time: Option<String>,

    /// Day-offset time ("D.HH:MM").
    pub arrival_time: Option<String>,
}

/// A vehicle record with its event timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub vehicle_id: Option<String>,
    pub vehicle_events: Option<Vec<VehicleEventRecord>>,
}

/// One event of a vehicle's timeline.
///
/// Service trips carry `trip_id`; every other kind carries its own stops
/// and times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleEventRecord {
    pub vehicle_event_sequence: Option<SequenceValue>,
    pub vehicle_event_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_stop_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_stop_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_id: Option<String>,
}

/// A duty record with its event list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DutyRecord {
    pub duty_id: Option<String>,
    pub duty_events: Option<Vec<DutyEventRecord>>,
}

/// One entry of a duty's event list.
///
/// `vehicle_event` entries carry `vehicle_id` and `vehicle_event_sequence`;
/// crew entries (sign on, sign off, taxi) carry their own stops and times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DutyEventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_event_sequence: Option<SequenceValue>,

    pub duty_event_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_event_sequence: Option<SequenceValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_stop_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_stop_id: Option<String>,
}

/// A sequence number as found in source data.
///
/// Some exporters write sequences as JSON numbers, others as numeric
/// strings; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SequenceValue {
    Number(i64),
    Text(String),
}

impl SequenceValue {
    /// Interpret the value as a non-negative sequence number.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            SequenceValue::Number(n) => u32::try_from(*n).ok(),
            SequenceValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for SequenceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceValue::Number(n) => write!(f, "{n}"),
            SequenceValue::Text(s) => f.write_str(s),
        }
    }
}
