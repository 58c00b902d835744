//! Identifier types for dataset entities.
//!
//! Every entity family gets its own newtype so a stop id can never be used
//! where a trip id is expected. Ids are opaque strings; the only structure
//! they carry is equality and ordering.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Stop`](super::Stop).
    StopId
);
entity_id!(
    /// Identifier of a [`Trip`](super::Trip).
    TripId
);
entity_id!(
    /// Identifier of a [`Vehicle`](super::Vehicle).
    VehicleId
);
entity_id!(
    /// Identifier of a [`Duty`](super::Duty).
    DutyId
);

/// Position of an event within its vehicle's timeline.
///
/// Sequences are what duties use to point at vehicle events, so they are
/// compared numerically, never by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventSequence(pub u32);

impl EventSequence {
    /// Returns the following sequence number.
    pub fn next(self) -> Self {
        EventSequence(self.0 + 1)
    }
}

impl fmt::Display for EventSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventSequence {
    fn from(value: u32) -> Self {
        EventSequence(value)
    }
}

/// Composite key addressing one vehicle event: `(vehicle_id, sequence)`.
///
/// Duties refer to vehicle events only through this key. There is no direct
/// link between the two aggregates.
///
/// # Examples
///
/// ```
/// use duty_audit::domain::{EventKey, EventSequence, VehicleId};
///
/// let key = EventKey::new(VehicleId::new("V1"), EventSequence(3));
/// assert_eq!(key.to_string(), "V1#3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventKey {
    pub vehicle_id: VehicleId,
    pub sequence: EventSequence,
}

impl EventKey {
    /// Creates a new event key.
    pub fn new(vehicle_id: VehicleId, sequence: EventSequence) -> Self {
        Self {
            vehicle_id,
            sequence,
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.vehicle_id, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn display_and_debug() {
        let id = StopId::new("S1");
        assert_eq!(id.to_string(), "S1");
        assert_eq!(format!("{:?}", id), "StopId(S1)");
        assert_eq!(format!("{:?}", DutyId::new("D9")), "DutyId(D9)");
    }

    #[test]
    fn lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(TripId::new("T1"), 1);
        assert_eq!(map.get("T1"), Some(&1));
        assert_eq!(map.get("T2"), None);
    }

    #[test]
    fn ids_order_lexicographically() {
        assert!(VehicleId::new("V10") < VehicleId::new("V2"));
        assert!(DutyId::new("A") < DutyId::new("B"));
    }

    #[test]
    fn sequence_next() {
        assert_eq!(EventSequence(4).next(), EventSequence(5));
    }

    #[test]
    fn event_keys_order_by_vehicle_then_sequence() {
        let a = EventKey::new("V1".into(), EventSequence(9));
        let b = EventKey::new("V2".into(), EventSequence(1));
        let c = EventKey::new("V2".into(), EventSequence(2));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn serializes_transparently() {
        let key = EventKey::new("V1".into(), EventSequence(2));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"vehicle_id":"V1","sequence":2}"#);
    }
}
