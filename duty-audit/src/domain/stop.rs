//! Stops: the places where trips and other events begin and end.

use super::StopId;

/// A stop in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_id: StopId,
    /// Human-readable name, if the dataset provides one
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Depots are vehicle bases and never serve as trip endpoints
    pub is_depot: bool,
}

impl Stop {
    /// Returns the stop's name, falling back to its id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.stop_id.as_str())
    }

    /// Exact-equality key for the stop's coordinates.
    ///
    /// Two stops occupy the same point iff their keys are equal. Negative
    /// zero is folded into positive zero.
    pub fn point_key(&self) -> PointKey {
        PointKey(coordinate_bits(self.latitude), coordinate_bits(self.longitude))
    }
}

/// Hashable, orderable form of a `(latitude, longitude)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(u64, u64);

fn coordinate_bits(value: f64) -> u64 {
    if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            stop_id: StopId::new(id),
            name: None,
            latitude: lat,
            longitude: lon,
            is_depot: false,
        }
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let mut s = stop("S1", 0.0, 0.0);
        assert_eq!(s.display_name(), "S1");
        s.name = Some("Central".to_string());
        assert_eq!(s.display_name(), "Central");
    }

    #[test]
    fn same_point_same_key() {
        assert_eq!(
            stop("A", 51.5, -0.12).point_key(),
            stop("B", 51.5, -0.12).point_key()
        );
        assert_ne!(
            stop("A", 51.5, -0.12).point_key(),
            stop("B", 51.5, -0.13).point_key()
        );
    }

    #[test]
    fn negative_zero_matches_zero() {
        assert_eq!(stop("A", 0.0, -0.0).point_key(), stop("B", -0.0, 0.0).point_key());
    }
}
