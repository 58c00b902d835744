//! Contiguity of claimed sequence ranges.

use std::fmt;

use crate::domain::EventSequence;

/// Why a set of claimed sequences is not a contiguous range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContiguityGap {
    /// Missing runs, as inclusive `(first, last)` pairs.
    pub missing: Vec<(EventSequence, EventSequence)>,
    /// Sequences claimed more than once.
    pub repeated: Vec<EventSequence>,
}

impl fmt::Display for ContiguityGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            let runs: Vec<String> = self
                .missing
                .iter()
                .map(|(first, last)| {
                    if first == last {
                        first.to_string()
                    } else {
                        format!("{first}-{last}")
                    }
                })
                .collect();
            parts.push(format!("missing {}", runs.join(", ")));
        }
        if !self.repeated.is_empty() {
            let repeated: Vec<String> = self.repeated.iter().map(|s| s.to_string()).collect();
            parts.push(format!("repeated {}", repeated.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Check that sorted `sequences` form `min..=max` with no gaps or repeats.
///
/// An empty slice is trivially contiguous.
///
/// # Examples
///
/// ```
/// use duty_audit::domain::EventSequence;
/// use duty_audit::validate::check_contiguity;
///
/// let ok: Vec<_> = [3, 4, 5].into_iter().map(EventSequence).collect();
/// assert!(check_contiguity(&ok).is_ok());
///
/// let gap: Vec<_> = [1, 3].into_iter().map(EventSequence).collect();
/// assert_eq!(check_contiguity(&gap).unwrap_err().to_string(), "missing 2");
/// ```
pub fn check_contiguity(sequences: &[EventSequence]) -> Result<(), ContiguityGap> {
    let mut missing = Vec::new();
    let mut repeated = Vec::new();

    for pair in sequences.windows(2) {
        let (prev, next) = (pair[0].0, pair[1].0);
        if next == prev {
            if repeated.last() != Some(&pair[1]) {
                repeated.push(pair[1]);
            }
        } else if next > prev + 1 {
            missing.push((EventSequence(prev + 1), EventSequence(next - 1)));
        }
    }

    if missing.is_empty() && repeated.is_empty() {
        Ok(())
    } else {
        Err(ContiguityGap { missing, repeated })
    }
}
