//! Dataset validation.
//!
//! Six independent rules are checked against a dataset and its reference
//! index. Validation never stops at the first problem: every rule runs to
//! completion and all violations are returned together, in report order.

mod check;
mod contiguity;
mod violation;

use tracing::debug;

use crate::domain::Dataset;
use crate::index::ReferenceIndex;

pub use contiguity::{ContiguityGap, check_contiguity};
pub use violation::{EntityRef, Rule, Violation, sort_violations};

/// Run every rule and return the violations sorted by rule, then entity.
pub fn validate(dataset: &Dataset, index: &ReferenceIndex<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in Rule::ALL {
        let found = rule.run(dataset, index);
        debug!(rule = rule.name(), violations = found.len(), "Checked rule");
        violations.extend(found);
    }
    sort_violations(&mut violations);
    violations
}
