//! Break inference.
//!
//! Rest periods are never stored in a dataset. This module reconstructs
//! them from the ordering of events inside each duty:
//!
//! - a *layover* is a gap between consecutive events of one vehicle that the
//!   duty works without changing vehicle;
//! - a *split* is the point where the duty moves from one vehicle to
//!   another.
//!
//! Inference depends on each duty claiming a contiguous range of each
//! vehicle's events. When that does not hold, or a claim cannot be placed
//! in time, the duty gets `Indeterminate` records instead of guessed breaks.
//! No duration threshold is applied here; see [`crate::report::BreakPolicy`].

mod engine;
mod types;

pub use engine::{infer_breaks, infer_duty};
pub use types::{
    BoundingEvent, BreakGap, BreakKind, IndeterminateReason, InferredBreak, sort_breaks,
};
