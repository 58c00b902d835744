//! Duty reports.
//!
//! Three tables are produced from an indexed dataset:
//!
//! - `duty_start_end_times`: when each duty starts and ends;
//! - `duty_start_end_times_and_stops`: the same, plus the first and last
//!   service stop, for duties that have service trips;
//! - `duty_breaks`: one row per break of each duty in the previous table.
//!
//! Which breaks are listed is decided by a [`BreakPolicy`]. Times are
//! written as clock times (`HH:MM`), without the day offset.

mod output;
mod policy;
mod summary;

pub use output::{
    BreakRow, OutputFormat, Report, ReportError, ReportKind, StopsRow, TimesRow,
};
pub use policy::BreakPolicy;
pub use summary::{DutyBreak, DutySummary, Unsummarizable, duty_breaks, summarize_duties, summarize_duty};
