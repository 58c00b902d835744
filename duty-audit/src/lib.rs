//! Crew and vehicle schedule auditing.
//!
//! Checks a transit scheduling dataset (stops, trips, vehicles and duties)
//! against its cross-entity rules, and reconstructs the layover and split
//! breaks that the dataset never stores.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use duty_audit::{audit, document};
//!
//! let dataset = document::load_dataset("schedule.json").await?;
//! let report = audit::audit(&dataset)?;
//! for violation in &report.violations {
//!     println!("{violation}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod breaks;
pub mod config;
pub mod document;
pub mod domain;
pub mod fixture;
pub mod index;
pub mod report;
pub mod validate;
