//! Audit runner: validation plus break inference over one dataset.
//!
//! [`audit`] is the reference, single-threaded run. [`run_audit`] spreads
//! the same work over tokio blocking tasks: one task per rule, and one per
//! batch of duties for inference. Every task rebuilds its own reference
//! index from the shared dataset, so no state is shared between them. The
//! partial results are concatenated in task order and re-sorted, which makes
//! the parallel report identical to the sequential one.

use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{debug, info};

use crate::breaks::{InferredBreak, infer_breaks, infer_duty, sort_breaks};
use crate::config::AuditConfig;
use crate::domain::{Dataset, SchemaError};
use crate::index::ReferenceIndex;
use crate::validate::{Rule, Violation, sort_violations, validate};

/// The two reports of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub violations: Vec<Violation>,
    pub breaks: Vec<InferredBreak>,
}

impl AuditReport {
    /// Returns true if no rule was violated.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Error from running an audit.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("audit task failed: {0}")]
    Task(#[from] JoinError),
}

/// Audit a dataset on the current thread.
pub fn audit(dataset: &Dataset) -> Result<AuditReport, SchemaError> {
    let index = ReferenceIndex::build(dataset)?;
    let violations = validate(dataset, &index);
    let breaks = infer_breaks(dataset, &index);

    info!(
        violations = violations.len(),
        breaks = breaks.len(),
        "Audit complete"
    );

    Ok(AuditReport { violations, breaks })
}

/// Audit a dataset according to `config`.
pub async fn run_audit(
    dataset: Arc<Dataset>,
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    if !config.parallel {
        return Ok(audit(&dataset)?);
    }

    // Surface schema errors once, before any task is spawned
    ReferenceIndex::build(&dataset)?;

    let checks: Vec<_> = Rule::ALL
        .into_iter()
        .map(|rule| {
            let dataset = Arc::clone(&dataset);
            spawn_blocking(move || -> Result<Vec<Violation>, SchemaError> {
                let index = ReferenceIndex::build(&dataset)?;
                Ok(rule.run(&dataset, &index))
            })
        })
        .collect();

    let batches = duty_batches(dataset.duties.len(), config.batch_size);
    debug!(
        checks = checks.len(),
        inference_batches = batches.len(),
        "Spawned audit tasks"
    );

    let inference: Vec<_> = batches
        .into_iter()
        .map(|range| {
            let dataset = Arc::clone(&dataset);
            spawn_blocking(move || -> Result<Vec<InferredBreak>, SchemaError> {
                let index = ReferenceIndex::build(&dataset)?;
                Ok(dataset.duties[range]
                    .iter()
                    .flat_map(|duty| infer_duty(duty, &index))
                    .collect())
            })
        })
        .collect();

    let mut violations = Vec::new();
    for result in join_all(checks).await {
        violations.extend(result??);
    }
    sort_violations(&mut violations);

    let mut breaks = Vec::new();
    for result in join_all(inference).await {
        breaks.extend(result??);
    }
    sort_breaks(&mut breaks);

    info!(
        violations = violations.len(),
        breaks = breaks.len(),
        "Audit complete"
    );

    Ok(AuditReport { violations, breaks })
}

/// Split `0..len` into consecutive ranges of at most `batch_size`.
fn duty_batches(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);
    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}
