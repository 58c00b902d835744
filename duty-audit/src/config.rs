//! Audit configuration.

/// How an audit is scheduled.
///
/// Scheduling never changes the result: a parallel audit produces exactly
/// the report of a sequential one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Run checks and inference on blocking worker tasks.
    pub parallel: bool,

    /// Number of duties per inference task in parallel mode.
    pub batch_size: usize,
}

impl AuditConfig {
    /// Create a new configuration with the given parameters.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(parallel: bool, batch_size: usize) -> Self {
        Self {
            parallel,
            batch_size: batch_size.max(1),
        }
    }

    /// Configuration for a single-threaded run.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            batch_size: 64,
        }
    }
}
