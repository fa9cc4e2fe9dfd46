//! Wait-time estimation.
//!
//! The assembled record's wait time is an estimate supplied by a collaborator
//! behind the [`WaitTimeEstimator`] trait, not a core responsibility. The
//! shipped implementation reproduces the original placeholder (a uniform
//! random 5-64 minutes); a queue-aware estimator can be slotted in without
//! touching the pipeline.

use rand::Rng;

/// Supplies the estimated wait in minutes for a department.
pub trait WaitTimeEstimator: Send + Sync {
    fn estimate(&self, department: &str) -> u32;
}

/// Placeholder estimator: uniform random 5..=64 minutes, ignoring the queue.
#[derive(Clone, Default)]
pub struct RandomWaitTimeEstimator;

impl WaitTimeEstimator for RandomWaitTimeEstimator {
    fn estimate(&self, _department: &str) -> u32 {
        rand::thread_rng().gen_range(5..65)
    }
}

/// Fixed estimator for deterministic tests.
#[derive(Clone)]
pub struct FixedWaitTimeEstimator(pub u32);

impl WaitTimeEstimator for FixedWaitTimeEstimator {
    fn estimate(&self, _department: &str) -> u32 {
        self.0
    }
}
