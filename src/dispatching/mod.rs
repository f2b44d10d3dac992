//! Priority scoring and the ready queue.
//!
//! Provides the scoring rules that rate a job's scheduling importance,
//! the weighted [`PriorityFunction`] that combines them, and the
//! max-first [`ReadyQueue`] the simulator dispatches from.
//!
//! # Usage
//!
//! ```
//! use precompute_sim::dispatching::{PriorityFunction, PriorityWeights, ReadyQueue, TieBreaker};
//! use precompute_sim::models::Job;
//!
//! let function = PriorityFunction::from_weights(PriorityWeights::default());
//! let mut queue = ReadyQueue::new(TieBreaker::ArrivalOrder);
//!
//! let job = Job::new(1).with_priority(5.0).with_deadline(10.0).with_estimate(2.0);
//! let score = function.score(&job);
//! assert_eq!(score, -3.0);
//!
//! queue.insert(job, score);
//! assert_eq!(queue.pop().unwrap().map(|(job, _)| job.id), Some(1));
//! ```

mod engine;
mod queue;
pub mod rules;

pub use engine::{PriorityFunction, PriorityWeights};
pub use queue::{DispatchKey, ReadyQueue, TieBreaker};

use crate::models::Job;
use std::fmt::Debug;

/// Score returned by a scoring rule.
///
/// Higher scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A scoring rule that rates one aspect of a job's importance.
///
/// # Score Convention
/// **Higher score = higher priority.** Rules return larger values for jobs
/// that should run first; the ready queue dispatches the maximum.
pub trait ScoringRule: Send + Sync + Debug {
    /// Rule name (e.g., "PRIORITY", "DEADLINE").
    fn name(&self) -> &'static str;

    /// Rates `job`. Must be a pure function of the job's fields.
    fn evaluate(&self, job: &Job) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
