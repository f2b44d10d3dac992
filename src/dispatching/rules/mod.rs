//! Built-in scoring rules.
//!
//! | Rule | Score |
//! |------|-------|
//! | PRIORITY | `priority` |
//! | DEADLINE | `-deadline` (earlier deadline scores higher) |
//! | ESTIMATE | `estimate` |
//!
//! The default [`PriorityFunction`](super::PriorityFunction) is the
//! weighted sum of all three.
//!
//! # Score Convention
//! All rules return higher scores for jobs that should be dispatched first.

use super::{RuleScore, ScoringRule};
use crate::models::Job;

/// Job priority as recorded in the trace.
#[derive(Debug, Clone, Copy)]
pub struct Priority;

impl ScoringRule for Priority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        job.priority
    }

    fn description(&self) -> &'static str {
        "Job Priority"
    }
}

/// Deadline urgency.
///
/// Negated so that earlier deadlines score higher.
#[derive(Debug, Clone, Copy)]
pub struct Deadline;

impl ScoringRule for Deadline {
    fn name(&self) -> &'static str {
        "DEADLINE"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        -job.deadline
    }

    fn description(&self) -> &'static str {
        "Earliest Deadline"
    }
}

/// Estimated duration.
///
/// Longer estimates score higher.
#[derive(Debug, Clone, Copy)]
pub struct Estimate;

impl ScoringRule for Estimate {
    fn name(&self) -> &'static str {
        "ESTIMATE"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        job.estimate
    }

    fn description(&self) -> &'static str {
        "Estimated Duration"
    }
}
