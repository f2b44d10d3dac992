//! Weighted priority function.
//!
//! Combines scoring rules into one scalar:
//!
//! `score(job) = W_p·priority − W_d·deadline + W_e·estimate`
//!
//! with all weights 1.0 by default. The logged priority key is the
//! negated score, so that ascending keys list jobs in dispatch order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{rules, RuleScore, ScoringRule};
use crate::models::Job;

/// Weights of the default priority function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    /// Weight of the job's priority (`W_p`).
    pub priority: f64,
    /// Weight of the deadline (`W_d`), applied to the negated deadline.
    pub deadline: f64,
    /// Weight of the duration estimate (`W_e`).
    pub estimate: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            priority: 1.0,
            deadline: 1.0,
            estimate: 1.0,
        }
    }
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn ScoringRule>,
    weight: f64,
}

/// Weighted sum of scoring rules.
///
/// # Example
/// ```
/// use precompute_sim::dispatching::{PriorityFunction, rules};
/// use precompute_sim::models::Job;
///
/// let function = PriorityFunction::new()
///     .with_weighted_rule(rules::Priority, 2.0)
///     .with_rule(rules::Deadline);
///
/// let job = Job::new(1).with_priority(3.0).with_deadline(4.0);
/// assert_eq!(function.score(&job), 2.0);
/// ```
#[derive(Clone)]
pub struct PriorityFunction {
    rules: Vec<WeightedRule>,
}

impl PriorityFunction {
    /// Creates a function with no rules (every job scores 0).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates the three-term function with the given weights.
    pub fn from_weights(weights: PriorityWeights) -> Self {
        Self::new()
            .with_weighted_rule(rules::Priority, weights.priority)
            .with_weighted_rule(rules::Deadline, weights.deadline)
            .with_weighted_rule(rules::Estimate, weights.estimate)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: ScoringRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: ScoringRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Scores a job (higher = dispatched first).
    pub fn score(&self, job: &Job) -> RuleScore {
        // Folding from +0.0 keeps an all-zero score positive.
        self.rules
            .iter()
            .fold(0.0, |acc, wr| acc + wr.rule.evaluate(job) * wr.weight)
    }

    /// Priority key as logged: the negated score.
    pub fn priority_key(&self, job: &Job) -> f64 {
        0.0 - self.score(job)
    }

    /// Per-rule weighted contributions, in rule order.
    pub fn evaluate(&self, job: &Job) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(job) * wr.weight)
            .collect()
    }
}

impl Default for PriorityFunction {
    fn default() -> Self {
        Self::from_weights(PriorityWeights::default())
    }
}

impl std::fmt::Debug for PriorityFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityFunction")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
