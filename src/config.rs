//! Simulation configuration.
//!
//! Loaded from a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "workloads": [
//!     {"class": 0, "precomputable_ratio": 0.1, "precompute_time_ratio": 0.05, "speedup_factor": 1.07}
//!   ],
//!   "weights": {"priority": 1.0, "deadline": 1.0, "estimate": 1.0},
//!   "retrieval_time": 0.0,
//!   "apply_retrieval_cost": false,
//!   "tie_breaker": "arrival_order",
//!   "seed": 42
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatching::{PriorityWeights, TieBreaker};
use crate::error::{SimError, SimResult};
use crate::models::WorkloadTable;

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Precompute economics per workload classification.
    pub workloads: WorkloadTable,
    /// Priority function weights.
    pub weights: PriorityWeights,
    /// Retrieval cost logged against precomputed jobs.
    pub retrieval_time: f64,
    /// Whether retrieval cost advances the simulated clock.
    pub apply_retrieval_cost: bool,
    /// Secondary dispatch key on exact score ties.
    pub tie_breaker: TieBreaker,
    /// Seed of the precompute eligibility draws. `None` = draw one per run.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workloads: WorkloadTable::default(),
            weights: PriorityWeights::default(),
            retrieval_time: 0.0,
            apply_retrieval_cost: false,
            tie_breaker: TieBreaker::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SimError::configuration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the workload table.
    pub fn with_workloads(mut self, workloads: WorkloadTable) -> Self {
        self.workloads = workloads;
        self
    }

    /// Sets the priority weights.
    pub fn with_weights(mut self, weights: PriorityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the retrieval cost and whether it advances the clock.
    pub fn with_retrieval_time(mut self, retrieval_time: f64, apply: bool) -> Self {
        self.retrieval_time = retrieval_time;
        self.apply_retrieval_cost = apply;
        self
    }

    /// Sets the tie breaker.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> SimResult<()> {
        self.workloads.validate()?;

        let weights = [
            ("priority", self.weights.priority),
            ("deadline", self.weights.deadline),
            ("estimate", self.weights.estimate),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(SimError::configuration(format!(
                "weight `{name}` must be finite, got {value}"
            )));
        }

        if !self.retrieval_time.is_finite() || self.retrieval_time < 0.0 {
            return Err(SimError::configuration(format!(
                "retrieval_time must be finite and >= 0, got {}",
                self.retrieval_time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkloadClass, WorkloadParameters};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weights, PriorityWeights::default());
        assert_eq!(config.tie_breaker, TieBreaker::ArrivalOrder);
        assert!(config.workloads.contains(WorkloadClass(0)));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config: SimConfig =
            serde_json::from_str(r#"{"seed": 7, "tie_breaker": "by_id"}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tie_breaker, TieBreaker::ById);
        assert_eq!(config.workloads, WorkloadTable::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<SimConfig>(r#"{"sede": 7}"#).is_err());
    }

    #[test]
    fn test_negative_retrieval_time() {
        let config = SimConfig::default().with_retrieval_time(-1.0, true);
        assert!(matches!(
            config.validate(),
            Err(SimError::Configuration { .. })
        ));
    }

    #[test]
    fn test_non_finite_weight() {
        let config = SimConfig::default().with_weights(PriorityWeights {
            priority: f64::INFINITY,
            ..PriorityWeights::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "workloads": [
                    {{"class": 0, "precomputable_ratio": 0.5, "precompute_time_ratio": 0.1, "speedup_factor": 2.0}},
                    {{"class": 1, "precomputable_ratio": 0.0, "precompute_time_ratio": 0.0, "speedup_factor": 1.0}}
                ],
                "retrieval_time": 0.5,
                "apply_retrieval_cost": true
            }}"#
        )
        .unwrap();

        let config = SimConfig::from_file(file.path()).unwrap();
        assert_eq!(config.workloads.len(), 2);
        assert_eq!(
            config.workloads.get(WorkloadClass(0)).unwrap(),
            &WorkloadParameters::new(0.5, 0.1, 2.0)
        );
        assert_eq!(config.retrieval_time, 0.5);
        assert!(config.apply_retrieval_cost);
    }

    #[test]
    fn test_from_missing_file() {
        let err = SimConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}
