//! Precompute decision model.
//!
//! Decides, per job, whether the scheduler speculatively precomputes part
//! of the job's work, and models what that costs and saves.
//!
//! # Model
//!
//! | Quantity | Definition |
//! |----------|-----------|
//! | Eligibility | uniform draw in [0, 100) < `precomputable_ratio` × 100 |
//! | Precompute time | `precompute_time_ratio` × `exec_time` |
//! | Speedup | `speedup_factor` of the job's workload class |
//! | Effective exec time | `exec_time` / speedup |
//!
//! Eligibility is the only stochastic step and consumes exactly one draw
//! from the injected random source per call. Cost and speedup are pure
//! lookups.
//!
//! # Usage
//!
//! ```
//! use precompute_sim::models::{Job, WorkloadParameters, WorkloadTable};
//! use precompute_sim::precompute::PrecomputeModel;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let table = WorkloadTable::new().with_class(0, WorkloadParameters::new(1.0, 0.5, 2.0));
//! let mut model = PrecomputeModel::new(table, StdRng::seed_from_u64(7));
//!
//! let job = Job::new(1).with_exec_time(10.0);
//! let decision = model.decide(&job).unwrap();
//! assert_eq!(decision.effective_exec_time(job.exec_time), 5.0);
//! ```

use rand::Rng;

use crate::error::SimResult;
use crate::models::{Job, WorkloadParameters, WorkloadTable};

/// Outcome of the decision model for one job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecomputeDecision {
    /// The job runs unmodified.
    NotEligible,
    /// Part of the job was precomputed ahead of dispatch.
    Precomputed {
        /// Speculative work spent before dispatch.
        precompute_time: f64,
        /// Divisor applied to the job's execution time.
        speedup: f64,
        /// Cost of retrieving the precomputed result.
        retrieval_time: f64,
    },
}

impl PrecomputeDecision {
    /// Whether the job was precomputed.
    pub fn is_precomputed(&self) -> bool {
        matches!(self, Self::Precomputed { .. })
    }

    /// Execution time after applying the speedup (unchanged if not
    /// precomputed).
    pub fn effective_exec_time(&self, exec_time: f64) -> f64 {
        match self {
            Self::NotEligible => exec_time,
            Self::Precomputed { speedup, .. } => exec_time / speedup,
        }
    }

    pub fn precompute_time(&self) -> Option<f64> {
        match self {
            Self::NotEligible => None,
            Self::Precomputed {
                precompute_time, ..
            } => Some(*precompute_time),
        }
    }

    pub fn retrieval_time(&self) -> Option<f64> {
        match self {
            Self::NotEligible => None,
            Self::Precomputed { retrieval_time, .. } => Some(*retrieval_time),
        }
    }
}

/// Per-workload precompute decision model with an injected random source.
#[derive(Debug, Clone)]
pub struct PrecomputeModel<R> {
    workloads: WorkloadTable,
    retrieval_time: f64,
    rng: R,
}

impl<R: Rng> PrecomputeModel<R> {
    /// Creates a model over a workload table, drawing from `rng`.
    pub fn new(workloads: WorkloadTable, rng: R) -> Self {
        Self {
            workloads,
            retrieval_time: 0.0,
            rng,
        }
    }

    /// Sets the retrieval cost logged against precomputed jobs.
    pub fn with_retrieval_time(mut self, retrieval_time: f64) -> Self {
        self.retrieval_time = retrieval_time;
        self
    }

    /// Draws whether `job` is eligible for precomputation.
    ///
    /// # Errors
    /// `SimError::Configuration` if the job's class has no parameters. No
    /// randomness is consumed in that case.
    pub fn is_precomputable(&mut self, job: &Job) -> SimResult<bool> {
        let ratio = self.parameters(job)?.precomputable_ratio;
        let draw: u32 = self.rng.random_range(0..100);
        Ok(f64::from(draw) < ratio * 100.0)
    }

    /// Precompute cost of `job`.
    pub fn precompute_time(&self, job: &Job) -> SimResult<f64> {
        Ok(self.parameters(job)?.precompute_time_ratio * job.exec_time)
    }

    /// Speedup applied to `job` once precomputed.
    pub fn speedup(&self, job: &Job) -> SimResult<f64> {
        Ok(self.parameters(job)?.speedup_factor)
    }

    /// Runs eligibility, then cost and speedup for eligible jobs only.
    pub fn decide(&mut self, job: &Job) -> SimResult<PrecomputeDecision> {
        if !self.is_precomputable(job)? {
            return Ok(PrecomputeDecision::NotEligible);
        }
        Ok(PrecomputeDecision::Precomputed {
            precompute_time: self.precompute_time(job)?,
            speedup: self.speedup(job)?,
            retrieval_time: self.retrieval_time,
        })
    }

    /// The workload table backing this model.
    pub fn workloads(&self) -> &WorkloadTable {
        &self.workloads
    }

    fn parameters(&self, job: &Job) -> SimResult<&WorkloadParameters> {
        self.workloads.get(job.workload)
    }
}
