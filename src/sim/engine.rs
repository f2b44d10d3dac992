//! Event loop and simulated clock.
//!
//! # Algorithm
//!
//! Repeat until the arrival feed is exhausted and the ready queue is empty:
//!
//! 1. **Admission.** If the ready queue is empty, move the clock forward to
//!    the next arrival (this also starts the clock on the first job). Then
//!    admit every arrival with `submission_time ≤ now`: validate it, run the
//!    precompute decision model, score it, create its log record, and
//!    insert it into the ready queue.
//! 2. **Dispatch.** Pop the highest-scoring job, record
//!    `wait_time = now − submission_time`, and advance the clock by the
//!    job's effective duration (plus retrieval cost when configured).
//!
//! The clock only moves forward, and a job is only admitted once the clock
//! has reached its submission time, so every wait time is non-negative.
//!
//! # Complexity
//! O(n log n) for n jobs.

use std::iter::Peekable;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::dispatching::{PriorityFunction, ReadyQueue};
use crate::error::{SimError, SimResult};
use crate::models::{ExecutionLog, Job, LogRecord};
use crate::precompute::PrecomputeModel;
use crate::validation;

/// Trace-driven single-timeline simulator.
///
/// # Example
///
/// ```
/// use precompute_sim::config::SimConfig;
/// use precompute_sim::models::Job;
/// use precompute_sim::sim::Simulator;
///
/// let jobs = vec![
///     Job::new(1).with_submission_time(0.0).with_exec_time(4.0),
///     Job::new(2).with_submission_time(1.0).with_exec_time(2.0),
/// ];
/// let log = Simulator::new(SimConfig::default().with_seed(1)).unwrap().run(jobs).unwrap();
///
/// assert_eq!(log.len(), 2);
/// assert!(log.records().iter().all(|r| r.wait_time.unwrap() >= 0.0));
/// ```
#[derive(Debug)]
pub struct Simulator<R = StdRng> {
    model: PrecomputeModel<R>,
    function: PriorityFunction,
    queue: ReadyQueue,
    log: ExecutionLog,
    // None until the first admission
    now: Option<f64>,
    last_submission: Option<f64>,
    apply_retrieval_cost: bool,
    seed: Option<u64>,
}

impl Simulator<StdRng> {
    /// Creates a simulator seeded from `config.seed`.
    ///
    /// Without a configured seed, one is drawn and logged so the run can
    /// be reproduced.
    ///
    /// # Errors
    /// `SimError::Configuration` if `config` fails [`SimConfig::validate`].
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| {
            let seed: u64 = rand::rng().random();
            info!(seed, "no seed configured, drew one");
            seed
        });
        let mut sim = Self::build(config, StdRng::seed_from_u64(seed));
        sim.seed = Some(seed);
        Ok(sim)
    }
}

impl<R: Rng> Simulator<R> {
    /// Creates a simulator drawing eligibility from `rng`.
    ///
    /// # Errors
    /// `SimError::Configuration` if `config` fails [`SimConfig::validate`].
    pub fn with_rng(config: SimConfig, rng: R) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: SimConfig, rng: R) -> Self {
        let model = PrecomputeModel::new(config.workloads, rng)
            .with_retrieval_time(config.retrieval_time);
        Self {
            model,
            function: PriorityFunction::from_weights(config.weights),
            queue: ReadyQueue::new(config.tie_breaker),
            log: ExecutionLog::new(),
            now: None,
            last_submission: None,
            apply_retrieval_cost: config.apply_retrieval_cost,
            seed: None,
        }
    }

    /// Replaces the priority function.
    pub fn with_priority_function(mut self, function: PriorityFunction) -> Self {
        self.function = function;
        self
    }

    /// Seed of the eligibility draws, if built from one.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Replays `jobs` (in submission order) to completion.
    ///
    /// # Errors
    /// Stops at the first invalid job (`InputValidation`), unknown workload
    /// class (`Configuration`), or bookkeeping failure (`InternalInvariant`).
    /// No partial log is returned.
    pub fn run<I>(mut self, jobs: I) -> SimResult<ExecutionLog>
    where
        I: IntoIterator<Item = Job>,
    {
        let mut feed = jobs.into_iter().peekable();
        info!(seed = ?self.seed, "starting simulation");

        loop {
            self.admit_arrivals(&mut feed)?;

            match self.queue.pop()? {
                Some((job, _)) => self.dispatch(job)?,
                None if feed.peek().is_none() => break,
                None => {
                    return Err(SimError::invariant(
                        "arrivals pending but nothing admitted to the ready queue",
                    ));
                }
            }
        }

        if !self.log.is_complete() {
            return Err(SimError::invariant("run ended with undispatched jobs"));
        }

        info!(
            jobs = self.log.len(),
            end_time = self.now.unwrap_or(0.0),
            "simulation complete"
        );
        Ok(self.log)
    }

    fn admit_arrivals<I>(&mut self, feed: &mut Peekable<I>) -> SimResult<()>
    where
        I: Iterator<Item = Job>,
    {
        if self.queue.is_empty() {
            if let Some(next) = feed.peek() {
                validation::validate_job(next)?;
                let ready = next.submission_time;
                let now = match self.now {
                    None => {
                        debug!(start = ready, "clock started");
                        ready
                    }
                    Some(now) if ready > now => {
                        debug!(from = now, to = ready, "idle until next arrival");
                        ready
                    }
                    Some(now) => now,
                };
                self.now = Some(now);
            }
        }

        let Some(now) = self.now else {
            return Ok(());
        };
        while let Some(job) = feed.next_if(|job| job.submission_time <= now) {
            self.admit(job)?;
        }
        Ok(())
    }

    fn admit(&mut self, job: Job) -> SimResult<()> {
        validation::validate_job(&job)?;
        validation::check_arrival_order(self.last_submission, &job)?;

        let decision = self.model.decide(&job)?;
        let score = self.function.score(&job);

        self.log.admit(LogRecord {
            id: job.id,
            priority_key: self.function.priority_key(&job),
            can_precompute: decision.is_precomputed(),
            exec_time: decision.effective_exec_time(job.exec_time),
            precompute_time: decision.precompute_time(),
            retrieval_time: decision.retrieval_time(),
            wait_time: None,
            submission_time: job.submission_time,
            original_exec_time: job.exec_time,
            dispatch_time: None,
            completion_time: None,
        })?;
        self.last_submission = Some(job.submission_time);

        debug!(
            job_id = job.id,
            score,
            precomputed = decision.is_precomputed(),
            "admitted job"
        );
        self.queue.insert(job, score);
        Ok(())
    }

    fn dispatch(&mut self, job: Job) -> SimResult<()> {
        let now = self
            .now
            .ok_or_else(|| SimError::invariant("dispatch before the clock started"))?;
        let record = self
            .log
            .get(job.id)
            .ok_or_else(|| SimError::invariant(format!("queued job {} has no log record", job.id)))?;

        let mut duration = record.exec_time;
        if self.apply_retrieval_cost {
            duration += record.retrieval_time.unwrap_or(0.0);
        }
        let completion = now + duration;

        let record = self.log.record_dispatch(job.id, now, completion)?;
        debug!(
            job_id = job.id,
            at = now,
            wait_time = record.wait_time,
            duration,
            "dispatched job"
        );

        self.now = Some(completion);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::TieBreaker;
    use crate::models::{JobId, WorkloadParameters, WorkloadTable};
    use crate::validation::ValidationErrorKind;
    use test_log::test;

    fn never_precompute() -> SimConfig {
        SimConfig::default()
            .with_workloads(
                WorkloadTable::new().with_class(0, WorkloadParameters::new(0.0, 0.05, 1.07)),
            )
            .with_seed(0)
    }

    fn always_precompute(speedup: f64) -> SimConfig {
        SimConfig::default()
            .with_workloads(
                WorkloadTable::new().with_class(0, WorkloadParameters::new(1.0, 0.1, speedup)),
            )
            .with_seed(0)
    }

    fn job(id: JobId, submission_time: f64, exec_time: f64) -> Job {
        Job::new(id)
            .with_submission_time(submission_time)
            .with_exec_time(exec_time)
    }

    fn dispatch_ids(log: &ExecutionLog) -> Vec<JobId> {
        log.dispatch_order().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_trace() {
        let log = Simulator::new(never_precompute()).unwrap().run(Vec::new()).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_single_job_bootstrap() {
        let log = Simulator::new(never_precompute())
            .unwrap()
            .run(vec![job(1, 100.0, 5.0)])
            .unwrap();
        let rec = log.get(1).unwrap();
        assert_eq!(rec.wait_time, Some(0.0));
        assert_eq!(rec.dispatch_time, Some(100.0));
        assert_eq!(rec.completion_time, Some(105.0));
    }

    #[test]
    fn test_fifo_timeline() {
        // Equal scores → arrival order; each job waits for the previous one.
        let jobs = vec![job(1, 0.0, 10.0), job(2, 2.0, 5.0), job(3, 3.0, 1.0)];
        let log = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap();

        assert_eq!(log.get(1).unwrap().wait_time, Some(0.0));
        // Job 1 ends at 10; 2 and 3 both admitted by then, 2 first.
        assert_eq!(log.get(2).unwrap().wait_time, Some(8.0));
        assert_eq!(log.get(3).unwrap().wait_time, Some(12.0));
        assert_eq!(dispatch_ids(&log), vec![1, 2, 3]);
    }

    #[test]
    fn test_priority_preempts_queue_order() {
        let jobs = vec![
            job(1, 0.0, 10.0),
            job(2, 1.0, 1.0).with_priority(1.0),
            job(3, 2.0, 1.0).with_priority(50.0),
        ];
        let log = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap();
        // 1 runs alone; at t=10 both 2 and 3 are ready, 3 scores higher.
        assert_eq!(dispatch_ids(&log), vec![1, 3, 2]);
    }

    #[test]
    fn test_idle_gap_keeps_wait_non_negative() {
        let jobs = vec![job(1, 0.0, 1.0), job(2, 50.0, 1.0), job(3, 50.0, 1.0)];
        let log = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap();

        assert_eq!(log.get(2).unwrap().dispatch_time, Some(50.0));
        assert_eq!(log.get(2).unwrap().wait_time, Some(0.0));
        assert_eq!(log.get(3).unwrap().wait_time, Some(1.0));
    }

    #[test]
    fn test_sign_convention_example() {
        let a = job(1, 0.0, 1.0)
            .with_priority(5.0)
            .with_deadline(10.0)
            .with_estimate(2.0);
        let b = job(2, 0.0, 1.0)
            .with_priority(1.0)
            .with_deadline(1.0)
            .with_estimate(1.0);
        let log = Simulator::new(never_precompute()).unwrap().run(vec![a, b]).unwrap();

        assert_eq!(log.get(1).unwrap().priority_key, 3.0);
        assert_eq!(log.get(2).unwrap().priority_key, -1.0);
        assert_eq!(dispatch_ids(&log), vec![2, 1]);
    }

    #[test]
    fn test_bulk_same_arrival() {
        let jobs: Vec<Job> = (0..1000u64)
            .map(|i| job(i, 0.0, 1.0).with_priority(((i * 389) % 1000) as f64))
            .collect();
        let log = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap();

        assert_eq!(log.len(), 1000);
        let priorities: Vec<f64> = log
            .dispatch_order()
            .iter()
            .map(|r| -r.priority_key)
            .collect();
        assert!(priorities.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_precompute_shortens_timeline() {
        let jobs = vec![job(1, 0.0, 10.0), job(2, 0.0, 10.0)];
        let log = Simulator::new(always_precompute(2.0)).unwrap().run(jobs).unwrap();

        let first = log.get(1).unwrap();
        assert!(first.can_precompute);
        assert_eq!(first.exec_time, 5.0);
        assert_eq!(first.precompute_time, Some(1.0));
        assert_eq!(first.retrieval_time, Some(0.0));
        // Second job waits only for the sped-up first job.
        assert_eq!(log.get(2).unwrap().wait_time, Some(5.0));
    }

    #[test]
    fn test_retrieval_cost_applied_when_enabled() {
        let jobs = vec![job(1, 0.0, 10.0), job(2, 0.0, 10.0)];

        let logged_only = always_precompute(2.0).with_retrieval_time(3.0, false);
        let log = Simulator::new(logged_only).unwrap().run(jobs.clone()).unwrap();
        assert_eq!(log.get(1).unwrap().retrieval_time, Some(3.0));
        assert_eq!(log.get(2).unwrap().wait_time, Some(5.0));

        let applied = always_precompute(2.0).with_retrieval_time(3.0, true);
        let log = Simulator::new(applied).unwrap().run(jobs).unwrap();
        assert_eq!(log.get(2).unwrap().wait_time, Some(8.0));
    }

    #[test]
    fn test_non_monotonic_submission_fails() {
        let jobs = vec![job(1, 10.0, 1.0), job(2, 5.0, 1.0)];
        let err = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap_err();
        match err {
            SimError::InputValidation(v) => {
                assert_eq!(v.kind, ValidationErrorKind::NonMonotonicSubmission);
                assert_eq!(v.job_id, Some(2));
                assert_eq!(v.field, Some("submission_time"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_submission_fails() {
        let jobs = vec![job(1, 0.0, 1.0), job(2, f64::NAN, 1.0)];
        let err = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap_err();
        assert!(matches!(err, SimError::InputValidation(_)));
    }

    #[test]
    fn test_duplicate_id_fails() {
        let jobs = vec![job(1, 0.0, 1.0), job(1, 0.0, 1.0)];
        let err = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap_err();
        assert!(matches!(err, SimError::InputValidation(_)));
    }

    #[test]
    fn test_unknown_workload_fails() {
        let jobs = vec![job(1, 0.0, 1.0).with_workload(4)];
        let err = Simulator::new(never_precompute()).unwrap().run(jobs).unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn test_same_seed_same_log() {
        let jobs: Vec<Job> = (0..200u64)
            .map(|i| job(i, (i / 4) as f64, 3.0).with_priority((i % 7) as f64))
            .collect();
        let config = SimConfig::default()
            .with_workloads(
                WorkloadTable::new().with_class(0, WorkloadParameters::new(0.5, 0.1, 1.5)),
            )
            .with_seed(99);

        let a = Simulator::new(config.clone()).unwrap().run(jobs.clone()).unwrap();
        let b = Simulator::new(config).unwrap().run(jobs).unwrap();
        assert_eq!(a, b);
        assert!(a.records().iter().any(|r| r.can_precompute));
        assert!(a.records().iter().any(|r| !r.can_precompute));
    }

    #[test]
    fn test_drawn_seed_is_reported() {
        let sim = Simulator::new(SimConfig::default()).unwrap();
        assert!(sim.seed().is_some());
        let seeded = Simulator::new(SimConfig::default().with_seed(5)).unwrap();
        assert_eq!(seeded.seed(), Some(5));
    }

    #[test]
    fn test_tie_breaker_by_id() {
        let jobs = vec![job(9, 0.0, 1.0), job(3, 0.0, 1.0), job(5, 0.0, 1.0)];
        let config = never_precompute().with_tie_breaker(TieBreaker::ById);
        let log = Simulator::new(config).unwrap().run(jobs).unwrap();
        assert_eq!(dispatch_ids(&log), vec![3, 5, 9]);
    }

    #[test]
    fn test_custom_priority_function() {
        use crate::dispatching::rules;

        // Rank purely by estimate.
        let jobs = vec![
            job(1, 0.0, 1.0).with_estimate(1.0),
            job(2, 0.0, 1.0).with_estimate(9.0),
        ];
        let log = Simulator::new(never_precompute())
            .unwrap()
            .with_priority_function(PriorityFunction::new().with_rule(rules::Estimate))
            .run(jobs)
            .unwrap();
        assert_eq!(dispatch_ids(&log), vec![2, 1]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig::default().with_workloads(
            WorkloadTable::new().with_class(0, WorkloadParameters::new(1.0, 0.05, 0.0)),
        );
        let err = Simulator::new(config.clone()).unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));

        let err = Simulator::with_rng(config, StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn test_negative_retrieval_time_rejected() {
        let config = never_precompute().with_retrieval_time(-0.5, true);
        assert!(Simulator::new(config).is_err());
    }
}
