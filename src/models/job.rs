//! Job model.
//!
//! A job is one record of the replayed trace: a unit of work with a
//! submission time, scoring inputs, and the duration it actually ran for.
//!
//! # Time Representation
//! All times are simulated time units relative to the trace epoch. The
//! trace defines what a unit means (seconds, microseconds, ...); the
//! simulator only requires that every field uses the same unit.

use serde::{Deserialize, Serialize};

use super::WorkloadClass;

/// Unique job identifier as it appears in the trace.
pub type JobId = u64;

/// A job to be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Scheduling priority (higher = more important).
    pub priority: f64,
    /// Scheduling class from the trace. Carried as metadata only.
    pub scheduling_class: Option<i64>,
    /// Time the job entered the system; also the time it became ready.
    pub submission_time: f64,
    /// Deadline timestamp.
    pub deadline: f64,
    /// Expected duration as estimated at submission.
    pub estimate: f64,
    /// Duration the job actually ran for without precomputation.
    pub exec_time: f64,
    /// Key into the workload parameter table.
    pub workload: WorkloadClass,
}

impl Job {
    /// Creates a job with the given ID, submitted at t=0 with zeroed fields.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            priority: 0.0,
            scheduling_class: None,
            submission_time: 0.0,
            deadline: 0.0,
            estimate: 0.0,
            exec_time: 0.0,
            workload: WorkloadClass::default(),
        }
    }

    /// Sets the scheduling priority.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the scheduling class metadata.
    pub fn with_scheduling_class(mut self, class: i64) -> Self {
        self.scheduling_class = Some(class);
        self
    }

    /// Sets the submission time.
    pub fn with_submission_time(mut self, time: f64) -> Self {
        self.submission_time = time;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the duration estimate.
    pub fn with_estimate(mut self, estimate: f64) -> Self {
        self.estimate = estimate;
        self
    }

    /// Sets the actual execution time.
    pub fn with_exec_time(mut self, exec_time: f64) -> Self {
        self.exec_time = exec_time;
        self
    }

    /// Sets the workload classification.
    pub fn with_workload(mut self, workload: impl Into<WorkloadClass>) -> Self {
        self.workload = workload.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder() {
        let job = Job::new(7)
            .with_priority(3.0)
            .with_scheduling_class(2)
            .with_submission_time(10.0)
            .with_deadline(50.0)
            .with_estimate(4.0)
            .with_exec_time(5.5)
            .with_workload(1);

        assert_eq!(job.id, 7);
        assert_eq!(job.priority, 3.0);
        assert_eq!(job.scheduling_class, Some(2));
        assert_eq!(job.submission_time, 10.0);
        assert_eq!(job.deadline, 50.0);
        assert_eq!(job.estimate, 4.0);
        assert_eq!(job.exec_time, 5.5);
        assert_eq!(job.workload, WorkloadClass(1));
    }

    #[test]
    fn test_job_defaults_to_class_zero() {
        let job = Job::new(1);
        assert_eq!(job.workload, WorkloadClass(0));
        assert!(job.scheduling_class.is_none());
    }
}
