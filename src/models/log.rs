//! Execution log (simulation output) model.
//!
//! One [`LogRecord`] per admitted job. The admission-time fields are
//! fixed when the record is created; the dispatch-time fields are filled
//! exactly once when the job leaves the ready queue.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::JobId;
use crate::error::{SimError, SimResult};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Job identifier.
    pub id: JobId,
    /// Negated priority score (lower = dispatched earlier).
    pub priority_key: f64,
    /// Whether the decision model precomputed this job.
    pub can_precompute: bool,
    /// Effective execution time (speedup-adjusted when precomputed).
    pub exec_time: f64,
    /// Speculative precompute cost. `None` unless precomputed.
    pub precompute_time: Option<f64>,
    /// Cost of retrieving the precomputed result. `None` unless precomputed.
    pub retrieval_time: Option<f64>,
    /// Time between submission and dispatch. `None` until dispatched.
    pub wait_time: Option<f64>,
    /// Submission (ready) time from the trace.
    pub submission_time: f64,
    /// Execution time from the trace, before any speedup.
    pub original_exec_time: f64,
    /// Simulated time the job was dispatched.
    pub dispatch_time: Option<f64>,
    /// Simulated time the job finished.
    pub completion_time: Option<f64>,
}

impl LogRecord {
    /// Whether the job has been dispatched.
    #[inline]
    pub fn is_dispatched(&self) -> bool {
        self.wait_time.is_some()
    }

    /// Execution time removed by precomputation.
    pub fn time_saved(&self) -> f64 {
        if self.can_precompute {
            self.original_exec_time - self.exec_time
        } else {
            0.0
        }
    }
}

/// The log table of a run, in admission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionLog {
    records: Vec<LogRecord>,
    index: HashMap<JobId, usize>,
}

impl ExecutionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record of a newly admitted job.
    ///
    /// # Errors
    /// `SimError::InputValidation` (duplicate ID) if the job already has a
    /// record.
    pub fn admit(&mut self, record: LogRecord) -> SimResult<()> {
        if self.index.contains_key(&record.id) {
            return Err(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("job {} appears more than once in the trace", record.id),
            )
            .for_job(record.id)
            .on_field("id")
            .into());
        }
        self.index.insert(record.id, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Writes the dispatch-time fields of a job's record.
    ///
    /// # Errors
    /// `SimError::InternalInvariant` if the job has no record or was
    /// already dispatched.
    pub fn record_dispatch(
        &mut self,
        id: JobId,
        dispatch_time: f64,
        completion_time: f64,
    ) -> SimResult<&LogRecord> {
        let &idx = self
            .index
            .get(&id)
            .ok_or_else(|| SimError::invariant(format!("dispatched job {id} has no log record")))?;
        let record = &mut self.records[idx];
        if record.is_dispatched() {
            return Err(SimError::invariant(format!(
                "job {id} dispatched more than once"
            )));
        }
        record.wait_time = Some(dispatch_time - record.submission_time);
        record.dispatch_time = Some(dispatch_time);
        record.completion_time = Some(completion_time);
        Ok(record)
    }

    /// Looks up a job's record.
    pub fn get(&self, id: JobId) -> Option<&LogRecord> {
        self.index.get(&id).map(|&idx| &self.records[idx])
    }

    /// All records in admission order.
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Records ordered by dispatch time.
    pub fn dispatch_order(&self) -> Vec<&LogRecord> {
        let mut dispatched: Vec<&LogRecord> =
            self.records.iter().filter(|r| r.is_dispatched()).collect();
        dispatched.sort_by(|a, b| {
            a.dispatch_time
                .partial_cmp(&b.dispatch_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        dispatched
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether every admitted job has been dispatched.
    pub fn is_complete(&self) -> bool {
        self.records.iter().all(LogRecord::is_dispatched)
    }
}
