//! Input validation for job traces.
//!
//! Checks the integrity of trace records before they reach scoring or
//! timing arithmetic. Detects:
//! - Missing or malformed fields (reported by the trace reader)
//! - Non-finite numeric values
//! - Negative durations
//! - Submission times that go backwards
//! - Duplicate job IDs
//! - Workload classifications absent from the parameter table
//!
//! The simulator applies the per-job checks at admission and stops at the
//! first failure. [`validate_trace`] and [`validate_records`] run every
//! check over a whole trace and report all problems at once.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Job, JobId, WorkloadTable};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error, naming the offending job and field when known.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending job, if its ID could be read.
    pub job_id: Option<JobId>,
    /// 1-based record number in the trace.
    pub record: Option<usize>,
    /// Offending field.
    pub field: Option<&'static str>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required field is absent or empty.
    MissingField,
    /// A field could not be parsed as a number.
    MalformedField,
    /// A numeric field is NaN or infinite.
    NonFiniteValue,
    /// A duration field is negative.
    NegativeDuration,
    /// Submission time is earlier than the previous job's.
    NonMonotonicSubmission,
    /// Two jobs share the same ID.
    DuplicateId,
    /// The job's workload classification has no parameters.
    UnknownWorkload,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            job_id: None,
            record: None,
            field: None,
            message: message.into(),
        }
    }

    /// Attaches the offending job ID.
    pub fn for_job(mut self, id: JobId) -> Self {
        self.job_id = Some(id);
        self
    }

    /// Attaches the offending field name.
    pub fn on_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Attaches the 1-based record number.
    pub fn at_record(mut self, record: usize) -> Self {
        self.record = Some(record);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.job_id, self.record) {
            (Some(id), _) => write!(f, "job {id}")?,
            (None, Some(record)) => write!(f, "record {record}")?,
            (None, None) => write!(f, "trace")?,
        }
        if let Some(field) = self.field {
            write!(f, ", field `{field}`")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Checks that a job's numeric fields are usable.
///
/// All scoring and timing inputs must be finite; `exec_time` and
/// `estimate` must not be negative.
pub fn validate_job(job: &Job) -> Result<(), ValidationError> {
    let numeric: [(&'static str, f64); 5] = [
        ("priority", job.priority),
        ("submission_time", job.submission_time),
        ("deadline", job.deadline),
        ("estimate", job.estimate),
        ("exec_time", job.exec_time),
    ];
    for (field, value) in numeric {
        if !value.is_finite() {
            return Err(ValidationError::new(
                ValidationErrorKind::NonFiniteValue,
                format!("value {value} is not finite"),
            )
            .for_job(job.id)
            .on_field(field));
        }
    }

    for (field, value) in [("estimate", job.estimate), ("exec_time", job.exec_time)] {
        if value < 0.0 {
            return Err(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("duration {value} is negative"),
            )
            .for_job(job.id)
            .on_field(field));
        }
    }

    Ok(())
}

/// Checks that `job` does not arrive before the previously admitted job.
pub fn check_arrival_order(previous: Option<f64>, job: &Job) -> Result<(), ValidationError> {
    match previous {
        Some(prev) if job.submission_time < prev => Err(ValidationError::new(
            ValidationErrorKind::NonMonotonicSubmission,
            format!(
                "submission time {} precedes previous submission time {prev}",
                job.submission_time
            ),
        )
        .for_job(job.id)
        .on_field("submission_time")),
        _ => Ok(()),
    }
}

/// Validates a complete trace against a workload table.
///
/// Checks:
/// 1. Every job passes [`validate_job`]
/// 2. Submission times are non-decreasing
/// 3. No duplicate job IDs
/// 4. Every workload classification has parameters
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_trace(jobs: &[Job], workloads: &WorkloadTable) -> ValidationResult {
    validate_records(
        jobs.iter().enumerate().map(|(idx, job)| (idx + 1, job)),
        workloads,
    )
}

/// Same checks as [`validate_trace`], over jobs tagged with their trace
/// record numbers (records that failed to parse are simply absent).
pub fn validate_records<'a, I>(records: I, workloads: &WorkloadTable) -> ValidationResult
where
    I: IntoIterator<Item = (usize, &'a Job)>,
{
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    let mut previous = None;

    for (record, job) in records {

        if let Err(e) = validate_job(job) {
            errors.push(e.at_record(record));
        }

        if let Err(e) = check_arrival_order(previous, job) {
            errors.push(e.at_record(record));
        }
        if job.submission_time.is_finite() {
            previous = Some(job.submission_time);
        }

        if !ids.insert(job.id) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate job ID: {}", job.id),
                )
                .for_job(job.id)
                .on_field("id")
                .at_record(record),
            );
        }

        if !workloads.contains(job.workload) {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::UnknownWorkload,
                    format!("no parameters for workload classification {}", job.workload),
                )
                .for_job(job.id)
                .on_field("workload_classification")
                .at_record(record),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: JobId, submission_time: f64) -> Job {
        Job::new(id)
            .with_submission_time(submission_time)
            .with_exec_time(10.0)
            .with_estimate(8.0)
    }

    #[test]
    fn test_valid_trace() {
        let jobs = vec![job(1, 0.0), job(2, 0.0), job(3, 5.0)];
        assert!(validate_trace(&jobs, &WorkloadTable::default()).is_ok());
    }

    #[test]
    fn test_non_finite_value_names_job_and_field() {
        let bad = job(4, 0.0).with_deadline(f64::NAN);
        let err = validate_job(&bad).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NonFiniteValue);
        assert_eq!(err.job_id, Some(4));
        assert_eq!(err.field, Some("deadline"));
        assert!(err.to_string().starts_with("job 4, field `deadline`"));
    }

    #[test]
    fn test_negative_exec_time() {
        let bad = job(1, 0.0).with_exec_time(-1.0);
        let err = validate_job(&bad).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NegativeDuration);
        assert_eq!(err.field, Some("exec_time"));
    }

    #[test]
    fn test_arrival_order() {
        assert!(check_arrival_order(None, &job(1, 5.0)).is_ok());
        assert!(check_arrival_order(Some(5.0), &job(2, 5.0)).is_ok());

        let err = check_arrival_order(Some(5.0), &job(3, 4.0)).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NonMonotonicSubmission);
        assert_eq!(err.job_id, Some(3));
        assert_eq!(err.field, Some("submission_time"));
    }

    #[test]
    fn test_duplicate_id() {
        let jobs = vec![job(1, 0.0), job(1, 1.0)];
        let errors = validate_trace(&jobs, &WorkloadTable::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.record == Some(2)));
    }

    #[test]
    fn test_unknown_workload() {
        let jobs = vec![job(1, 0.0).with_workload(7)];
        let errors = validate_trace(&jobs, &WorkloadTable::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownWorkload);
    }

    #[test]
    fn test_multiple_errors() {
        let jobs = vec![
            job(1, 10.0),
            job(2, 5.0),                       // goes backwards
            job(3, 20.0).with_exec_time(-2.0), // negative duration
        ];
        let errors = validate_trace(&jobs, &WorkloadTable::default()).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_display_without_id() {
        let err = ValidationError::new(ValidationErrorKind::MissingField, "missing value")
            .on_field("id")
            .at_record(3);
        assert_eq!(err.to_string(), "record 3, field `id`: missing value");
    }

    #[test]
    fn test_validate_records_keeps_record_numbers() {
        let a = job(1, 0.0);
        let b = job(1, 1.0);
        let errors = validate_records([(2, &a), (5, &b)], &WorkloadTable::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
        assert_eq!(errors[0].record, Some(5));
    }
}
