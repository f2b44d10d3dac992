//! Run metrics.
//!
//! Computes aggregate indicators from a completed execution log.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Precompute rate | Fraction of jobs precomputed |
//! | Avg / max wait | Over all dispatched jobs |
//! | Avg exec time | Mean effective execution time |
//! | Total precompute time | Sum of speculative work |
//! | Time saved | Sum of original − effective exec time |
//! | Makespan | Last completion − first submission |

use serde::Serialize;

use crate::models::ExecutionLog;

/// Aggregate metrics of one run.
///
/// All time values are in trace time units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of jobs in the log.
    pub jobs: usize,
    /// Number of precomputed jobs.
    pub precomputed: usize,
    /// `precomputed / jobs` (0.0 for an empty log).
    pub precompute_rate: f64,
    pub avg_wait_time: f64,
    pub max_wait_time: f64,
    /// Mean effective execution time.
    pub avg_exec_time: f64,
    pub total_precompute_time: f64,
    /// Execution time removed by precomputation.
    pub total_time_saved: f64,
    pub makespan: f64,
}

impl RunSummary {
    /// Computes metrics over every record in `log`.
    pub fn from_log(log: &ExecutionLog) -> Self {
        let records = log.records();
        let jobs = records.len();

        let mut precomputed = 0;
        let mut total_wait = 0.0;
        let mut max_wait: f64 = 0.0;
        let mut total_exec = 0.0;
        let mut total_precompute = 0.0;
        let mut total_saved = 0.0;
        let mut first_submission = f64::INFINITY;
        let mut last_completion = f64::NEG_INFINITY;

        for record in records {
            if record.can_precompute {
                precomputed += 1;
            }
            let wait = record.wait_time.unwrap_or(0.0);
            total_wait += wait;
            max_wait = max_wait.max(wait);
            total_exec += record.exec_time;
            total_precompute += record.precompute_time.unwrap_or(0.0);
            total_saved += record.time_saved();
            first_submission = first_submission.min(record.submission_time);
            if let Some(completion) = record.completion_time {
                last_completion = last_completion.max(completion);
            }
        }

        let mean = |total: f64| if jobs == 0 { 0.0 } else { total / jobs as f64 };
        let makespan = if last_completion >= first_submission {
            last_completion - first_submission
        } else {
            0.0
        };

        Self {
            jobs,
            precomputed,
            precompute_rate: mean(precomputed as f64),
            avg_wait_time: mean(total_wait),
            max_wait_time: max_wait,
            avg_exec_time: mean(total_exec),
            total_precompute_time: total_precompute,
            total_time_saved: total_saved,
            makespan,
        }
    }
}
