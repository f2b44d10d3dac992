//! Simulation domain models.
//!
//! Provides the data types that flow through a trace replay: the jobs
//! read from the trace, the per-workload precompute economics, and the
//! execution log produced by the simulator.
//!
//! | Type | Role |
//! |------|------|
//! | `Job` | One trace record |
//! | `WorkloadTable` | Classification → precompute economics |
//! | `LogRecord` | Per-job outcome |
//! | `ExecutionLog` | Log table of a run |

mod job;
mod log;
mod workload;

pub use job::{Job, JobId};
pub use log::{ExecutionLog, LogRecord};
pub use workload::{WorkloadClass, WorkloadEntry, WorkloadParameters, WorkloadTable};
