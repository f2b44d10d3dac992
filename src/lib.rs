//! Trace-driven simulator for precompute-aware priority scheduling.
//!
//! Replays a historical job trace through a single simulated timeline.
//! Each arriving job is probabilistically marked for precomputation
//! (reducing its execution time at a modeled cost), scored by a weighted
//! priority function, and queued; the highest-scoring ready job runs next.
//! The per-job outcome is recorded in an execution log.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `WorkloadTable`, `ExecutionLog`
//! - **`precompute`**: Stochastic eligibility and cost/speedup lookup
//! - **`dispatching`**: Scoring rules, `PriorityFunction`, `ReadyQueue`
//! - **`sim`**: The event loop (`Simulator`) and `RunSummary`
//! - **`trace`**: Trace reader and log writer
//! - **`config`**: `SimConfig`, loaded from JSON
//! - **`validation`**: Input integrity checks
//!
//! # Example
//!
//! ```
//! use precompute_sim::config::SimConfig;
//! use precompute_sim::models::Job;
//! use precompute_sim::sim::{RunSummary, Simulator};
//!
//! let jobs = vec![
//!     Job::new(1).with_priority(5.0).with_deadline(10.0).with_estimate(2.0).with_exec_time(3.0),
//!     Job::new(2).with_priority(1.0).with_deadline(1.0).with_estimate(1.0).with_exec_time(1.0),
//! ];
//! let log = Simulator::new(SimConfig::default().with_seed(7)).unwrap().run(jobs).unwrap();
//! let summary = RunSummary::from_log(&log);
//!
//! assert_eq!(summary.jobs, 2);
//! ```

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod precompute;
pub mod sim;
pub mod trace;
pub mod validation;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use sim::{RunSummary, Simulator};
