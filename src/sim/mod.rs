//! Trace replay: the event loop and run metrics.
//!
//! `Simulator` replays a job trace on a single simulated timeline,
//! dispatching the highest-priority ready job each time the timeline is
//! free. `RunSummary` condenses the resulting log into aggregate metrics.

mod engine;
mod summary;

pub use engine::Simulator;
pub use summary::RunSummary;
