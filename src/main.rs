mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use precompute_sim::config::SimConfig;
use precompute_sim::sim::{RunSummary, Simulator};
use precompute_sim::{trace, validation};

/// Replays a job trace through the precompute-aware priority scheduler
/// and writes the per-job execution log.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Job trace (CSV, JSON array, or JSON lines).
    #[arg(value_hint = clap::ValueHint::FilePath)]
    trace: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = "out.csv", value_hint = clap::ValueHint::FilePath)]
    output: PathBuf,

    /// JSON simulation config.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Seed for the precompute eligibility draws (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Charge retrieval time against the simulated clock.
    #[arg(long)]
    apply_retrieval_cost: bool,

    /// Validate the trace, reporting every bad record, and exit without
    /// simulating. Unreadable CSV/JSON syntax still stops at the first error.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if cli.check {
        return check(&cli, &config);
    }

    let jobs = trace::read_trace(&cli.trace)
        .with_context(|| format!("reading trace {}", cli.trace.display()))?;

    let log = Simulator::new(config)
        .context("invalid simulation config")?
        .run(jobs)
        .context("simulation failed")?;

    let summary = RunSummary::from_log(&log);
    tracing::info!(
        jobs = summary.jobs,
        precomputed = summary.precomputed,
        avg_wait_time = summary.avg_wait_time,
        max_wait_time = summary.max_wait_time,
        makespan = summary.makespan,
        "run summary"
    );

    trace::write_log(&cli.output, &log)
        .with_context(|| format!("writing log {}", cli.output.display()))?;
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.apply_retrieval_cost {
        config.apply_retrieval_cost = true;
    }
    Ok(config)
}

fn check(cli: &Cli, config: &SimConfig) -> Result<()> {
    let scan = trace::scan_trace(&cli.trace)
        .with_context(|| format!("reading trace {}", cli.trace.display()))?;

    let mut problems = scan.errors;
    let records = scan.jobs.iter().map(|(record, job)| (*record, job));
    if let Err(errors) = validation::validate_records(records, &config.workloads) {
        problems.extend(errors);
    }
    problems.sort_by_key(|e| e.record);

    if problems.is_empty() {
        tracing::info!(jobs = scan.jobs.len(), "trace is valid");
        return Ok(());
    }
    for problem in &problems {
        tracing::error!("{problem}");
    }
    anyhow::bail!("trace has {} problem(s)", problems.len())
}
