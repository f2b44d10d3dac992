//! Log writer.
//!
//! Writes the execution log as a CSV table, one row per job in admission
//! order. Files are written under a `.partial` name and renamed into place
//! only once the whole table is flushed.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::models::{ExecutionLog, JobId, LogRecord};

/// Output table columns, in order.
pub const LOG_COLUMNS: [&str; 7] = [
    "id",
    "priority",
    "can_precompute",
    "exec_time",
    "precompute_time",
    "retrieval_time",
    "wait_time",
];

#[derive(Debug, Serialize)]
struct LogRow {
    id: JobId,
    priority: f64,
    can_precompute: u8,
    exec_time: f64,
    precompute_time: Option<f64>,
    retrieval_time: Option<f64>,
    wait_time: Option<f64>,
}

impl From<&LogRecord> for LogRow {
    fn from(record: &LogRecord) -> Self {
        Self {
            id: record.id,
            priority: record.priority_key,
            can_precompute: u8::from(record.can_precompute),
            exec_time: record.exec_time,
            precompute_time: record.precompute_time,
            retrieval_time: record.retrieval_time,
            wait_time: record.wait_time,
        }
    }
}

/// Writes the log table to `writer`.
///
/// # Errors
/// `SimError::InternalInvariant` if any job is still undispatched; nothing
/// is written in that case.
pub fn write_log_to<W: Write>(writer: W, log: &ExecutionLog) -> SimResult<()> {
    if !log.is_complete() {
        return Err(SimError::invariant(
            "refusing to write a log with undispatched jobs",
        ));
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(LOG_COLUMNS)?;
    for record in log.records() {
        wtr.serialize(LogRow::from(record))?;
    }
    wtr.flush().map_err(|e| SimError::io("<log>", e))?;
    Ok(())
}

/// Writes the log table to `path`.
///
/// The table only appears under `path` once fully written; on failure the
/// partial file is removed.
pub fn write_log(path: impl AsRef<Path>, log: &ExecutionLog) -> SimResult<()> {
    let path = path.as_ref();
    let partial = partial_path(path);

    let result = File::create(&partial)
        .map_err(|e| SimError::io(&partial, e))
        .and_then(|file| write_log_to(file, log))
        .and_then(|()| fs::rename(&partial, path).map_err(|e| SimError::io(path, e)));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&partial) {
            warn!(path = %partial.display(), error = %e, "failed to remove partial output");
        }
        return result;
    }

    info!(path = %path.display(), rows = log.len(), "wrote execution log");
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}
