//! Trace input and log output.
//!
//! - **`reader`**: loads jobs from CSV, JSON array, or JSON-lines traces
//! - **`writer`**: writes the execution log as a CSV table

mod reader;
mod writer;

pub use reader::{read_jobs, read_trace, scan_jobs, scan_trace, TraceScan};
pub use writer::{write_log, write_log_to, LOG_COLUMNS};

use std::path::Path;

/// On-disk trace format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of job objects.
    Json,
    /// One JSON job object per line.
    JsonLines,
}

impl TraceFormat {
    /// Detects the format from the file extension, falling back to the
    /// first non-whitespace byte of `head` (`[` or `{` → JSON, else CSV).
    pub fn detect(path: &Path, head: &[u8]) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("json") => Self::Json,
            Some("jsonl" | "ndjson") => Self::JsonLines,
            _ => match head.iter().find(|b| !b.is_ascii_whitespace()) {
                Some(b'[') => Self::Json,
                Some(b'{') => Self::JsonLines,
                _ => Self::Csv,
            },
        }
    }
}
