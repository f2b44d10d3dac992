//! Trace reader.
//!
//! Loads job records from CSV or JSON traces. Every record is reduced to a
//! field → text map first, so both formats share one parsing path that
//! names the offending record, job, and field on failure.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::TraceFormat;
use crate::error::{SimError, SimResult};
use crate::models::{Job, JobId, WorkloadClass};
use crate::validation::{ValidationError, ValidationErrorKind};

type RawRecord = HashMap<String, String>;

/// Outcome of reading a trace without stopping at bad records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceScan {
    /// Parsed jobs with their 1-based record numbers.
    pub jobs: Vec<(usize, Job)>,
    /// Records whose fields were missing or malformed.
    pub errors: Vec<ValidationError>,
}

/// Reads a trace file, detecting its format from the path and content.
///
/// Stops at the first record that cannot be parsed.
pub fn read_trace(path: impl AsRef<Path>) -> SimResult<Vec<Job>> {
    let path = path.as_ref();
    let (reader, format) = open_trace(path)?;
    let jobs = read_jobs(reader, format)?;
    info!(path = %path.display(), ?format, jobs = jobs.len(), "loaded trace");
    Ok(jobs)
}

/// Reads a trace file, collecting every field error instead of stopping.
///
/// Syntax errors in the underlying CSV or JSON still abort.
pub fn scan_trace(path: impl AsRef<Path>) -> SimResult<TraceScan> {
    let path = path.as_ref();
    let (reader, format) = open_trace(path)?;
    let scan = scan_jobs(reader, format)?;
    info!(
        path = %path.display(),
        ?format,
        jobs = scan.jobs.len(),
        bad_records = scan.errors.len(),
        "scanned trace"
    );
    Ok(scan)
}

/// Reads jobs from `reader` in the given format.
pub fn read_jobs<R: Read>(reader: R, format: TraceFormat) -> SimResult<Vec<Job>> {
    read_raw(reader, format)?
        .iter()
        .enumerate()
        .map(|(idx, raw)| parse_record(raw, idx + 1))
        .collect()
}

/// Reads jobs from `reader`, collecting field errors per record.
pub fn scan_jobs<R: Read>(reader: R, format: TraceFormat) -> SimResult<TraceScan> {
    let mut scan = TraceScan::default();
    for (idx, raw) in read_raw(reader, format)?.iter().enumerate() {
        let record = idx + 1;
        match parse_record(raw, record) {
            Ok(job) => scan.jobs.push((record, job)),
            Err(SimError::InputValidation(e)) => scan.errors.push(e),
            Err(other) => return Err(other),
        }
    }
    Ok(scan)
}

fn open_trace(path: &Path) -> SimResult<(BufReader<File>, TraceFormat)> {
    let mut head = [0u8; 512];
    let len = File::open(path)
        .and_then(|mut f| f.read(&mut head))
        .map_err(|e| SimError::io(path, e))?;
    let format = TraceFormat::detect(path, &head[..len]);

    let file = File::open(path).map_err(|e| SimError::io(path, e))?;
    Ok((BufReader::new(file), format))
}

fn read_raw<R: Read>(reader: R, format: TraceFormat) -> SimResult<Vec<RawRecord>> {
    match format {
        TraceFormat::Csv => read_csv(reader),
        TraceFormat::Json => read_json(reader),
        TraceFormat::JsonLines => read_json_lines(BufReader::new(reader)),
    }
}

fn read_csv<R: Read>(reader: R) -> SimResult<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.deserialize::<RawRecord>()
        .map(|row| row.map_err(SimError::from))
        .collect()
}

fn read_json<R: Read>(reader: R) -> SimResult<Vec<RawRecord>> {
    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(reader)?;
    Ok(rows.iter().map(json_to_raw).collect())
}

fn read_json_lines<R: BufRead>(reader: R) -> SimResult<Vec<RawRecord>> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| SimError::io("<trace>", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let row: serde_json::Map<String, Value> = serde_json::from_str(&line)?;
        rows.push(json_to_raw(&row));
    }
    Ok(rows)
}

fn json_to_raw(row: &serde_json::Map<String, Value>) -> RawRecord {
    row.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Field lookup over one raw record.
struct Fields<'a> {
    raw: &'a RawRecord,
    record: usize,
    job_id: Option<JobId>,
}

impl Fields<'_> {
    fn text(&self, field: &'static str) -> Option<&str> {
        self.raw
            .get(field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn error(&self, kind: ValidationErrorKind, field: &'static str, message: String) -> SimError {
        let mut err = ValidationError::new(kind, message)
            .on_field(field)
            .at_record(self.record);
        if let Some(id) = self.job_id {
            err = err.for_job(id);
        }
        err.into()
    }

    fn required<T: std::str::FromStr>(&self, field: &'static str) -> SimResult<T> {
        let text = self.text(field).ok_or_else(|| {
            self.error(
                ValidationErrorKind::MissingField,
                field,
                "required field is missing".to_string(),
            )
        })?;
        self.parse(field, text)
    }

    fn optional<T: std::str::FromStr>(&self, field: &'static str) -> SimResult<Option<T>> {
        self.text(field)
            .map(|text| self.parse(field, text))
            .transpose()
    }

    fn parse<T: std::str::FromStr>(&self, field: &'static str, text: &str) -> SimResult<T> {
        text.parse().map_err(|_| {
            self.error(
                ValidationErrorKind::MalformedField,
                field,
                format!("cannot parse {text:?} as a number"),
            )
        })
    }
}

/// Converts one raw record into a job.
fn parse_record(raw: &RawRecord, record: usize) -> SimResult<Job> {
    let mut fields = Fields {
        raw,
        record,
        job_id: None,
    };
    let id: JobId = fields.required("id")?;
    fields.job_id = Some(id);

    let job = Job {
        id,
        priority: fields.required("priority")?,
        scheduling_class: fields.optional("scheduling_class")?,
        submission_time: fields.required("submission_time")?,
        deadline: fields.required("deadline")?,
        estimate: fields.required("estimate")?,
        exec_time: fields.required("exec_time")?,
        workload: fields
            .optional::<u32>("workload_classification")?
            .map(WorkloadClass)
            .unwrap_or_default(),
    };
    debug!(job_id = id, record, "parsed trace record");
    Ok(job)
}
