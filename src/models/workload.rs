//! Workload classifications and their precompute economics.
//!
//! Each job carries a [`WorkloadClass`]; the [`WorkloadTable`] maps the
//! class to the [`WorkloadParameters`] that govern whether the job may be
//! precomputed, what that costs, and how much it speeds execution up.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Workload classification key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkloadClass(pub u32);

impl From<u32> for WorkloadClass {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for WorkloadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Precompute economics of one workload classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadParameters {
    /// Fraction of jobs eligible for precomputation (0.0..=1.0).
    pub precomputable_ratio: f64,
    /// Precompute cost as a fraction of `exec_time`.
    pub precompute_time_ratio: f64,
    /// Divisor applied to `exec_time` once precomputed.
    pub speedup_factor: f64,
}

impl WorkloadParameters {
    /// Creates a parameter set.
    pub fn new(precomputable_ratio: f64, precompute_time_ratio: f64, speedup_factor: f64) -> Self {
        Self {
            precomputable_ratio,
            precompute_time_ratio,
            speedup_factor,
        }
    }

    /// Checks value ranges.
    pub fn validate(&self, class: WorkloadClass) -> SimResult<()> {
        if !(0.0..=1.0).contains(&self.precomputable_ratio) {
            return Err(SimError::configuration(format!(
                "workload {class}: precomputable_ratio {} outside [0, 1]",
                self.precomputable_ratio
            )));
        }
        if !self.precompute_time_ratio.is_finite() || self.precompute_time_ratio < 0.0 {
            return Err(SimError::configuration(format!(
                "workload {class}: precompute_time_ratio {} must be finite and >= 0",
                self.precompute_time_ratio
            )));
        }
        if !self.speedup_factor.is_finite() || self.speedup_factor <= 0.0 {
            return Err(SimError::configuration(format!(
                "workload {class}: speedup_factor {} must be finite and > 0",
                self.speedup_factor
            )));
        }
        Ok(())
    }
}

impl Default for WorkloadParameters {
    /// Microbenchmark figures: 10% of jobs eligible, 5% precompute cost,
    /// 1.07x speedup.
    fn default() -> Self {
        Self::new(0.1, 0.05, 1.07)
    }
}

/// Serialized form of one table row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkloadEntry {
    pub class: WorkloadClass,
    #[serde(flatten)]
    pub parameters: WorkloadParameters,
}

/// Classification → parameters lookup.
///
/// Serialized as a list of `{class, precomputable_ratio,
/// precompute_time_ratio, speedup_factor}` objects. Duplicate classes and
/// out-of-range values are rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorkloadEntry>", into = "Vec<WorkloadEntry>")]
pub struct WorkloadTable {
    entries: BTreeMap<WorkloadClass, WorkloadParameters>,
}

impl WorkloadTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the parameters for a class.
    pub fn with_class(
        mut self,
        class: impl Into<WorkloadClass>,
        parameters: WorkloadParameters,
    ) -> Self {
        self.entries.insert(class.into(), parameters);
        self
    }

    /// Looks up a class.
    ///
    /// # Errors
    /// `SimError::Configuration` if the class has no entry.
    pub fn get(&self, class: WorkloadClass) -> SimResult<&WorkloadParameters> {
        self.entries.get(&class).ok_or_else(|| {
            SimError::configuration(format!("no parameters for workload classification {class}"))
        })
    }

    /// Whether the class has an entry.
    pub fn contains(&self, class: WorkloadClass) -> bool {
        self.entries.contains_key(&class)
    }

    /// Validates every entry.
    pub fn validate(&self) -> SimResult<()> {
        self.entries
            .iter()
            .try_for_each(|(&class, params)| params.validate(class))
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WorkloadTable {
    fn default() -> Self {
        Self::new().with_class(0, WorkloadParameters::default())
    }
}

impl TryFrom<Vec<WorkloadEntry>> for WorkloadTable {
    type Error = SimError;

    fn try_from(rows: Vec<WorkloadEntry>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for row in rows {
            row.parameters.validate(row.class)?;
            if entries.insert(row.class, row.parameters).is_some() {
                return Err(SimError::configuration(format!(
                    "duplicate workload classification {}",
                    row.class
                )));
            }
        }
        Ok(Self { entries })
    }
}

impl From<WorkloadTable> for Vec<WorkloadEntry> {
    fn from(table: WorkloadTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(class, parameters)| WorkloadEntry { class, parameters })
            .collect()
    }
}
