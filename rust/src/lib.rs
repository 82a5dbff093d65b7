//! Critical path schedule calculator.
//!
//! Given activities with durations and finish-to-start predecessors, computes
//! early/late start and finish dates, total float and the critical path.
//! Usable as a Rust library or, with the `extension-module` feature, as a
//! Python extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

mod config;
pub mod cpm;
pub mod dates;
pub mod graph;
mod logging;
mod models;
pub mod validation;

pub use config::{
    ConfigError, DurationPolicy, PassStrategy, ResolvedConfig, ScheduleConfig, TerminalRule,
};
pub use cpm::{
    compute_schedule, CpmScheduler, Pass, PassOutcome, ScheduleResult, ScheduleStatus,
    ScheduleWarning,
};
pub use dates::{add_days, days_between, max_date, min_date, parse_date, DateError};
pub use models::{Activity, ActivityTiming, ScheduledActivity};
pub use validation::ScheduleError;

/// Schedule result as seen from Python: status and diagnostics as strings.
#[pyclass(name = "ScheduleResult")]
#[derive(Clone, Debug)]
pub struct PyScheduleResult {
    /// "skipped", "rejected", "converged" or "provisional"
    #[pyo3(get)]
    pub status: String,
    #[pyo3(get)]
    pub activities: Vec<ScheduledActivity>,
    #[pyo3(get)]
    pub warnings: Vec<String>,
    #[pyo3(get)]
    pub errors: Vec<String>,
    #[pyo3(get)]
    pub data_date: Option<NaiveDate>,
    #[pyo3(get)]
    pub project_finish: Option<NaiveDate>,
    #[pyo3(get)]
    pub timeline_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Critical activity ids by early start.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub algorithm_metadata: HashMap<String, String>,
}

impl From<ScheduleResult> for PyScheduleResult {
    fn from(result: ScheduleResult) -> Self {
        let critical_path = result
            .critical_activities()
            .iter()
            .map(|a| a.id().to_string())
            .collect();
        Self {
            status: result.status.name().to_string(),
            warnings: result.warnings.iter().map(|w| w.to_string()).collect(),
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
            data_date: result.data_date,
            project_finish: result.project_finish(),
            timeline_bounds: result.timeline_bounds(),
            critical_path,
            algorithm_metadata: result.algorithm_metadata,
            activities: result.activities,
        }
    }
}

#[pymethods]
impl PyScheduleResult {
    fn is_converged(&self) -> bool {
        self.status == ScheduleStatus::Converged.name()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(status={:?}, activities={}, warnings={}, project_finish={:?})",
            self.status,
            self.activities.len(),
            self.warnings.len(),
            self.project_finish
        )
    }
}

/// Compute early/late dates, float and criticality.
///
/// # Arguments
/// * `activities` - Activities to schedule (not modified)
/// * `data_date` - Earliest start for activities without predecessors
/// * `config` - Schedule configuration (defaults if omitted)
///
/// # Raises
/// * ValueError if the configuration names an unknown strategy, rule or policy
#[pyfunction]
#[pyo3(name = "compute_schedule", signature = (activities, data_date=None, config=None))]
fn py_compute_schedule(
    activities: Vec<Activity>,
    data_date: Option<NaiveDate>,
    config: Option<ScheduleConfig>,
) -> PyResult<PyScheduleResult> {
    let config = config.unwrap_or_default();
    match compute_schedule(&activities, data_date, &config) {
        Ok(result) => Ok(result.into()),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// The cpm_rust Python module.
#[pymodule]
fn cpm_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<Activity>()?;
    m.add_class::<ActivityTiming>()?;
    m.add_class::<ScheduledActivity>()?;
    m.add_class::<PyScheduleResult>()?;

    // Config types
    m.add_class::<ScheduleConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_compute_schedule, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_python_view_of_result() {
        let activities = vec![
            Activity::with_predecessors("a", 3, Vec::<String>::new()),
            Activity::with_predecessors("b", 2, ["a", "missing"]),
            Activity::with_predecessors("d", 1, Vec::<String>::new()),
        ];
        let result = compute_schedule(&activities, Some(d(2024, 1, 1)), &ScheduleConfig::default())
            .unwrap();
        let view = PyScheduleResult::from(result);

        assert_eq!(view.status, "converged");
        assert!(view.is_converged());
        assert_eq!(view.project_finish, Some(d(2024, 1, 5)));
        assert_eq!(view.timeline_bounds, Some((d(2024, 1, 1), d(2024, 1, 5))));
        assert_eq!(view.critical_path, vec!["a", "b"]);
        assert_eq!(
            view.warnings,
            vec!["Activity b references unknown predecessors: missing"]
        );
        assert!(view.errors.is_empty());
    }

    #[test]
    fn test_python_view_of_rejection() {
        let activities = vec![Activity::with_predecessors("a", 1, ["a"])];
        let result = compute_schedule(&activities, Some(d(2024, 1, 1)), &ScheduleConfig::default())
            .unwrap();
        let view = PyScheduleResult::from(result);

        assert_eq!(view.status, "rejected");
        assert_eq!(view.errors, vec!["Activity a lists itself as a predecessor"]);
        assert_eq!(view.project_finish, None);
    }
}
