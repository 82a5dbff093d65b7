//! Core data types for the schedule calculator.

use chrono::NaiveDate;
use pyo3::prelude::*;

/// An activity as edited by the user: duration plus finish-to-start predecessors.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    #[pyo3(get, set)]
    pub id: String,
    /// Duration in calendar days. Zero marks a milestone.
    #[pyo3(get, set)]
    pub duration_days: i64,
    #[pyo3(get, set)]
    pub predecessor_ids: Vec<String>,
}

impl Activity {
    pub fn with_predecessors<I, S>(id: impl Into<String>, duration_days: i64, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            duration_days,
            predecessor_ids: predecessors.into_iter().map(Into::into).collect(),
        }
    }

    /// Days from start to finish date: `max(duration - 1, 0)`.
    ///
    /// A one-day activity starts and finishes on the same date.
    pub fn span_days(&self) -> i64 {
        span_days(self.duration_days)
    }
}

pub(crate) fn span_days(duration_days: i64) -> i64 {
    (duration_days - 1).max(0)
}

#[pymethods]
impl Activity {
    #[new]
    #[pyo3(signature = (id, duration_days, predecessor_ids=None))]
    fn new(id: String, duration_days: i64, predecessor_ids: Option<Vec<String>>) -> Self {
        Self {
            id,
            duration_days,
            predecessor_ids: predecessor_ids.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={:?}, duration_days={}, predecessors={})",
            self.id,
            self.duration_days,
            self.predecessor_ids.len()
        )
    }
}

/// Dates and float derived by a schedule run.
///
/// Never edited by hand; every run replaces it wholesale.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityTiming {
    #[pyo3(get)]
    pub early_start: Option<NaiveDate>,
    #[pyo3(get)]
    pub early_finish: Option<NaiveDate>,
    #[pyo3(get)]
    pub late_start: Option<NaiveDate>,
    #[pyo3(get)]
    pub late_finish: Option<NaiveDate>,
    /// Whole days between early and late start.
    #[pyo3(get)]
    pub total_float: Option<i64>,
    #[pyo3(get)]
    pub is_critical: bool,
}

impl ActivityTiming {
    /// True once both passes have produced all four dates.
    pub fn is_complete(&self) -> bool {
        self.early_start.is_some()
            && self.early_finish.is_some()
            && self.late_start.is_some()
            && self.late_finish.is_some()
    }
}

#[pymethods]
impl ActivityTiming {
    fn __repr__(&self) -> String {
        format!(
            "ActivityTiming(es={:?}, ef={:?}, ls={:?}, lf={:?}, float={:?}, critical={})",
            self.early_start,
            self.early_finish,
            self.late_start,
            self.late_finish,
            self.total_float,
            self.is_critical
        )
    }
}

/// An activity together with the timing computed for it.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledActivity {
    #[pyo3(get)]
    pub activity: Activity,
    #[pyo3(get)]
    pub timing: ActivityTiming,
}

impl ScheduledActivity {
    pub fn unscheduled(activity: Activity) -> Self {
        Self {
            activity,
            timing: ActivityTiming::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.activity.id
    }
}

#[pymethods]
impl ScheduledActivity {
    #[getter]
    fn get_id(&self) -> String {
        self.activity.id.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduledActivity(id={:?}, es={:?}, ef={:?}, float={:?}, critical={})",
            self.activity.id,
            self.timing.early_start,
            self.timing.early_finish,
            self.timing.total_float,
            self.timing.is_critical
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_days() {
        assert_eq!(Activity::with_predecessors("m", 0, Vec::<String>::new()).span_days(), 0);
        assert_eq!(Activity::with_predecessors("a", 1, Vec::<String>::new()).span_days(), 0);
        assert_eq!(Activity::with_predecessors("b", 5, ["a"]).span_days(), 4);
        assert_eq!(span_days(-3), 0);
    }

    #[test]
    fn test_timing_complete() {
        let mut timing = ActivityTiming::default();
        assert!(!timing.is_complete());
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        timing.early_start = Some(date);
        timing.early_finish = Some(date);
        timing.late_start = Some(date);
        assert!(!timing.is_complete());
        timing.late_finish = Some(date);
        assert!(timing.is_complete());
    }
}
