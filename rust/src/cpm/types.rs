//! Result types for schedule runs.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::dates::{max_date, min_date};
use crate::models::{Activity, ScheduledActivity};
use crate::validation::ScheduleError;

use super::snapshot::InputFingerprint;

/// Which pass a diagnostic refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Backward,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Forward => write!(f, "forward"),
            Pass::Backward => write!(f, "backward"),
        }
    }
}

/// How a single pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    pub iterations: usize,
    /// False only when the fixed-point cap was reached while values still changed.
    pub converged: bool,
}

/// Overall state of a schedule result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// No data date or no activities; nothing was computed.
    Skipped,
    /// Input failed validation; nothing was computed.
    Rejected,
    /// Every activity has all four dates and both passes settled.
    Converged,
    /// Best-effort dates only: a cycle, or a pass that did not settle.
    Provisional,
}

impl ScheduleStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Rejected => "rejected",
            Self::Converged => "converged",
            Self::Provisional => "provisional",
        }
    }
}

/// Non-fatal condition found during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// Predecessor ids that matched no activity; treated as satisfied.
    DanglingPredecessors {
        activity_id: String,
        missing_ids: Vec<String>,
    },
    /// Activities in a predecessor cycle or downstream of one.
    CycleDetected { activity_ids: Vec<String> },
    /// Fixed-point pass hit its iteration cap.
    NonConvergence { pass: Pass, iterations: usize },
    /// Negative duration replaced by zero.
    DurationClamped { activity_id: String, duration_days: i64 },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingPredecessors {
                activity_id,
                missing_ids,
            } => write!(
                f,
                "Activity {} references unknown predecessors: {}",
                activity_id,
                missing_ids.join(", ")
            ),
            Self::CycleDetected { activity_ids } => write!(
                f,
                "Predecessor cycle blocks activities: {}",
                activity_ids.join(", ")
            ),
            Self::NonConvergence { pass, iterations } => write!(
                f,
                "{} pass did not converge after {} iterations",
                pass, iterations
            ),
            Self::DurationClamped {
                activity_id,
                duration_days,
            } => write!(
                f,
                "Activity {} has negative duration {}, using 0",
                activity_id, duration_days
            ),
        }
    }
}

/// Output of a schedule run.
#[derive(Clone, Debug)]
pub struct ScheduleResult {
    pub status: ScheduleStatus,
    /// Activities in input order with their timing.
    pub activities: Vec<ScheduledActivity>,
    pub warnings: Vec<ScheduleWarning>,
    /// Validation failures (only for `Rejected`).
    pub errors: Vec<ScheduleError>,
    pub data_date: Option<NaiveDate>,
    pub algorithm_metadata: HashMap<String, String>,
    pub(crate) fingerprint: InputFingerprint,
}

impl ScheduleResult {
    /// Result carrying the activities with blank timing.
    pub(crate) fn unscheduled(
        status: ScheduleStatus,
        activities: &[Activity],
        data_date: Option<NaiveDate>,
        errors: Vec<ScheduleError>,
    ) -> Self {
        Self {
            status,
            activities: activities
                .iter()
                .cloned()
                .map(ScheduledActivity::unscheduled)
                .collect(),
            warnings: Vec::new(),
            errors,
            data_date,
            algorithm_metadata: HashMap::new(),
            fingerprint: InputFingerprint::of(activities, data_date),
        }
    }

    pub fn is_converged(&self) -> bool {
        self.status == ScheduleStatus::Converged
    }

    pub fn get(&self, id: &str) -> Option<&ScheduledActivity> {
        self.activities.iter().find(|a| a.activity.id == id)
    }

    /// Latest early finish across all activities.
    pub fn project_finish(&self) -> Option<NaiveDate> {
        max_date(self.activities.iter().map(|a| a.timing.early_finish))
    }

    /// Date span a Gantt chart needs: earliest of the data date and all early
    /// starts, through the latest early finish.
    pub fn timeline_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = min_date(
            std::iter::once(self.data_date)
                .chain(self.activities.iter().map(|a| a.timing.early_start)),
        )?;
        let end = self.project_finish()?;
        Some((start, end.max(start)))
    }

    /// Activities by early start; ties and undated activities by id, undated last.
    pub fn sorted_by_early_start(&self) -> Vec<&ScheduledActivity> {
        let mut sorted: Vec<&ScheduledActivity> = self.activities.iter().collect();
        sorted.sort_by(|a, b| compare_by_early_start(a, b));
        sorted
    }

    /// Critical activities by early start.
    pub fn critical_activities(&self) -> Vec<&ScheduledActivity> {
        self.sorted_by_early_start()
            .into_iter()
            .filter(|a| a.timing.is_critical)
            .collect()
    }

    /// Whether durations, predecessors, membership or the data date changed
    /// since this result was computed.
    pub fn is_stale(&self, activities: &[Activity], data_date: Option<NaiveDate>) -> bool {
        self.fingerprint != InputFingerprint::of(activities, data_date)
    }
}

fn compare_by_early_start(a: &ScheduledActivity, b: &ScheduledActivity) -> Ordering {
    match (a.timing.early_start, b.timing.early_start) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id().cmp(b.id())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id().cmp(b.id()),
    }
}
