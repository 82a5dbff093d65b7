//! Working dates for one schedule run.

use chrono::NaiveDate;

use crate::graph::ActivityIdx;
use crate::models::{span_days, ActivityTiming};

/// Per-activity dates indexed by `ActivityIdx`, filled in by the passes.
#[derive(Clone, Debug)]
pub struct PassState {
    pub data_date: NaiveDate,
    /// Non-negative durations (already clamped or validated).
    pub durations: Vec<i64>,
    pub early_start: Vec<Option<NaiveDate>>,
    pub early_finish: Vec<Option<NaiveDate>>,
    pub late_start: Vec<Option<NaiveDate>>,
    pub late_finish: Vec<Option<NaiveDate>>,
}

impl PassState {
    pub fn new(data_date: NaiveDate, durations: Vec<i64>) -> Self {
        let n = durations.len();
        Self {
            data_date,
            durations,
            early_start: vec![None; n],
            early_finish: vec![None; n],
            late_start: vec![None; n],
            late_finish: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    #[inline]
    pub fn span(&self, idx: ActivityIdx) -> i64 {
        span_days(self.durations[idx as usize])
    }

    /// Timing for one activity, without float or criticality.
    pub fn timing(&self, idx: ActivityIdx) -> ActivityTiming {
        let i = idx as usize;
        ActivityTiming {
            early_start: self.early_start[i],
            early_finish: self.early_finish[i],
            late_start: self.late_start[i],
            late_finish: self.late_finish[i],
            total_float: None,
            is_critical: false,
        }
    }
}
