//! Input validation run before any schedule pass.
//!
//! Detects:
//! - Empty or duplicate activity ids
//! - Activities listing themselves as a predecessor
//! - Negative durations (unless the clamp policy is active)
//!
//! Unknown predecessor ids are not errors; the graph reports them as warnings.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::config::DurationPolicy;
use crate::dates::DateError;
use crate::models::Activity;

/// Reason a schedule run was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Activity at position {position} has an empty id")]
    EmptyId { position: usize },
    #[error("Duplicate activity id: {0}")]
    DuplicateId(String),
    #[error("Activity {0} lists itself as a predecessor")]
    SelfReference(String),
    #[error("Activity {id} has negative duration {duration_days}")]
    NegativeDuration { id: String, duration_days: i64 },
    #[error(transparent)]
    Date(#[from] DateError),
}

/// Check every activity and collect all problems found.
pub fn validate_activities(activities: &[Activity], policy: DurationPolicy) -> Vec<ScheduleError> {
    let mut errors = Vec::new();
    let mut seen: FxHashSet<&str> =
        FxHashSet::with_capacity_and_hasher(activities.len(), Default::default());

    for (position, activity) in activities.iter().enumerate() {
        if activity.id.trim().is_empty() {
            errors.push(ScheduleError::EmptyId { position });
            continue;
        }

        if !seen.insert(activity.id.as_str()) {
            errors.push(ScheduleError::DuplicateId(activity.id.clone()));
        }

        if activity.predecessor_ids.iter().any(|p| *p == activity.id) {
            errors.push(ScheduleError::SelfReference(activity.id.clone()));
        }

        if activity.duration_days < 0 && policy == DurationPolicy::Reject {
            errors.push(ScheduleError::NegativeDuration {
                id: activity.id.clone(),
                duration_days: activity.duration_days,
            });
        }
    }

    errors
}
