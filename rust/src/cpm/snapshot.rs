//! Fingerprint of the inputs a schedule was computed from.
//!
//! Only scheduling-relevant data feeds the hash: ids, durations, the set of
//! predecessor ids and the data date. Activity order and duplicate
//! predecessor entries do not change the fingerprint.

use chrono::NaiveDate;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::models::Activity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputFingerprint(u64);

impl InputFingerprint {
    pub fn of(activities: &[Activity], data_date: Option<NaiveDate>) -> Self {
        let mut entries: Vec<(&str, i64, Vec<&str>)> = activities
            .iter()
            .map(|a| {
                let mut preds: Vec<&str> = a.predecessor_ids.iter().map(String::as_str).collect();
                preds.sort_unstable();
                preds.dedup();
                (a.id.as_str(), a.duration_days, preds)
            })
            .collect();
        entries.sort_unstable();

        let mut hasher = FxHasher::default();
        data_date.hash(&mut hasher);
        entries.hash(&mut hasher);
        Self(hasher.finish())
    }
}
