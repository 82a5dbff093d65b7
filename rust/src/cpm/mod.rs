//! Critical path method: forward and backward passes over finish-to-start
//! links, total float, and the minimum-float critical path.

mod calculation;
mod scheduler;
mod snapshot;
mod state;
mod types;

pub use calculation::iteration_cap;
pub use scheduler::{compute_schedule, CpmScheduler};
pub use snapshot::InputFingerprint;
pub use types::{Pass, PassOutcome, ScheduleResult, ScheduleStatus, ScheduleWarning};
