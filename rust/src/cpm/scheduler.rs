//! Schedule run orchestration: validate, build the graph, run both passes,
//! then derive float and criticality.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::config::{ConfigError, DurationPolicy, PassStrategy, ResolvedConfig, ScheduleConfig};
use crate::graph::ActivityGraph;
use crate::models::{Activity, ScheduledActivity};
use crate::validation::{validate_activities, ScheduleError};
use crate::{log_pass, log_warn};

use super::calculation::{
    backward_fixed_point, backward_topological, compute_float, forward_fixed_point,
    forward_topological, iteration_cap, project_finish,
};
use super::snapshot::InputFingerprint;
use super::state::PassState;
use super::types::{Pass, PassOutcome, ScheduleResult, ScheduleStatus, ScheduleWarning};

/// Critical path scheduler. Immutable once built, so one instance can serve
/// any number of runs.
#[derive(Clone, Debug)]
pub struct CpmScheduler {
    config: ResolvedConfig,
}

impl CpmScheduler {
    /// Create a scheduler, rejecting unknown option names up front.
    pub fn new(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.resolve()?,
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Compute early/late dates, float and criticality for `activities`.
    ///
    /// The input is never modified. Without a data date or activities the
    /// result is `Skipped`; invalid input gives `Rejected`.
    pub fn schedule(&self, activities: &[Activity], data_date: Option<NaiveDate>) -> ScheduleResult {
        let verbosity = self.config.verbosity;

        let Some(data_date) = data_date.filter(|_| !activities.is_empty()) else {
            log_pass!(verbosity, "nothing to schedule");
            return ScheduleResult::unscheduled(ScheduleStatus::Skipped, activities, data_date, Vec::new());
        };

        let errors = validate_activities(activities, self.config.duration_policy);
        if !errors.is_empty() {
            for error in &errors {
                log_warn!(verbosity, "{}", error);
            }
            return ScheduleResult::unscheduled(
                ScheduleStatus::Rejected,
                activities,
                Some(data_date),
                errors,
            );
        }

        match self.run(activities, data_date) {
            Ok(result) => result,
            Err(error) => {
                log_warn!(verbosity, "{}", error);
                ScheduleResult::unscheduled(
                    ScheduleStatus::Rejected,
                    activities,
                    Some(data_date),
                    vec![error],
                )
            }
        }
    }

    fn run(&self, activities: &[Activity], data_date: NaiveDate) -> Result<ScheduleResult, ScheduleError> {
        let verbosity = self.config.verbosity;
        let mut warnings: Vec<ScheduleWarning> = Vec::new();

        // Working copy; clamped durations are what gets returned.
        let mut working: Vec<Activity> = activities.to_vec();
        if self.config.duration_policy == DurationPolicy::Clamp {
            for activity in working.iter_mut().filter(|a| a.duration_days < 0) {
                warnings.push(ScheduleWarning::DurationClamped {
                    activity_id: activity.id.clone(),
                    duration_days: activity.duration_days,
                });
                activity.duration_days = 0;
            }
        }

        let graph = ActivityGraph::build(&working);
        for (idx, missing_ids) in &graph.dangling {
            warnings.push(ScheduleWarning::DanglingPredecessors {
                activity_id: graph.index.resolve(*idx).unwrap_or_default().to_string(),
                missing_ids: missing_ids.clone(),
            });
        }

        let topo = graph.topological_order();
        if topo.has_cycle() {
            warnings.push(ScheduleWarning::CycleDetected {
                activity_ids: graph.ids(&topo.blocked),
            });
        }

        let durations = working.iter().map(|a| a.duration_days).collect();
        let mut state = PassState::new(data_date, durations);
        let rule = self.config.terminal_rule;

        let (forward, finish, backward) = match self.config.strategy {
            PassStrategy::Topological => {
                let forward = forward_topological(&graph, &mut state, &topo.order, verbosity)?;
                let finish = project_finish(&state);
                let backward =
                    backward_topological(&graph, &mut state, &topo.order, finish, rule, verbosity)?;
                (forward, finish, backward)
            }
            PassStrategy::FixedPoint => {
                let cap = iteration_cap(graph.len());
                let forward = forward_fixed_point(&graph, &mut state, cap)?;
                let finish = project_finish(&state);
                let backward = backward_fixed_point(&graph, &mut state, finish, rule, cap)?;
                (forward, finish, backward)
            }
        };

        log_pass!(
            verbosity,
            "forward pass: {} iteration(s), project finish {}",
            forward.iterations,
            finish
        );
        log_pass!(verbosity, "backward pass: {} iteration(s)", backward.iterations);

        for (pass, outcome) in [(Pass::Forward, forward), (Pass::Backward, backward)] {
            if !outcome.converged {
                warnings.push(ScheduleWarning::NonConvergence {
                    pass,
                    iterations: outcome.iterations,
                });
            }
        }

        for warning in &warnings {
            log_warn!(verbosity, "{}", warning);
        }

        let timings = compute_float(&state, self.config.critical_float_tolerance);
        let all_timed = timings.iter().all(|t| t.is_complete());
        let status = if all_timed && forward.converged && backward.converged {
            ScheduleStatus::Converged
        } else {
            ScheduleStatus::Provisional
        };

        let scheduled: Vec<ScheduledActivity> = working
            .into_iter()
            .zip(timings)
            .map(|(activity, timing)| ScheduledActivity { activity, timing })
            .collect();

        Ok(ScheduleResult {
            status,
            activities: scheduled,
            warnings,
            errors: Vec::new(),
            data_date: Some(data_date),
            algorithm_metadata: self.metadata(forward, backward),
            fingerprint: InputFingerprint::of(activities, Some(data_date)),
        })
    }

    fn metadata(&self, forward: PassOutcome, backward: PassOutcome) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert("algorithm".to_string(), "cpm".to_string());
        metadata.insert("strategy".to_string(), self.config.strategy.name().to_string());
        metadata.insert(
            "terminal_rule".to_string(),
            self.config.terminal_rule.name().to_string(),
        );
        metadata.insert("forward_iterations".to_string(), forward.iterations.to_string());
        metadata.insert("backward_iterations".to_string(), backward.iterations.to_string());
        metadata
    }
}

/// Run a schedule with the given configuration.
pub fn compute_schedule(
    activities: &[Activity],
    data_date: Option<NaiveDate>,
    config: &ScheduleConfig,
) -> Result<ScheduleResult, ConfigError> {
    Ok(CpmScheduler::new(config)?.schedule(activities, data_date))
}
