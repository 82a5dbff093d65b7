//! Forward and backward passes, float and criticality.
//!
//! Two pass variants share the same per-activity rules:
//! - topological: one sweep in Kahn order (reverse order for the backward pass)
//! - fixed point: repeated full scans in input order (reverse input order for
//!   the backward pass) until nothing changes, capped at `2 * n` iterations

use chrono::NaiveDate;

use crate::config::TerminalRule;
use crate::dates::{add_days, days_between, max_date, min_date, DateError};
use crate::graph::{ActivityGraph, ActivityIdx};
use crate::log_debug;
use crate::models::ActivityTiming;

use super::state::PassState;
use super::types::PassOutcome;

/// Iteration cap for the fixed-point passes.
pub fn iteration_cap(activity_count: usize) -> usize {
    2 * activity_count
}

/// Successors without a late start yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UntimedSuccessors {
    /// Wait for them (fixed point).
    Defer,
    /// Leave them out (topological; they are blocked by a cycle).
    Ignore,
}

/// Early start implied by the predecessors, or `None` while any of them lacks
/// an early finish.
fn early_start_from_predecessors(
    graph: &ActivityGraph,
    state: &PassState,
    idx: ActivityIdx,
) -> Result<Option<NaiveDate>, DateError> {
    let preds = &graph.predecessors[idx as usize];
    if preds.is_empty() {
        return Ok(Some(state.data_date));
    }

    let mut latest: Option<NaiveDate> = None;
    for &pred in preds {
        let Some(finish) = state.early_finish[pred as usize] else {
            return Ok(None);
        };
        latest = max_date([latest, Some(add_days(finish, 1)?)]);
    }
    Ok(latest)
}

fn terminal_late_finish(
    state: &PassState,
    idx: ActivityIdx,
    project_finish: NaiveDate,
    rule: TerminalRule,
) -> NaiveDate {
    match rule {
        TerminalRule::ProjectFinish => project_finish,
        TerminalRule::EarlyFinish => state.early_finish[idx as usize].unwrap_or(project_finish),
    }
}

/// Late finish implied by the successors, or `None` when deferring.
fn late_finish_from_successors(
    graph: &ActivityGraph,
    state: &PassState,
    idx: ActivityIdx,
    project_finish: NaiveDate,
    rule: TerminalRule,
    untimed: UntimedSuccessors,
) -> Result<Option<NaiveDate>, DateError> {
    let succs = &graph.successors[idx as usize];

    let mut earliest: Option<NaiveDate> = None;
    for &succ in succs {
        match state.late_start[succ as usize] {
            Some(start) => earliest = min_date([earliest, Some(add_days(start, -1)?)]),
            None if untimed == UntimedSuccessors::Defer => return Ok(None),
            None => {}
        }
    }

    Ok(Some(earliest.unwrap_or_else(|| {
        terminal_late_finish(state, idx, project_finish, rule)
    })))
}

/// Set early dates for one activity. Returns whether anything changed.
fn apply_early_dates(
    state: &mut PassState,
    idx: ActivityIdx,
    early_start: NaiveDate,
) -> Result<bool, DateError> {
    let i = idx as usize;
    let early_finish = add_days(early_start, state.span(idx))?;
    let changed =
        state.early_start[i] != Some(early_start) || state.early_finish[i] != Some(early_finish);
    state.early_start[i] = Some(early_start);
    state.early_finish[i] = Some(early_finish);
    Ok(changed)
}

/// Set late dates for one activity. Returns whether anything changed.
fn apply_late_dates(
    state: &mut PassState,
    idx: ActivityIdx,
    late_finish: NaiveDate,
) -> Result<bool, DateError> {
    let i = idx as usize;
    let late_start = add_days(late_finish, -state.span(idx))?;
    let changed =
        state.late_finish[i] != Some(late_finish) || state.late_start[i] != Some(late_start);
    state.late_finish[i] = Some(late_finish);
    state.late_start[i] = Some(late_start);
    Ok(changed)
}

/// Forward pass in topological order. Activities absent from `order` keep no dates.
pub fn forward_topological(
    graph: &ActivityGraph,
    state: &mut PassState,
    order: &[ActivityIdx],
    verbosity: u8,
) -> Result<PassOutcome, DateError> {
    for &idx in order {
        if let Some(early_start) = early_start_from_predecessors(graph, state, idx)? {
            apply_early_dates(state, idx, early_start)?;
            log_debug!(
                verbosity,
                "{}: es={} ef={:?}",
                graph.index.resolve(idx).unwrap_or("?"),
                early_start,
                state.early_finish[idx as usize]
            );
        }
    }
    Ok(PassOutcome {
        iterations: 1,
        converged: true,
    })
}

/// Backward pass in reverse topological order.
pub fn backward_topological(
    graph: &ActivityGraph,
    state: &mut PassState,
    order: &[ActivityIdx],
    project_finish: NaiveDate,
    rule: TerminalRule,
    verbosity: u8,
) -> Result<PassOutcome, DateError> {
    for &idx in order.iter().rev() {
        if let Some(late_finish) = late_finish_from_successors(
            graph,
            state,
            idx,
            project_finish,
            rule,
            UntimedSuccessors::Ignore,
        )? {
            apply_late_dates(state, idx, late_finish)?;
            log_debug!(
                verbosity,
                "{}: ls={:?} lf={}",
                graph.index.resolve(idx).unwrap_or("?"),
                state.late_start[idx as usize],
                late_finish
            );
        }
    }
    Ok(PassOutcome {
        iterations: 1,
        converged: true,
    })
}

/// Forward pass by repeated scans in input order.
pub fn forward_fixed_point(
    graph: &ActivityGraph,
    state: &mut PassState,
    cap: usize,
) -> Result<PassOutcome, DateError> {
    let n = state.len() as ActivityIdx;
    let mut iterations = 0;
    loop {
        iterations += 1;
        let mut changed = false;
        for idx in 0..n {
            if let Some(early_start) = early_start_from_predecessors(graph, state, idx)? {
                changed |= apply_early_dates(state, idx, early_start)?;
            }
        }
        if !changed {
            return Ok(PassOutcome {
                iterations,
                converged: true,
            });
        }
        if iterations >= cap {
            return Ok(PassOutcome {
                iterations,
                converged: false,
            });
        }
    }
}

/// Backward pass by repeated scans in reverse input order.
pub fn backward_fixed_point(
    graph: &ActivityGraph,
    state: &mut PassState,
    project_finish: NaiveDate,
    rule: TerminalRule,
    cap: usize,
) -> Result<PassOutcome, DateError> {
    let n = state.len() as ActivityIdx;
    let mut iterations = 0;
    loop {
        iterations += 1;
        let mut changed = false;
        for idx in (0..n).rev() {
            if let Some(late_finish) = late_finish_from_successors(
                graph,
                state,
                idx,
                project_finish,
                rule,
                UntimedSuccessors::Defer,
            )? {
                changed |= apply_late_dates(state, idx, late_finish)?;
            }
        }
        if !changed {
            return Ok(PassOutcome {
                iterations,
                converged: true,
            });
        }
        if iterations >= cap {
            return Ok(PassOutcome {
                iterations,
                converged: false,
            });
        }
    }
}

/// Latest early finish, or the data date if nothing has one.
pub fn project_finish(state: &PassState) -> NaiveDate {
    max_date(state.early_finish.iter().copied()).unwrap_or(state.data_date)
}

/// Build final timings with total float and criticality.
///
/// Critical means float within `tolerance` days of the smallest float in the
/// schedule, so a project with imposed slack still has a critical path.
pub fn compute_float(state: &PassState, tolerance: i64) -> Vec<ActivityTiming> {
    let floats: Vec<Option<i64>> = (0..state.len())
        .map(|i| match (state.early_start[i], state.late_start[i]) {
            (Some(es), Some(ls)) => Some(days_between(es, ls)),
            _ => None,
        })
        .collect();

    let min_float = floats.iter().flatten().min().copied();

    floats
        .iter()
        .enumerate()
        .map(|(i, &total_float)| {
            let mut timing = state.timing(i as ActivityIdx);
            timing.total_float = total_float;
            timing.is_critical = match (total_float, min_float) {
                (Some(f), Some(min)) => f <= min.saturating_add(tolerance),
                _ => false,
            };
            timing
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn make_activity(id: &str, duration: i64, preds: &[&str]) -> Activity {
        Activity::with_predecessors(id, duration, preds.iter().copied())
    }

    fn setup(activities: &[Activity], data_date: NaiveDate) -> (ActivityGraph, PassState) {
        let graph = ActivityGraph::build(activities);
        let durations = activities.iter().map(|a| a.duration_days.max(0)).collect();
        (graph, PassState::new(data_date, durations))
    }

    #[test]
    fn test_forward_topological_chain() {
        // b depends on a: a runs day 0..4, b starts day 5
        let activities = vec![make_activity("a", 5, &[]), make_activity("b", 2, &["a"])];
        let (graph, mut state) = setup(&activities, d(2024, 1, 1));
        let topo = graph.topological_order();

        let outcome = forward_topological(&graph, &mut state, &topo.order, 0).unwrap();
        assert!(outcome.converged);
        assert_eq!(state.early_finish[0], Some(d(2024, 1, 5)));
        assert_eq!(state.early_start[1], Some(d(2024, 1, 6)));
        assert_eq!(state.early_finish[1], Some(d(2024, 1, 7)));
    }

    #[test]
    fn test_forward_takes_latest_predecessor() {
        let activities = vec![
            make_activity("short", 1, &[]),
            make_activity("long", 4, &[]),
            make_activity("join", 1, &["short", "long"]),
        ];
        let (graph, mut state) = setup(&activities, d(2024, 1, 1));
        let topo = graph.topological_order();
        forward_topological(&graph, &mut state, &topo.order, 0).unwrap();

        assert_eq!(state.early_start[2], Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_milestone_has_same_start_and_finish() {
        let activities = vec![make_activity("a", 2, &[]), make_activity("m", 0, &["a"])];
        let (graph, mut state) = setup(&activities, d(2024, 1, 1));
        let topo = graph.topological_order();
        forward_topological(&graph, &mut state, &topo.order, 0).unwrap();

        assert_eq!(state.early_start[1], Some(d(2024, 1, 3)));
        assert_eq!(state.early_finish[1], Some(d(2024, 1, 3)));
    }

    #[test]
    fn test_fixed_point_reverse_listed_chain_converges() {
        let activities = vec![
            make_activity("d", 1, &["c"]),
            make_activity("c", 1, &["b"]),
            make_activity("b", 1, &["a"]),
            make_activity("a", 1, &[]),
        ];
        let (graph, mut state) = setup(&activities, d(2024, 1, 1));

        let forward = forward_fixed_point(&graph, &mut state, iteration_cap(4)).unwrap();
        assert!(forward.converged);
        // one level per scan, plus a final scan with no change
        assert_eq!(forward.iterations, 5);
        assert_eq!(state.early_start[0], Some(d(2024, 1, 4)));

        let finish = project_finish(&state);
        let backward = backward_fixed_point(
            &graph,
            &mut state,
            finish,
            TerminalRule::ProjectFinish,
            iteration_cap(4),
        )
        .unwrap();
        assert!(backward.converged);
        assert_eq!(state.late_start[3], Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_fixed_point_cap_reports_non_convergence() {
        let activities = vec![make_activity("b", 1, &["a"]), make_activity("a", 1, &[])];
        let (graph, mut state) = setup(&activities, d(2024, 1, 1));

        let outcome = forward_fixed_point(&graph, &mut state, 1).unwrap();
        assert_eq!(
            outcome,
            PassOutcome {
                iterations: 1,
                converged: false
            }
        );
        assert_eq!(state.early_start[0], None);
        assert_eq!(state.early_start[1], Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_terminal_rules() {
        let activities = vec![make_activity("long", 5, &[]), make_activity("short", 1, &[])];

        let (graph, mut state) = setup(&activities, d(2024, 1, 1));
        let topo = graph.topological_order();
        forward_topological(&graph, &mut state, &topo.order, 0).unwrap();
        let finish = project_finish(&state);
        assert_eq!(finish, d(2024, 1, 5));

        backward_topological(&graph, &mut state, &topo.order, finish, TerminalRule::ProjectFinish, 0)
            .unwrap();
        assert_eq!(state.late_finish[1], Some(d(2024, 1, 5)));

        backward_topological(&graph, &mut state, &topo.order, finish, TerminalRule::EarlyFinish, 0)
            .unwrap();
        assert_eq!(state.late_finish[1], Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_float_and_tolerance() {
        let mut state = PassState::new(d(2024, 1, 1), vec![1, 1, 1, 1]);
        state.early_start = vec![
            Some(d(2024, 1, 1)),
            Some(d(2024, 1, 1)),
            Some(d(2024, 1, 1)),
            None,
        ];
        state.late_start = vec![
            Some(d(2024, 1, 3)),
            Some(d(2024, 1, 4)),
            Some(d(2024, 1, 9)),
            Some(d(2024, 1, 9)),
        ];

        let strict = compute_float(&state, 0);
        let floats: Vec<Option<i64>> = strict.iter().map(|t| t.total_float).collect();
        assert_eq!(floats, vec![Some(2), Some(3), Some(8), None]);
        // minimum float is 2, not 0
        let critical: Vec<bool> = strict.iter().map(|t| t.is_critical).collect();
        assert_eq!(critical, vec![true, false, false, false]);

        let loose = compute_float(&state, 1);
        let critical: Vec<bool> = loose.iter().map(|t| t.is_critical).collect();
        assert_eq!(critical, vec![true, true, false, false]);
    }
}
