//! Dependency graph over activity indices.
//!
//! Activity ids are mapped to dense `u32` indices in input order so the passes
//! can work on plain vectors. Predecessor ids are resolved once, at build time,
//! into either an index or an unresolved (dangling) id.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::models::Activity;

/// Dense activity index (position in the input slice).
pub type ActivityIdx = u32;

/// Maps activity id strings to their index and back.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    to_idx: FxHashMap<String, ActivityIdx>,
    ids: Vec<String>,
}

impl ActivityIndex {
    /// Index activities in input order. Ids must already be unique.
    pub fn new(activities: &[Activity]) -> Self {
        let mut index = Self {
            to_idx: FxHashMap::with_capacity_and_hasher(activities.len(), Default::default()),
            ids: Vec::with_capacity(activities.len()),
        };
        for activity in activities {
            let idx = index.ids.len() as ActivityIdx;
            index.ids.push(activity.id.clone());
            index.to_idx.insert(activity.id.clone(), idx);
        }
        index
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<ActivityIdx> {
        self.to_idx.get(id).copied()
    }

    #[inline]
    pub fn resolve(&self, idx: ActivityIdx) -> Option<&str> {
        self.ids.get(idx as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A predecessor reference after lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredecessorLink<'a> {
    Resolved(ActivityIdx),
    Unresolved(&'a str),
}

/// Look up a predecessor id.
pub fn resolve_link<'a>(index: &ActivityIndex, id: &'a str) -> PredecessorLink<'a> {
    match index.get(id) {
        Some(idx) => PredecessorLink::Resolved(idx),
        None => PredecessorLink::Unresolved(id),
    }
}

/// Resolved finish-to-start graph.
#[derive(Debug, Clone)]
pub struct ActivityGraph {
    pub index: ActivityIndex,
    /// Resolved predecessors per activity, duplicates removed, in listed order.
    pub predecessors: Vec<Vec<ActivityIdx>>,
    /// Successors per activity, in input order of the successor.
    pub successors: Vec<Vec<ActivityIdx>>,
    /// Activities with predecessor ids that matched nothing: (activity, missing ids).
    pub dangling: Vec<(ActivityIdx, Vec<String>)>,
}

/// Result of Kahn's algorithm over the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Activities with every predecessor before them.
    pub order: Vec<ActivityIdx>,
    /// Activities that could not be ordered: cycle members and everything downstream.
    /// Sorted by index.
    pub blocked: Vec<ActivityIdx>,
}

impl TopologicalOrder {
    pub fn has_cycle(&self) -> bool {
        !self.blocked.is_empty()
    }
}

impl ActivityGraph {
    pub fn build(activities: &[Activity]) -> Self {
        let index = ActivityIndex::new(activities);
        let n = index.len();
        let mut predecessors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];
        let mut dangling = Vec::new();

        for (idx, activity) in activities.iter().enumerate() {
            let mut seen: FxHashSet<ActivityIdx> = FxHashSet::default();
            let mut missing: Vec<String> = Vec::new();

            for pred_id in &activity.predecessor_ids {
                match resolve_link(&index, pred_id) {
                    PredecessorLink::Resolved(pred) => {
                        if seen.insert(pred) {
                            predecessors[idx].push(pred);
                            successors[pred as usize].push(idx as ActivityIdx);
                        }
                    }
                    PredecessorLink::Unresolved(id) => {
                        if !missing.iter().any(|m| m == id) {
                            missing.push(id.to_string());
                        }
                    }
                }
            }

            if !missing.is_empty() {
                dangling.push((idx as ActivityIdx, missing));
            }
        }

        Self {
            index,
            predecessors,
            successors,
            dangling,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Order activities with Kahn's algorithm.
    ///
    /// Ties are broken by input order, so the result is deterministic.
    pub fn topological_order(&self) -> TopologicalOrder {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();

        let mut queue: VecDeque<ActivityIdx> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .map(|i| i as ActivityIdx)
            .collect();

        let mut order: Vec<ActivityIdx> = Vec::with_capacity(n);

        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            for &succ in &self.successors[idx as usize] {
                let degree = &mut in_degree[succ as usize];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ);
                }
            }
        }

        let blocked = if order.len() == n {
            Vec::new()
        } else {
            (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| i as ActivityIdx)
                .collect()
        };

        TopologicalOrder { order, blocked }
    }

    /// Ids for a list of indices.
    pub fn ids(&self, indices: &[ActivityIdx]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.index.resolve(i))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_activity(id: &str, duration: i64, preds: &[&str]) -> Activity {
        Activity::with_predecessors(id, duration, preds.iter().copied())
    }

    #[test]
    fn test_index_and_resolve() {
        let activities = vec![make_activity("a", 1, &[]), make_activity("b", 1, &[])];
        let index = ActivityIndex::new(&activities);

        assert_eq!(index.get("a"), Some(0));
        assert_eq!(index.get("b"), Some(1));
        assert_eq!(index.get("c"), None);
        assert_eq!(index.resolve(1), Some("b"));
        assert_eq!(index.resolve(7), None);
        assert_eq!(resolve_link(&index, "a"), PredecessorLink::Resolved(0));
        assert_eq!(resolve_link(&index, "zz"), PredecessorLink::Unresolved("zz"));
    }

    #[test]
    fn test_build_dedupes_and_records_dangling() {
        let activities = vec![
            make_activity("a", 1, &[]),
            make_activity("b", 1, &["a", "a", "gone", "gone", "also_gone"]),
        ];
        let graph = ActivityGraph::build(&activities);

        assert_eq!(graph.predecessors[1], vec![0]);
        assert_eq!(graph.successors[0], vec![1]);
        assert_eq!(
            graph.dangling,
            vec![(1, vec!["gone".to_string(), "also_gone".to_string()])]
        );
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        // listed in reverse of dependency order
        let activities = vec![
            make_activity("c", 1, &["b"]),
            make_activity("b", 1, &["a"]),
            make_activity("a", 1, &[]),
            make_activity("d", 1, &[]),
        ];
        let graph = ActivityGraph::build(&activities);
        let topo = graph.topological_order();

        assert!(!topo.has_cycle());
        assert_eq!(graph.ids(&topo.order), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_cycle_blocks_members_and_downstream() {
        let activities = vec![
            make_activity("start", 1, &[]),
            make_activity("x", 1, &["start", "y"]),
            make_activity("y", 1, &["x"]),
            make_activity("after", 1, &["y"]),
        ];
        let graph = ActivityGraph::build(&activities);
        let topo = graph.topological_order();

        assert!(topo.has_cycle());
        assert_eq!(graph.ids(&topo.order), vec!["start"]);
        assert_eq!(graph.ids(&topo.blocked), vec!["x", "y", "after"]);
    }
}
