//! Stack relations between series as an arena graph keyed by series id.
//!
//! Each stacked item points at the item with the same index in an earlier
//! series; targets keep back-references so invalidation can walk forward.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::series::{SeriesMap, ValueField};
use crate::core::types::SeriesId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StackNode {
    /// Stack target per item index.
    targets: Vec<Option<SeriesId>>,
    /// Series with at least one item stacked onto this one.
    dependents: IndexSet<SeriesId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackGraph {
    nodes: IndexMap<SeriesId, StackNode>,
}

impl StackGraph {
    pub fn insert(&mut self, id: SeriesId) {
        self.nodes.entry(id).or_default();
    }

    /// Drops `id` from the graph and returns the series that were stacked on it.
    pub fn remove(&mut self, id: SeriesId) -> SmallVec<[SeriesId; 4]> {
        self.unstack(id);
        let dependents: SmallVec<[SeriesId; 4]> = self
            .nodes
            .shift_remove(&id)
            .map(|node| node.dependents.into_iter().collect())
            .unwrap_or_default();
        for dependent in &dependents {
            self.unstack(*dependent);
        }
        dependents
    }

    /// Earlier series eligible as stack targets for `id`, most recent first.
    ///
    /// Candidates share both axes and the series kind; the walk stops after
    /// the first candidate that is not itself stacked.
    #[must_use]
    pub fn candidates(series_map: &SeriesMap, id: SeriesId) -> SmallVec<[SeriesId; 4]> {
        let mut out = SmallVec::new();
        let Some((position, _, series)) = series_map.get_full(&id) else {
            return out;
        };
        let config = series.config();
        for (candidate_id, candidate) in series_map.iter().take(position).rev() {
            if !candidate.config().shares_axes_with(config) {
                continue;
            }
            out.push(*candidate_id);
            if !candidate.config().stacked {
                break;
            }
        }
        out
    }

    /// Recomputes the stack targets of `id`. Returns the number of stacked items.
    pub fn resolve(&mut self, series_map: &SeriesMap, id: SeriesId) -> usize {
        self.unstack(id);
        let Some(series) = series_map.get(&id) else {
            return 0;
        };
        if !series.config().stacked {
            return 0;
        }

        let candidates = Self::candidates(series_map, id);
        let sign_aware = series.config().stack_to_negative;
        let mut targets = vec![None; series.items().len()];
        for (index, slot) in targets.iter_mut().enumerate() {
            let Some(value) = series.real_value(index, ValueField::Value) else {
                continue;
            };
            for candidate_id in &candidates {
                let Some(candidate_value) = series_map
                    .get(candidate_id)
                    .and_then(|candidate| candidate.real_value(index, ValueField::Value))
                else {
                    continue;
                };
                let accept = if sign_aware {
                    (value >= 0.0) == (candidate_value >= 0.0)
                } else {
                    true
                };
                if accept {
                    *slot = Some(*candidate_id);
                    break;
                }
            }
        }

        let stacked = targets.iter().flatten().count();
        let distinct: IndexSet<SeriesId> = targets.iter().flatten().copied().collect();
        for target in &distinct {
            self.nodes.entry(*target).or_default().dependents.insert(id);
        }
        self.nodes.entry(id).or_default().targets = targets;
        debug!(series = %id, stacked, targets = distinct.len(), "stack resolved");
        stacked
    }

    /// Clears every relation of `id` and its back-references on targets.
    pub fn unstack(&mut self, id: SeriesId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let previous: IndexSet<SeriesId> =
            std::mem::take(&mut node.targets).into_iter().flatten().collect();
        for target in previous {
            if let Some(target_node) = self.nodes.get_mut(&target) {
                target_node.dependents.shift_remove(&id);
            }
        }
    }

    #[must_use]
    pub fn target(&self, id: SeriesId, index: usize) -> Option<SeriesId> {
        self.nodes
            .get(&id)
            .and_then(|node| node.targets.get(index).copied().flatten())
    }

    #[must_use]
    pub fn targets(&self, id: SeriesId) -> &[Option<SeriesId>] {
        self.nodes
            .get(&id)
            .map(|node| node.targets.as_slice())
            .unwrap_or_default()
    }

    pub fn dependents(&self, id: SeriesId) -> impl Iterator<Item = SeriesId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node| node.dependents.iter().copied())
    }

    /// `roots` plus every series transitively stacked onto them.
    #[must_use]
    pub fn dependents_closure<I>(&self, roots: I) -> IndexSet<SeriesId>
    where
        I: IntoIterator<Item = SeriesId>,
    {
        let mut seen = IndexSet::new();
        let mut queue: VecDeque<SeriesId> = roots.into_iter().collect();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            queue.extend(self.dependents(id));
        }
        trace!(count = seen.len(), "stack dependents collected");
        seen
    }

    /// Own working value of `field` plus the totals of the tower below it.
    ///
    /// Targets missing `field` contribute their primary value. The walk is
    /// bounded by the series count since targets always precede their
    /// dependents in registration order.
    #[must_use]
    pub fn stacked_value(
        &self,
        series_map: &SeriesMap,
        id: SeriesId,
        index: usize,
        field: ValueField,
        base: f64,
    ) -> Option<f64> {
        let mut total = series_map.get(&id)?.working_value(index, field, base)?;
        let mut cursor = self.target(id, index);
        let mut hops = 0;
        while let Some(target) = cursor {
            if hops >= series_map.len() {
                break;
            }
            hops += 1;
            let Some(series) = series_map.get(&target) else {
                break;
            };
            total += series
                .working_value(index, field, base)
                .or_else(|| series.working_value(index, ValueField::Value, base))
                .unwrap_or(0.0);
            cursor = self.target(target, index);
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::StackGraph;
    use crate::core::series::{DataItem, Series, SeriesConfig, SeriesKind, SeriesMap};
    use crate::core::types::{AxisId, SeriesId};

    fn column(raw: u32, stacked: bool, values: &[f64]) -> Series {
        let config = SeriesConfig::new(SeriesKind::Column, AxisId::new(0), AxisId::new(1))
            .with_stacked(stacked);
        let mut series = Series::new(SeriesId::new(raw), config).expect("series");
        series.set_data(values.iter().copied().map(DataItem::value).collect());
        series
    }

    #[test]
    fn candidate_walk_stops_after_first_unstacked_series() {
        let mut map = SeriesMap::new();
        for series in [
            column(0, false, &[1.0]),
            column(1, false, &[1.0]),
            column(2, true, &[1.0]),
            column(3, true, &[1.0]),
        ] {
            map.insert(series.id(), series);
        }
        let candidates = StackGraph::candidates(&map, SeriesId::new(3));
        assert_eq!(candidates.as_slice(), &[SeriesId::new(2), SeriesId::new(1)]);
    }

    #[test]
    fn unstack_clears_back_references() {
        let mut map = SeriesMap::new();
        for series in [column(0, false, &[2.0]), column(1, true, &[3.0])] {
            map.insert(series.id(), series);
        }
        let mut graph = StackGraph::default();
        assert_eq!(graph.resolve(&map, SeriesId::new(1)), 1);
        assert_eq!(
            graph.dependents(SeriesId::new(0)).collect::<Vec<_>>(),
            vec![SeriesId::new(1)]
        );
        graph.unstack(SeriesId::new(1));
        assert_eq!(graph.dependents(SeriesId::new(0)).count(), 0);
        assert_eq!(graph.target(SeriesId::new(1), 0), None);
    }
}
