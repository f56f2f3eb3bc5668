//! Resumable batch search: repeatedly widen the search buffer per a
//! [`IteratorSchedule`] and yield the newly-valid prefix of results each
//! call, without re-searching from scratch.

use crate::error::GraphError;
use crate::graph::Graph;
use crate::neighbor::Neighbor;
use crate::schedule::IteratorSchedule;
use crate::search::greedy_search;

/// Drives repeated, growing greedy searches from a fixed entry point and
/// query, yielding successive batches of previously-unyielded results.
///
/// Each call to [`next`](Self::next) re-runs `greedy_search` with the
/// current iteration's (wider) parameters, then returns whatever prefix of
/// the result set has not already been handed out. Because
/// `next_unvisited`/`is_done` state isn't carried between calls, widening
/// the buffer and re-searching is the mechanism for "resuming" — this
/// matches a schedule's contract that the buffer only grows.
pub struct BatchIterator<'g> {
    graph: &'g Graph,
    entry_point: u32,
    schedule: Box<dyn IteratorSchedule>,
    iteration: usize,
    yielded: usize,
    last_results: Vec<Neighbor>,
    done: bool,
}

impl<'g> BatchIterator<'g> {
    pub fn new(graph: &'g Graph, entry_point: u32, schedule: Box<dyn IteratorSchedule>) -> Self {
        BatchIterator {
            graph,
            entry_point,
            schedule,
            iteration: 0,
            yielded: 0,
            last_results: Vec::new(),
            done: false,
        }
    }

    pub fn results(&self) -> &[Neighbor] {
        &self.last_results
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// Runs the next iteration's search and returns the newly-surfaced
    /// results. `distance_to` is re-invoked for every candidate touched by
    /// this iteration's (wider) search, same as a fresh `greedy_search`
    /// call — there is no incremental reuse of prior distance
    /// computations, matching the decoupled, closure-based search API.
    pub fn next(&mut self, distance_to: impl FnMut(u32) -> f32) -> Result<Vec<Neighbor>, GraphError> {
        if self.done {
            return Ok(Vec::new());
        }
        let params = self.schedule.for_iteration(self.iteration);
        let max_candidates = self.schedule.max_candidates(self.iteration);
        let results = greedy_search(self.graph, self.entry_point, &params, distance_to)?;

        let total_valid = results.len().min(self.yielded + max_candidates);
        let fresh = if total_valid > self.yielded {
            results[self.yielded..total_valid].to_vec()
        } else {
            Vec::new()
        };

        if total_valid >= results.len() && results.len() < params.buffer_config.window_size {
            self.done = true;
        }
        self.yielded = total_valid;
        self.last_results = results;
        self.iteration += 1;
        Ok(fresh)
    }

    /// Resets iteration state so the next `next()` call restarts the
    /// schedule from iteration 0, reusing the same entry point. Used when
    /// the underlying graph changed enough that prior results should be
    /// discarded.
    pub fn restart_next_search(&mut self) {
        self.iteration = 0;
        self.yielded = 0;
        self.last_results.clear();
        self.done = false;
    }

    /// Switches to a new query, optionally swapping the growth schedule,
    /// and restarts iteration. The distance target itself is supplied
    /// fresh to every `next()` call rather than stored here (see the
    /// module doc comment), so "new query" at this layer means: discard
    /// whatever progress was made against the old target. A schedule
    /// swap can't itself fail — `IteratorSchedule` constructors already
    /// validate their invariants — so this never leaves the iterator
    /// half-updated.
    pub fn update(&mut self, new_schedule: Option<Box<dyn IteratorSchedule>>) {
        if let Some(schedule) = new_schedule {
            self.schedule = schedule;
        }
        self.restart_next_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SearchBufferConfig;
    use crate::params::VamanaSearchParameters;
    use crate::schedule::DefaultSchedule;

    fn line_graph(n: usize) -> Graph {
        let mut g = Graph::new(n, 2);
        for i in 0..n {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push((i - 1) as u32);
            }
            if i + 1 < n {
                neighbors.push((i + 1) as u32);
            }
            g.set_neighbors(i as u32, neighbors).unwrap();
        }
        g
    }

    #[test]
    fn batches_cover_the_same_ground_as_one_big_search() {
        let g = line_graph(50);
        let target = 30.0f32;
        let base = VamanaSearchParameters::new(SearchBufferConfig::exact(5), false, 4, 1);
        let schedule = Box::new(DefaultSchedule::new(base, 5));
        let mut iter = BatchIterator::new(&g, 0, schedule);

        let mut all_ids = Vec::new();
        for _ in 0..3 {
            let batch = iter.next(|id| (id as f32 - target).abs()).unwrap();
            all_ids.extend(batch.into_iter().map(|n| n.id));
        }

        let full_params = VamanaSearchParameters::new(SearchBufferConfig::exact(15), false, 4, 1);
        let full = greedy_search(&g, 0, &full_params, |id| (id as f32 - target).abs()).unwrap();
        let full_ids: Vec<u32> = full.into_iter().map(|n| n.id).collect();

        assert_eq!(all_ids, full_ids);
    }

    #[test]
    fn update_swaps_schedule_and_resets_progress() {
        let g = line_graph(20);
        let base = VamanaSearchParameters::new(SearchBufferConfig::exact(3), false, 4, 1);
        let schedule = Box::new(DefaultSchedule::new(base, 3));
        let mut iter = BatchIterator::new(&g, 0, schedule);
        iter.next(|id| id as f32).unwrap();
        assert!(!iter.last_results.is_empty());

        let new_schedule = Box::new(DefaultSchedule::new(base, 7));
        iter.update(Some(new_schedule));
        assert_eq!(iter.yielded, 0);
        assert!(iter.last_results.is_empty());
        assert_eq!(iter.schedule.max_candidates(0), 7);
    }

    #[test]
    fn restart_resets_progress() {
        let g = line_graph(20);
        let base = VamanaSearchParameters::new(SearchBufferConfig::exact(3), false, 4, 1);
        let schedule = Box::new(DefaultSchedule::new(base, 3));
        let mut iter = BatchIterator::new(&g, 0, schedule);
        iter.next(|id| id as f32).unwrap();
        assert!(iter.yielded > 0 || !iter.last_results.is_empty());
        iter.restart_next_search();
        assert_eq!(iter.yielded, 0);
        assert!(iter.last_results.is_empty());
    }
}
