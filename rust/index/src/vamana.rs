//! Vamana graph index: incremental construction (greedy-search insertion
//! plus alpha-pruned robust-prune, with back-edge maintenance) and
//! approximate search via `vsearch_graph::greedy_search`.
//!
//! Construction isn't ported from a specific file in the retrieved
//! original source (none of the filtered pack covers the build routine);
//! it follows the standard Vamana algorithm the way `§4.5`'s glossary
//! entry describes it — greedy search from the current entry point to
//! gather candidates, robust-prune them down to `max_degree` neighbors,
//! then insert reciprocal back-edges (themselves pruned if they'd exceed
//! `max_degree`).

use std::collections::HashSet;

use vsearch_distance::distance_raw;
use vsearch_graph::{greedy_search, BatchIterator, Graph, IteratorSchedule, Neighbor, SearchBufferConfig, VamanaSearchParameters};
use vsearch_types::{DistanceFunction, PointId};

use crate::dynamic::{write_vector, DynamicIndex};
use crate::error::IndexError;
use crate::id_map::IdMap;
use crate::store::VectorStore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VamanaBuildParameters {
    pub alpha: f32,
    pub max_degree: usize,
    pub search_window_size: usize,
}

impl VamanaBuildParameters {
    pub fn new(alpha: f32, max_degree: usize, search_window_size: usize) -> Self {
        VamanaBuildParameters {
            alpha,
            max_degree,
            search_window_size,
        }
    }
}

pub struct VamanaIndex {
    pub(crate) id_map: IdMap,
    pub(crate) store: VectorStore,
    pub(crate) graph: Graph,
    pub(crate) metric: DistanceFunction,
    pub(crate) entry_point: Option<u32>,
    pub(crate) build_params: VamanaBuildParameters,
    pub(crate) search_params: VamanaSearchParameters,
}

impl VamanaIndex {
    pub fn new(dim: usize, metric: DistanceFunction, build_params: VamanaBuildParameters) -> Self {
        VamanaIndex {
            id_map: IdMap::new(),
            store: VectorStore::new(dim),
            graph: Graph::new(0, build_params.max_degree),
            metric,
            entry_point: None,
            build_params,
            search_params: VamanaSearchParameters::new(
                SearchBufferConfig::exact(build_params.search_window_size),
                false,
                4,
                1,
            ),
        }
    }

    pub fn with_search_params(mut self, params: VamanaSearchParameters) -> Self {
        self.search_params = params;
        self
    }

    pub fn set_search_params(&mut self, params: VamanaSearchParameters) {
        self.search_params = params;
    }

    pub fn dimensions(&self) -> usize {
        self.store.dimensions()
    }

    fn check_dim(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.store.dimensions() {
            return Err(IndexError::DimensionMismatch {
                expected: self.store.dimensions(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Opens a resumable, growing search against `query`, yielding batches
    /// of neighbors via `VamanaBatchSearch::next` per `schedule`. Fails
    /// with `EmptyIndex` if no point has been added yet (there is no entry
    /// point to start from).
    pub fn batch_search(&self, query: Vec<f32>, schedule: Box<dyn IteratorSchedule>) -> Result<VamanaBatchSearch<'_>, IndexError> {
        self.check_dim(&query)?;
        let entry = self.entry_point.ok_or(IndexError::EmptyIndex)?;
        Ok(VamanaBatchSearch {
            query,
            store: &self.store,
            id_map: &self.id_map,
            metric: self.metric,
            inner: BatchIterator::new(&self.graph, entry, schedule),
        })
    }

    fn insert_slot(&mut self, slot: u32) -> Result<(), IndexError> {
        self.graph.resize(slot as usize + 1);
        self.graph.set_neighbors(slot, Vec::new())?;

        let entry = match self.entry_point {
            Some(entry) => entry,
            None => {
                self.entry_point = Some(slot);
                return Ok(());
            }
        };

        let vector = self.store.get(slot as usize)?.to_vec();
        let params = VamanaSearchParameters::new(
            SearchBufferConfig::exact(self.build_params.search_window_size),
            true,
            4,
            1,
        );
        let store = &self.store;
        let metric = self.metric;
        let visited = greedy_search(&self.graph, entry, &params, |id| {
            distance_raw(metric, &vector, store.get(id as usize).expect("visited node is live"))
        })?;

        let neighbors = robust_prune(slot, &vector, visited, &self.store, metric, self.build_params.alpha, self.build_params.max_degree);
        self.graph.set_neighbors(slot, neighbors.clone())?;
        for neighbor in neighbors {
            self.add_back_edge(neighbor, slot)?;
        }
        Ok(())
    }

    fn add_back_edge(&mut self, u: u32, v: u32) -> Result<(), IndexError> {
        let mut neighbors: Vec<u32> = self.graph.neighbors(u)?.to_vec();
        if neighbors.contains(&v) {
            return Ok(());
        }
        neighbors.push(v);
        if neighbors.len() > self.build_params.max_degree {
            let u_vector = self.store.get(u as usize)?.to_vec();
            let candidates: Vec<Neighbor> = neighbors
                .iter()
                .map(|&id| {
                    let d = distance_raw(self.metric, &u_vector, self.store.get(id as usize).expect("live slot"));
                    Neighbor::new(id, d)
                })
                .collect();
            neighbors = robust_prune(u, &u_vector, candidates, &self.store, self.metric, self.build_params.alpha, self.build_params.max_degree);
        }
        self.graph.set_neighbors(u, neighbors)?;
        Ok(())
    }
}

/// Greedy diversification: repeatedly take the closest remaining
/// candidate to `p`, then drop any remaining candidate `c` dominated by
/// it (`alpha * d(best, c) <= d(p, c)`), until `max_degree` neighbors are
/// chosen or candidates run out.
fn robust_prune(
    p_slot: u32,
    p_vector: &[f32],
    mut candidates: Vec<Neighbor>,
    store: &VectorStore,
    metric: DistanceFunction,
    alpha: f32,
    max_degree: usize,
) -> Vec<u32> {
    candidates.retain(|c| c.id != p_slot);
    candidates.sort();
    let mut result = Vec::new();
    while !candidates.is_empty() && result.len() < max_degree {
        let best = candidates.remove(0);
        result.push(best.id);
        let best_vec = store.get(best.id as usize).expect("candidate slot is live").to_vec();
        candidates.retain(|c| {
            let candidate_vec = store.get(c.id as usize).expect("candidate slot is live");
            let d_best_c = distance_raw(metric, &best_vec, candidate_vec);
            alpha * d_best_c > c.distance
        });
    }
    result
}

impl DynamicIndex for VamanaIndex {
    fn add_points(&mut self, points: &[Vec<f32>], ids: &[PointId], reuse_empty: bool) -> Result<(), IndexError> {
        if points.len() != ids.len() {
            return Err(IndexError::DimensionMismatch {
                expected: ids.len(),
                actual: points.len(),
            });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in ids {
            if self.id_map.has_id(id) || !seen.insert(id) {
                return Err(IndexError::IdConflict(id));
            }
        }
        for vector in points {
            self.check_dim(vector)?;
        }
        for (vector, &id) in points.iter().zip(ids) {
            let slot = self.id_map.reserve(id, reuse_empty)?;
            write_vector(&mut self.store, slot, vector)?;
            self.insert_slot(slot)?;
        }
        tracing::debug!(added = points.len(), nodes = self.graph.num_nodes(), "vamana add_points");
        Ok(())
    }

    fn delete_points(&mut self, ids: &[PointId]) -> Result<(), IndexError> {
        for id in ids {
            if !self.id_map.has_id(*id) {
                return Err(IndexError::IdMissing(*id));
            }
        }
        for &id in ids {
            self.id_map.tombstone(id)?;
        }
        tracing::debug!(deleted = ids.len(), "vamana delete_points");
        Ok(())
    }

    fn consolidate(&mut self) -> Result<(), IndexError> {
        let freed: HashSet<u32> = self.id_map.consolidate().into_iter().collect();
        tracing::debug!(freed = freed.len(), "vamana consolidate");
        if freed.is_empty() {
            return Ok(());
        }
        for slot in 0..self.graph.num_nodes() as u32 {
            let neighbors: Vec<u32> = self
                .graph
                .neighbors(slot)?
                .iter()
                .copied()
                .filter(|n| !freed.contains(n))
                .collect();
            self.graph.set_neighbors(slot, neighbors)?;
        }
        if let Some(entry) = self.entry_point {
            if freed.contains(&entry) {
                self.entry_point = self.id_map.all_ids().first().and_then(|&id| self.id_map.internal_of(id));
            }
        }
        Ok(())
    }

    fn compact(&mut self, _batch_size: Option<usize>) -> Result<(), IndexError> {
        let permutation = self.id_map.compact_permutation();
        self.store.compact_in_place(&permutation)?;
        self.graph.compact_in_place(&permutation)?;
        self.entry_point = self.id_map.all_ids().first().and_then(|&id| self.id_map.internal_of(id));
        Ok(())
    }

    fn has_id(&self, id: PointId) -> bool {
        self.id_map.has_id(id)
    }

    fn all_ids(&self) -> Vec<PointId> {
        self.id_map.all_ids()
    }

    fn get_distance(&self, id: PointId, query: &[f32]) -> Result<f32, IndexError> {
        self.check_dim(query)?;
        let slot = self.id_map.internal_of(id).ok_or(IndexError::IdMissing(id))?;
        Ok(distance_raw(self.metric, query, self.store.get(slot as usize)?))
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(PointId, f32)>, IndexError> {
        self.check_dim(query)?;
        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };
        let window = self.search_params.buffer_config.window_size.max(k).max(1);
        let mut params = self.search_params;
        params.buffer_config = SearchBufferConfig::exact(window);

        let store = &self.store;
        let metric = self.metric;
        let results = greedy_search(&self.graph, entry, &params, |id| {
            distance_raw(metric, query, store.get(id as usize).expect("visited node is live"))
        })?;

        let mut out: Vec<(PointId, f32)> = results
            .into_iter()
            .filter_map(|n| self.id_map.external_of(n.id).map(|ext| (ext, n.distance)))
            .collect();
        out.truncate(k);
        Ok(out)
    }
}

/// A resumable, growing search against a fixed query, opened via
/// `VamanaIndex::batch_search`. The query lives here rather than in
/// `vsearch_graph::BatchIterator` (which only ever sees a `distance_to`
/// closure rebuilt fresh each call), so this is also where
/// `update(new_query, ...)` — spec §4.5.2's contract — actually applies.
pub struct VamanaBatchSearch<'a> {
    query: Vec<f32>,
    store: &'a VectorStore,
    id_map: &'a IdMap,
    metric: DistanceFunction,
    inner: BatchIterator<'a>,
}

impl<'a> VamanaBatchSearch<'a> {
    pub fn results(&self) -> Vec<(PointId, f32)> {
        translate(self.id_map, self.inner.results())
    }

    pub fn done(&self) -> bool {
        self.inner.done()
    }

    pub fn next(&mut self) -> Result<Vec<(PointId, f32)>, IndexError> {
        let query = &self.query;
        let store = self.store;
        let metric = self.metric;
        let fresh = self.inner.next(|id| distance_raw(metric, query, store.get(id as usize).expect("visited node is live")))?;
        Ok(translate(self.id_map, &fresh))
    }

    /// Replaces the active query (and, optionally, the growth schedule),
    /// then restarts iteration. `new_query`'s dimension is checked before
    /// any state changes, so a mismatched query leaves this search's prior
    /// state intact.
    pub fn update(&mut self, new_query: Vec<f32>, new_schedule: Option<Box<dyn IteratorSchedule>>) -> Result<(), IndexError> {
        if new_query.len() != self.query.len() {
            return Err(IndexError::DimensionMismatch {
                expected: self.query.len(),
                actual: new_query.len(),
            });
        }
        self.inner.update(new_schedule);
        self.query = new_query;
        Ok(())
    }

    pub fn restart_next_search(&mut self) {
        self.inner.restart_next_search();
    }
}

fn translate(id_map: &IdMap, neighbors: &[Neighbor]) -> Vec<(PointId, f32)> {
    neighbors.iter().filter_map(|n| id_map.external_of(n.id).map(|id| (id, n.distance))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize) -> (Vec<Vec<f32>>, Vec<PointId>) {
        let points = (0..n).map(|i| vec![i as f32, 0.0]).collect();
        let ids = (0..n).map(|i| PointId(i as u64)).collect();
        (points, ids)
    }

    fn build(n: usize) -> VamanaIndex {
        let (points, ids) = grid_points(n);
        let mut index = VamanaIndex::new(
            2,
            DistanceFunction::Euclidean,
            VamanaBuildParameters::new(1.2, 8, 32),
        );
        index.add_points(&points, &ids, false).unwrap();
        index
    }

    #[test]
    fn search_recovers_exact_nearest_on_a_line() {
        let index = build(200);
        let results = index.search(&[57.3, 0.0], 5).unwrap();
        assert_eq!(results[0].0, PointId(57));
    }

    #[test]
    fn every_node_has_at_most_max_degree_neighbors() {
        let index = build(100);
        for slot in 0..index.graph.num_nodes() as u32 {
            assert!(index.graph.neighbors(slot).unwrap().len() <= index.build_params.max_degree);
        }
    }

    #[test]
    fn delete_then_search_excludes_tombstoned_points() {
        let mut index = build(50);
        index.delete_points(&[PointId(10)]).unwrap();
        let results = index.search(&[10.0, 0.0], 50).unwrap();
        assert!(!results.iter().any(|(id, _)| *id == PointId(10)));
    }

    #[test]
    fn compact_preserves_external_ids() {
        let mut index = build(30);
        index.delete_points(&[PointId(5), PointId(6)]).unwrap();
        index.consolidate().unwrap();
        index.compact(None).unwrap();
        assert!(!index.has_id(PointId(5)));
        assert!(index.has_id(PointId(20)));
        let results = index.search(&[20.0, 0.0], 1).unwrap();
        assert_eq!(results[0].0, PointId(20));
    }

    #[test]
    fn add_points_rejects_duplicate_id() {
        let mut index = build(5);
        assert!(index.add_points(&[vec![1.0, 1.0]], &[PointId(2)], false).is_err());
    }

    #[test]
    fn add_points_rejects_in_batch_duplicate_id_and_leaves_index_unchanged() {
        let mut index = build(5);
        let before = index.all_ids().len();
        let err = index.add_points(
            &[vec![10.0, 10.0], vec![11.0, 11.0]],
            &[PointId(100), PointId(100)],
            false,
        );
        assert!(err.is_err());
        assert_eq!(index.all_ids().len(), before);
        assert!(!index.has_id(PointId(100)));
    }

    #[test]
    fn add_points_rejects_later_dimension_mismatch_and_leaves_index_unchanged() {
        let mut index = build(5);
        let before = index.all_ids().len();
        let err = index.add_points(
            &[vec![10.0, 10.0], vec![11.0, 11.0, 11.0]],
            &[PointId(100), PointId(101)],
            false,
        );
        assert!(err.is_err());
        assert_eq!(index.all_ids().len(), before);
        assert!(!index.has_id(PointId(100)));
        assert!(!index.has_id(PointId(101)));
    }

    #[test]
    fn batch_search_on_empty_index_is_empty_index_error() {
        let index = VamanaIndex::new(2, DistanceFunction::Euclidean, VamanaBuildParameters::new(1.2, 8, 32));
        let schedule = Box::new(vsearch_graph::DefaultSchedule::new(
            VamanaSearchParameters::new(SearchBufferConfig::exact(4), false, 4, 1),
            4,
        ));
        assert!(index.batch_search(vec![0.0, 0.0], schedule).is_err());
    }

    #[test]
    fn batch_search_accumulates_same_results_as_one_shot_search() {
        let index = build(100);
        let schedule = Box::new(vsearch_graph::DefaultSchedule::new(
            VamanaSearchParameters::new(SearchBufferConfig::exact(4), false, 4, 1),
            4,
        ));
        let mut batch = index.batch_search(vec![42.0, 0.0], schedule).unwrap();
        let mut all_ids = Vec::new();
        for _ in 0..5 {
            let fresh = batch.next().unwrap();
            all_ids.extend(fresh.into_iter().map(|(id, _)| id));
        }
        assert!(all_ids.contains(&PointId(42)));
    }

    #[test]
    fn batch_search_update_rejects_wrong_dimension_and_keeps_prior_query() {
        let index = build(50);
        let schedule = Box::new(vsearch_graph::DefaultSchedule::new(
            VamanaSearchParameters::new(SearchBufferConfig::exact(4), false, 4, 1),
            4,
        ));
        let mut batch = index.batch_search(vec![10.0, 0.0], schedule).unwrap();
        batch.next().unwrap();
        assert!(batch.update(vec![1.0, 2.0, 3.0], None).is_err());
        assert_eq!(batch.query, vec![10.0, 0.0]);
    }
}
