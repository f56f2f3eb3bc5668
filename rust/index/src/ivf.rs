//! Inverted (IVF) index: vectors are assigned to the nearest of `k`
//! centroids (trained once via Lloyd's k-means), and search probes the
//! `n_probes` nearest partitions, exactly re-ranking ("k-reorder") the
//! gathered candidates before truncating to the requested `k`.

use std::collections::HashSet;

use vsearch_distance::distance_raw;
use vsearch_types::{DistanceFunction, PointId};

use crate::dynamic::{write_vector, DynamicIndex};
use crate::error::IndexError;
use crate::id_map::IdMap;
use crate::store::VectorStore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IvfBuildParameters {
    pub num_centroids: usize,
    pub kmeans_iterations: usize,
}

impl IvfBuildParameters {
    pub fn new(num_centroids: usize, kmeans_iterations: usize) -> Self {
        IvfBuildParameters {
            num_centroids,
            kmeans_iterations,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IvfSearchParameters {
    pub n_probes: usize,
    /// Minimum number of exactly-reranked candidates to keep before the
    /// final truncation to the requested `k`.
    pub k_reorder: usize,
}

impl IvfSearchParameters {
    pub fn new(n_probes: usize, k_reorder: usize) -> Self {
        IvfSearchParameters { n_probes, k_reorder }
    }
}

impl Default for IvfSearchParameters {
    fn default() -> Self {
        IvfSearchParameters { n_probes: 1, k_reorder: 0 }
    }
}

pub struct IvfIndex {
    id_map: IdMap,
    store: VectorStore,
    metric: DistanceFunction,
    centroids: Vec<Vec<f32>>,
    partitions: Vec<Vec<u32>>,
    assignment: Vec<Option<usize>>,
    search_params: IvfSearchParameters,
}

impl IvfIndex {
    pub fn new(dim: usize, metric: DistanceFunction) -> Self {
        IvfIndex {
            id_map: IdMap::new(),
            store: VectorStore::new(dim),
            metric,
            centroids: Vec::new(),
            partitions: Vec::new(),
            assignment: Vec::new(),
            search_params: IvfSearchParameters::default(),
        }
    }

    pub fn set_search_params(&mut self, params: IvfSearchParameters) {
        self.search_params = params;
    }

    pub fn num_centroids(&self) -> usize {
        self.centroids.len()
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

    fn nearest_centroid(&self, vector: &[f32]) -> usize {
        self.centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, distance_raw(self.metric, vector, c)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(i, _)| i)
            .expect("centroids is non-empty")
    }

    /// Trains `params.num_centroids` centroids via Lloyd's k-means over
    /// `sample`, seeding from the first `num_centroids` points. Resets any
    /// existing partitions; points already in the index are not
    /// reassigned by this call — retrain before adding points, or call
    /// again with a larger sample up front.
    pub fn train(&mut self, sample: &[Vec<f32>], params: IvfBuildParameters) -> Result<(), IndexError> {
        if params.num_centroids == 0 || params.num_centroids > sample.len() {
            return Err(IndexError::InvalidCentroidCount);
        }
        for v in sample {
            self.check_dim(v)?;
        }

        let dim = self.store.dimensions();
        let mut centroids: Vec<Vec<f32>> = sample[..params.num_centroids].to_vec();

        for _ in 0..params.kmeans_iterations {
            let mut sums = vec![vec![0.0f32; dim]; centroids.len()];
            let mut counts = vec![0usize; centroids.len()];
            for v in sample {
                let nearest = centroids
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i, distance_raw(self.metric, v, c)))
                    .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                    .map(|(i, _)| i)
                    .expect("centroids is non-empty");
                for d in 0..dim {
                    sums[nearest][d] += v[d];
                }
                counts[nearest] += 1;
            }
            for (i, centroid) in centroids.iter_mut().enumerate() {
                if counts[i] > 0 {
                    for d in 0..dim {
                        centroid[d] = sums[i][d] / counts[i] as f32;
                    }
                }
            }
        }

        self.centroids = centroids;
        self.partitions = vec![Vec::new(); self.centroids.len()];
        self.assignment = vec![None; self.store.size()];
        tracing::debug!(centroids = self.centroids.len(), iterations = params.kmeans_iterations, "ivf train");
        Ok(())
    }
}

impl DynamicIndex for IvfIndex {
    fn add_points(&mut self, points: &[Vec<f32>], ids: &[PointId], reuse_empty: bool) -> Result<(), IndexError> {
        if self.centroids.is_empty() {
            return Err(IndexError::Untrained);
        }
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
            let centroid = self.nearest_centroid(vector);
            if slot as usize == self.assignment.len() {
                self.assignment.push(Some(centroid));
            } else {
                self.assignment[slot as usize] = Some(centroid);
            }
            self.partitions[centroid].push(slot);
        }
        tracing::debug!(added = points.len(), "ivf add_points");
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
        tracing::debug!(deleted = ids.len(), "ivf delete_points");
        Ok(())
    }

    fn consolidate(&mut self) -> Result<(), IndexError> {
        let freed = self.id_map.consolidate();
        tracing::debug!(freed = freed.len(), "ivf consolidate");
        for slot in freed {
            if let Some(centroid) = self.assignment[slot as usize].take() {
                self.partitions[centroid].retain(|&s| s != slot);
            }
        }
        Ok(())
    }

    fn compact(&mut self, _batch_size: Option<usize>) -> Result<(), IndexError> {
        let permutation = self.id_map.compact_permutation();
        tracing::debug!(live = permutation.len(), "ivf compact");
        self.store.compact_in_place(&permutation)?;

        let mut old_to_new = vec![None; self.assignment.len()];
        for (new_slot, &old_slot) in permutation.iter().enumerate() {
            old_to_new[old_slot as usize] = Some(new_slot as u32);
        }
        let mut new_assignment = vec![None; permutation.len()];
        for (new_slot, &old_slot) in permutation.iter().enumerate() {
            new_assignment[new_slot] = self.assignment[old_slot as usize];
        }
        self.assignment = new_assignment;
        for partition in &mut self.partitions {
            partition.retain_mut(|slot| {
                match old_to_new[*slot as usize] {
                    Some(new_slot) => {
                        *slot = new_slot;
                        true
                    }
                    None => false,
                }
            });
        }
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
        if self.centroids.is_empty() {
            return Ok(Vec::new());
        }
        let mut centroid_order: Vec<usize> = (0..self.centroids.len()).collect();
        centroid_order.sort_by(|&a, &b| {
            let da = distance_raw(self.metric, query, &self.centroids[a]);
            let db = distance_raw(self.metric, query, &self.centroids[b]);
            da.partial_cmp(&db).unwrap()
        });
        let probes = self.search_params.n_probes.max(1).min(self.centroids.len());

        let mut candidates: Vec<(PointId, f32)> = Vec::new();
        for &centroid in &centroid_order[..probes] {
            for &slot in &self.partitions[centroid] {
                if let Some(id) = self.id_map.external_of(slot) {
                    let d = distance_raw(self.metric, query, self.store.get(slot as usize)?);
                    candidates.push((id, d));
                }
            }
        }
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        let rerank_width = k.max(self.search_params.k_reorder).max(1);
        candidates.truncate(rerank_width);
        candidates.truncate(k);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> (Vec<Vec<f32>>, Vec<PointId>) {
        let points = (0..n).map(|i| vec![i as f32, 0.0]).collect();
        let ids = (0..n).map(|i| PointId(i as u64)).collect();
        (points, ids)
    }

    fn build(n: usize, centroids: usize, probes: usize) -> IvfIndex {
        let (points, ids) = grid(n);
        let mut index = IvfIndex::new(2, DistanceFunction::Euclidean);
        index.train(&points, IvfBuildParameters::new(centroids, 5)).unwrap();
        index.set_search_params(IvfSearchParameters::new(probes, 0));
        index.add_points(&points, &ids, false).unwrap();
        index
    }

    #[test]
    fn add_before_train_is_untrained_error() {
        let mut index = IvfIndex::new(2, DistanceFunction::Euclidean);
        assert!(index.add_points(&[vec![1.0, 1.0]], &[PointId(1)], false).is_err());
    }

    #[test]
    fn add_points_rejects_in_batch_duplicate_id_and_leaves_index_unchanged() {
        let mut index = build(20, 2, 2);
        let before = index.all_ids().len();
        let err = index.add_points(
            &[vec![50.0, 50.0], vec![51.0, 51.0]],
            &[PointId(100), PointId(100)],
            false,
        );
        assert!(err.is_err());
        assert_eq!(index.all_ids().len(), before);
        assert!(!index.has_id(PointId(100)));
    }

    #[test]
    fn add_points_rejects_later_dimension_mismatch_and_leaves_index_unchanged() {
        let mut index = build(20, 2, 2);
        let before = index.all_ids().len();
        let err = index.add_points(
            &[vec![50.0, 50.0], vec![51.0, 51.0, 51.0]],
            &[PointId(100), PointId(101)],
            false,
        );
        assert!(err.is_err());
        assert_eq!(index.all_ids().len(), before);
        assert!(!index.has_id(PointId(100)));
        assert!(!index.has_id(PointId(101)));
    }

    #[test]
    fn full_probe_matches_exact_nearest() {
        let index = build(100, 5, 5);
        let results = index.search(&[42.2, 0.0], 1).unwrap();
        assert_eq!(results[0].0, PointId(42));
    }

    #[test]
    fn single_probe_still_returns_results() {
        let index = build(100, 5, 1);
        let results = index.search(&[0.0, 0.0], 3).unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
    }

    #[test]
    fn delete_then_consolidate_removes_from_partitions() {
        let mut index = build(20, 2, 2);
        index.delete_points(&[PointId(3)]).unwrap();
        index.consolidate().unwrap();
        let results = index.search(&[3.0, 0.0], 20).unwrap();
        assert!(!results.iter().any(|(id, _)| *id == PointId(3)));
    }

    #[test]
    fn compact_preserves_search_correctness() {
        let mut index = build(20, 2, 2);
        index.delete_points(&[PointId(3), PointId(4)]).unwrap();
        index.consolidate().unwrap();
        index.compact(None).unwrap();
        assert!(index.has_id(PointId(10)));
        let results = index.search(&[10.0, 0.0], 1).unwrap();
        assert_eq!(results[0].0, PointId(10));
    }
}
