//! Exact brute-force index: used both as a standalone index family and as
//! the groundtruth oracle for calibration (§4.5.3) and testable property
//! S6 ("exhaustive flat search").

use std::collections::HashSet;

use vsearch_distance::distance_raw;
use vsearch_types::{DistanceFunction, PointId};

use crate::dynamic::{write_vector, DynamicIndex};
use crate::error::IndexError;
use crate::id_map::IdMap;
use crate::store::VectorStore;

pub struct FlatIndex {
    id_map: IdMap,
    store: VectorStore,
    metric: DistanceFunction,
}

impl FlatIndex {
    pub fn new(dim: usize, metric: DistanceFunction) -> Self {
        FlatIndex {
            id_map: IdMap::new(),
            store: VectorStore::new(dim),
            metric,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.store.dimensions()
    }

    fn check_dim(&self, query: &[f32]) -> Result<(), IndexError> {
        if query.len() != self.store.dimensions() {
            return Err(IndexError::DimensionMismatch {
                expected: self.store.dimensions(),
                actual: query.len(),
            });
        }
        Ok(())
    }
}

impl DynamicIndex for FlatIndex {
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
        }
        tracing::debug!(added = points.len(), "flat index add_points");
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
        tracing::debug!(deleted = ids.len(), "flat index delete_points");
        Ok(())
    }

    fn consolidate(&mut self) -> Result<(), IndexError> {
        let freed = self.id_map.consolidate();
        tracing::debug!(freed = freed.len(), "flat index consolidate");
        Ok(())
    }

    fn compact(&mut self, _batch_size: Option<usize>) -> Result<(), IndexError> {
        let permutation = self.id_map.compact_permutation();
        self.store.compact_in_place(&permutation)?;
        tracing::debug!(live = permutation.len(), "flat index compact");
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
        let mut results: Vec<(PointId, f32)> = self
            .id_map
            .all_ids()
            .into_iter()
            .map(|id| {
                let slot = self.id_map.internal_of(id).expect("id came from all_ids");
                let d = distance_raw(self.metric, query, self.store.get(slot as usize).expect("live slot"));
                (id, d)
            })
            .collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        results.truncate(k);
        Ok(results)
    }
}
