//! Shared lifecycle contract for the mutable index families (spec §4.6):
//! add/delete/consolidate/compact plus inspection. `FlatIndex`,
//! `VamanaIndex`, and `IvfIndex` all implement this the same way a
//! `VectorIndex` trait unifies index backends in the teacher codebase.

use vsearch_types::PointId;

use crate::error::IndexError;

pub trait DynamicIndex {
    /// Adds `points` under `ids` (same length). If `reuse_empty`, fills
    /// previously-tombstoned-and-consolidated slots in earliest-first
    /// order before appending; otherwise always appends. Fails with
    /// `IdConflict` and leaves the index unchanged if any id is already
    /// present.
    fn add_points(&mut self, points: &[Vec<f32>], ids: &[PointId], reuse_empty: bool) -> Result<(), IndexError>;

    /// Tombstones `ids`: excluded from search immediately but still
    /// occupying storage. Fails with `IdMissing` and leaves the index
    /// unchanged if any id is absent.
    fn delete_points(&mut self, ids: &[PointId]) -> Result<(), IndexError>;

    /// Resolves tombstones into reusable empty slots and patches internal
    /// adjacency/partition state to skip them.
    fn consolidate(&mut self) -> Result<(), IndexError>;

    /// Renumbers internal ids densely, shrinking backing storage.
    /// `batch_size` bounds work done per call when the caller wants to
    /// amortize compaction incrementally; `None` compacts everything in
    /// one pass. Either way external ids and search results are
    /// unaffected — only storage density changes.
    fn compact(&mut self, batch_size: Option<usize>) -> Result<(), IndexError>;

    fn has_id(&self, id: PointId) -> bool;

    fn all_ids(&self) -> Vec<PointId>;

    fn get_distance(&self, id: PointId, query: &[f32]) -> Result<f32, IndexError>;

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(PointId, f32)>, IndexError>;
}

/// Writes `vector` into `slot`: appends if `slot` is a brand-new slot
/// (`slot == store.size()`), otherwise overwrites a reused one.
pub(crate) fn write_vector(store: &mut crate::store::VectorStore, slot: u32, vector: &[f32]) -> Result<(), IndexError> {
    if slot as usize == store.size() {
        store.append(vector)?;
    } else {
        store.set(slot as usize, vector)?;
    }
    Ok(())
}
