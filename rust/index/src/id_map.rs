//! Bidirectional mapping between externally-visible [`PointId`]s and
//! dense internal `u32` storage slots, plus the tombstone/free-slot
//! bookkeeping `add_points`/`delete_points`/`consolidate`/`compact` share.

use std::collections::{BTreeSet, HashMap, HashSet};

use vsearch_types::PointId;

use crate::error::IndexError;

#[derive(Default)]
pub struct IdMap {
    external_to_internal: HashMap<PointId, u32>,
    internal_to_external: Vec<Option<PointId>>,
    tombstones: HashSet<u32>,
    /// Slots that are entirely empty (never assigned, or reclaimed by
    /// `consolidate`) and can be reused by `add_points(reuse_empty=true)`.
    /// Earliest-empty-first ordering is deterministic and independent of
    /// deletion order.
    free_list: BTreeSet<u32>,
}

impl IdMap {
    pub fn new() -> Self {
        IdMap::default()
    }

    pub fn len(&self) -> usize {
        self.external_to_internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.external_to_internal.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.internal_to_external.len()
    }

    pub fn has_id(&self, id: PointId) -> bool {
        self.external_to_internal.contains_key(&id)
    }

    pub fn internal_of(&self, id: PointId) -> Option<u32> {
        self.external_to_internal.get(&id).copied()
    }

    pub fn external_of(&self, slot: u32) -> Option<PointId> {
        self.internal_to_external.get(slot as usize).copied().flatten()
    }

    pub fn is_tombstoned(&self, slot: u32) -> bool {
        self.tombstones.contains(&slot)
    }

    pub fn all_ids(&self) -> Vec<PointId> {
        self.external_to_internal.keys().copied().collect()
    }

    /// Reserves a slot for `id`, either reusing the earliest free slot (if
    /// `reuse_empty`) or appending a new one. Fails with `IdConflict` if
    /// `id` is already present.
    pub fn reserve(&mut self, id: PointId, reuse_empty: bool) -> Result<u32, IndexError> {
        if self.has_id(id) {
            return Err(IndexError::IdConflict(id));
        }
        let slot = if reuse_empty {
            if let Some(&slot) = self.free_list.iter().next() {
                self.free_list.remove(&slot);
                slot
            } else {
                self.append_slot()
            }
        } else {
            self.append_slot()
        };
        self.internal_to_external[slot as usize] = Some(id);
        self.external_to_internal.insert(id, slot);
        Ok(slot)
    }

    fn append_slot(&mut self) -> u32 {
        let slot = self.internal_to_external.len() as u32;
        self.internal_to_external.push(None);
        slot
    }

    /// Rebuilds a map from a persisted `(slot, id)` list plus the total
    /// slot capacity: slots absent from `entries` are empty and join the
    /// free list, matching a freshly-loaded index's tombstone-free state.
    pub fn restore(capacity: usize, entries: Vec<(u32, PointId)>) -> Self {
        let mut map = IdMap {
            internal_to_external: vec![None; capacity],
            ..IdMap::default()
        };
        let mut occupied = vec![false; capacity];
        for (slot, id) in entries {
            map.internal_to_external[slot as usize] = Some(id);
            map.external_to_internal.insert(id, slot);
            occupied[slot as usize] = true;
        }
        for (slot, &is_occupied) in occupied.iter().enumerate() {
            if !is_occupied {
                map.free_list.insert(slot as u32);
            }
        }
        map
    }

    /// The `(slot, id)` pairs for every live id, ascending by slot.
    pub fn entries(&self) -> Vec<(u32, PointId)> {
        self.internal_to_external
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| id.map(|id| (slot as u32, id)))
            .collect()
    }

    /// Marks `id`'s slot tombstoned: excluded from `all_ids`/search but
    /// still occupying storage until `consolidate`.
    pub fn tombstone(&mut self, id: PointId) -> Result<u32, IndexError> {
        let slot = self.internal_of(id).ok_or(IndexError::IdMissing(id))?;
        self.tombstones.insert(slot);
        self.external_to_internal.remove(&id);
        self.internal_to_external[slot as usize] = None;
        Ok(slot)
    }

    /// Resolves tombstones into free slots so `add_points(reuse_empty=true)`
    /// can reclaim them. Returns the slots that became free.
    pub fn consolidate(&mut self) -> Vec<u32> {
        let resolved: Vec<u32> = self.tombstones.drain().collect();
        for &slot in &resolved {
            self.free_list.insert(slot);
        }
        resolved
    }

    /// Builds the dense permutation for `compact`: `permutation[new_i] =
    /// old_i`, walking live (non-tombstoned, occupied) slots in ascending
    /// pre-compact order so relative order is preserved, then applies it
    /// to this map's own bookkeeping.
    pub fn compact_permutation(&mut self) -> Vec<u32> {
        let permutation: Vec<u32> = (0..self.internal_to_external.len() as u32)
            .filter(|&slot| self.internal_to_external[slot as usize].is_some())
            .collect();

        let mut new_internal_to_external = Vec::with_capacity(permutation.len());
        for (new_slot, &old_slot) in permutation.iter().enumerate() {
            let id = self.internal_to_external[old_slot as usize].expect("filtered to occupied slots");
            self.external_to_internal.insert(id, new_slot as u32);
            new_internal_to_external.push(Some(id));
        }
        self.internal_to_external = new_internal_to_external;
        self.tombstones.clear();
        self.free_list.clear();
        permutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_appends_when_no_free_slots() {
        let mut map = IdMap::new();
        let a = map.reserve(PointId(1), false).unwrap();
        let b = map.reserve(PointId(2), false).unwrap();
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn reserve_rejects_duplicate_id() {
        let mut map = IdMap::new();
        map.reserve(PointId(1), false).unwrap();
        assert!(map.reserve(PointId(1), false).is_err());
    }

    #[test]
    fn tombstone_then_consolidate_frees_earliest_slot_first() {
        let mut map = IdMap::new();
        map.reserve(PointId(1), false).unwrap();
        map.reserve(PointId(2), false).unwrap();
        map.reserve(PointId(3), false).unwrap();
        map.tombstone(PointId(2)).unwrap();
        map.tombstone(PointId(1)).unwrap();
        let freed = map.consolidate();
        assert_eq!(freed.len(), 2);

        let reused = map.reserve(PointId(4), true).unwrap();
        assert_eq!(reused, 0, "earliest-empty-first reuse");
    }

    #[test]
    fn tombstoned_id_is_missing_until_reused() {
        let mut map = IdMap::new();
        map.reserve(PointId(1), false).unwrap();
        map.tombstone(PointId(1)).unwrap();
        assert!(!map.has_id(PointId(1)));
        assert!(map.tombstone(PointId(1)).is_err());
    }

    #[test]
    fn compact_permutation_preserves_relative_order() {
        let mut map = IdMap::new();
        map.reserve(PointId(10), false).unwrap();
        map.reserve(PointId(20), false).unwrap();
        map.reserve(PointId(30), false).unwrap();
        map.tombstone(PointId(20)).unwrap();

        let permutation = map.compact_permutation();
        assert_eq!(permutation, vec![0, 2]);
        assert_eq!(map.internal_of(PointId(10)), Some(0));
        assert_eq!(map.internal_of(PointId(30)), Some(1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn restore_reconstructs_entries_and_frees_gaps() {
        let mut original = IdMap::new();
        original.reserve(PointId(1), false).unwrap();
        original.reserve(PointId(2), false).unwrap();
        original.reserve(PointId(3), false).unwrap();
        original.tombstone(PointId(2)).unwrap();
        original.consolidate();

        let entries = original.entries();
        let restored = IdMap::restore(original.capacity(), entries);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.internal_of(PointId(1)), Some(0));
        assert_eq!(restored.internal_of(PointId(3)), Some(2));
        assert!(!restored.has_id(PointId(2)));
    }
}
