use crate::error::GraphError;
use crate::neighbor::{Neighbor, SearchNeighbor};

/// `window_size` is the search width `L`: greedy search is "done" once the
/// first `window_size` entries are all visited. `total_capacity` bounds how
/// many candidates the buffer retains past the window, which the batch
/// iterator uses to keep extra candidates around for the next batch without
/// re-searching from scratch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBufferConfig {
    pub window_size: usize,
    pub total_capacity: usize,
}

impl SearchBufferConfig {
    pub fn new(window_size: usize, total_capacity: usize) -> Result<Self, GraphError> {
        if total_capacity < window_size {
            return Err(GraphError::InvalidBufferConfig {
                window_size,
                total_capacity,
            });
        }
        Ok(SearchBufferConfig {
            window_size,
            total_capacity,
        })
    }

    /// `total_capacity == window_size`, the common case outside iterators.
    pub fn exact(window_size: usize) -> Self {
        SearchBufferConfig {
            window_size,
            total_capacity: window_size,
        }
    }

    /// Grows both fields in place, used by batch-iterator growth schedules.
    pub fn increment(&mut self, window_delta: usize, capacity_delta: usize) {
        self.window_size += window_delta;
        self.total_capacity += capacity_delta;
    }
}

/// A sorted, bounded sequence of candidates visited during greedy search.
///
/// Entries stay sorted by distance ascending as they're inserted; once the
/// buffer holds `total_capacity` entries, insertions that would sort past
/// the end are dropped. `is_done` reflects whether the first `window_size`
/// entries have all been expanded (visited), which is the greedy-search
/// termination condition.
#[derive(Clone, Debug)]
pub struct SearchBuffer {
    config: SearchBufferConfig,
    entries: Vec<SearchNeighbor>,
}

impl SearchBuffer {
    pub fn new(config: SearchBufferConfig) -> Self {
        SearchBuffer {
            config,
            entries: Vec::with_capacity(config.total_capacity),
        }
    }

    pub fn config(&self) -> SearchBufferConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Inserts `neighbor`, keeping entries sorted by distance. Returns the
    /// position it landed at, or `None` if it was beyond `total_capacity`
    /// and dropped, or if `id` was already present.
    pub fn insert(&mut self, neighbor: Neighbor) -> Option<usize> {
        if self.entries.iter().any(|e| e.neighbor.id == neighbor.id) {
            return None;
        }
        let pos = self.entries.partition_point(|e| e.neighbor.cmp(&neighbor) == std::cmp::Ordering::Less);
        if pos >= self.config.total_capacity {
            return None;
        }
        self.entries.insert(pos, SearchNeighbor::unvisited(neighbor));
        if self.entries.len() > self.config.total_capacity {
            self.entries.truncate(self.config.total_capacity);
        }
        Some(pos)
    }

    /// The lowest-distance entry within the active window that has not yet
    /// been visited, if any.
    pub fn next_unvisited(&self) -> Option<Neighbor> {
        self.entries
            .iter()
            .take(self.config.window_size)
            .find(|e| !e.visited)
            .map(|e| e.neighbor)
    }

    pub fn mark_visited(&mut self, id: u32) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.neighbor.id == id) {
            e.visited = true;
        }
    }

    /// True once every entry within the first `window_size` slots has been
    /// visited (or there are fewer than `window_size` entries total and all
    /// of them are visited).
    pub fn is_done(&self) -> bool {
        self.entries
            .iter()
            .take(self.config.window_size)
            .all(|e| e.visited)
    }

    pub fn top_k(&self, k: usize) -> Vec<Neighbor> {
        self.entries.iter().take(k).map(|e| e.neighbor).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchNeighbor> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_capacity_below_window() {
        assert!(SearchBufferConfig::new(10, 5).is_err());
    }

    #[test]
    fn insert_keeps_sorted_order() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::exact(3));
        buf.insert(Neighbor::new(1, 3.0));
        buf.insert(Neighbor::new(2, 1.0));
        buf.insert(Neighbor::new(3, 2.0));
        let ids: Vec<u32> = buf.top_k(3).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn insert_beyond_capacity_is_dropped() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::exact(2));
        buf.insert(Neighbor::new(1, 1.0));
        buf.insert(Neighbor::new(2, 2.0));
        assert!(buf.insert(Neighbor::new(3, 5.0)).is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn equal_distance_ties_break_by_ascending_id() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::exact(3));
        buf.insert(Neighbor::new(5, 1.0));
        buf.insert(Neighbor::new(2, 1.0));
        buf.insert(Neighbor::new(8, 1.0));
        let ids: Vec<u32> = buf.top_k(3).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 5, 8]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::exact(3));
        buf.insert(Neighbor::new(1, 1.0));
        assert!(buf.insert(Neighbor::new(1, 0.5)).is_none());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn is_done_tracks_window_visitation() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::new(2, 4).unwrap());
        buf.insert(Neighbor::new(1, 1.0));
        buf.insert(Neighbor::new(2, 2.0));
        buf.insert(Neighbor::new(3, 3.0));
        assert!(!buf.is_done());
        buf.mark_visited(1);
        assert!(!buf.is_done());
        buf.mark_visited(2);
        assert!(buf.is_done());
    }

    #[test]
    fn next_unvisited_respects_window() {
        let mut buf = SearchBuffer::new(SearchBufferConfig::new(1, 3).unwrap());
        buf.insert(Neighbor::new(1, 1.0));
        buf.insert(Neighbor::new(2, 2.0));
        assert_eq!(buf.next_unvisited().unwrap().id, 1);
        buf.mark_visited(1);
        assert_eq!(buf.next_unvisited(), None);
    }
}
