//! Growth schedules for the batch iterator: given an iteration number,
//! produce the search parameters and max-candidates cap to use for it.

use crate::error::GraphError;
use crate::params::VamanaSearchParameters;

/// A batch-iterator growth schedule: must (at least) grow the search
/// buffer capacity each iteration so new, previously-unseen candidates can
/// surface, and reports how many of the top candidates are valid to yield.
pub trait IteratorSchedule: Send + Sync {
    fn for_iteration(&self, iteration: usize) -> VamanaSearchParameters;
    fn max_candidates(&self, iteration: usize) -> usize;
    fn clone_box(&self) -> Box<dyn IteratorSchedule>;
}

/// Grows both the search window and buffer capacity by `batch_size` per
/// iteration; yields exactly `batch_size` candidates each time.
#[derive(Clone, Debug)]
pub struct DefaultSchedule {
    base: VamanaSearchParameters,
    batch_size: usize,
}

impl DefaultSchedule {
    pub fn new(base: VamanaSearchParameters, batch_size: usize) -> Self {
        DefaultSchedule { base, batch_size }
    }
}

impl IteratorSchedule for DefaultSchedule {
    fn for_iteration(&self, i: usize) -> VamanaSearchParameters {
        let mut p = self.base;
        let delta = i * self.batch_size;
        p.buffer_config.increment(delta, delta);
        p
    }

    fn max_candidates(&self, _i: usize) -> usize {
        self.batch_size
    }

    fn clone_box(&self) -> Box<dyn IteratorSchedule> {
        Box::new(self.clone())
    }
}

/// Separately-tunable linear growth schedule: the window size, buffer
/// capacity, and batch size each scale linearly with the iteration number,
/// and the visited-set filter can be turned on starting at a given
/// iteration.
#[derive(Clone, Debug)]
pub struct LinearSchedule {
    base: VamanaSearchParameters,
    scale_search_window: usize,
    scale_buffer_capacity: usize,
    enable_filter_after: Option<usize>,
    batch_size_start: usize,
    scale_batch_size: usize,
}

impl LinearSchedule {
    pub fn new(
        base: VamanaSearchParameters,
        scale_search_window: usize,
        scale_buffer_capacity: usize,
        enable_filter_after: Option<usize>,
        batch_size_start: usize,
        scale_batch_size: usize,
    ) -> Result<Self, GraphError> {
        if scale_buffer_capacity < scale_search_window {
            return Err(GraphError::InvalidSchedule {
                buffer_capacity: scale_buffer_capacity,
                search_window: scale_search_window,
            });
        }
        if batch_size_start == 0 {
            return Err(GraphError::InvalidBatchSize(batch_size_start));
        }
        Ok(LinearSchedule {
            base,
            scale_search_window,
            scale_buffer_capacity,
            enable_filter_after,
            batch_size_start,
            scale_batch_size,
        })
    }

    /// A uniform schedule scaling both buffer fields by `batch_size` with
    /// a matching starting batch size and no batch-size scaling — the
    /// common shorthand construction.
    pub fn uniform(
        base: VamanaSearchParameters,
        batch_size: usize,
        enable_filter_after: Option<usize>,
    ) -> Result<Self, GraphError> {
        LinearSchedule::new(base, batch_size, batch_size, enable_filter_after, batch_size, 0)
    }
}

impl IteratorSchedule for LinearSchedule {
    fn for_iteration(&self, i: usize) -> VamanaSearchParameters {
        let mut p = self.base;
        p.buffer_config
            .increment(self.scale_search_window * i, self.scale_buffer_capacity * i);
        if let Some(enable_after) = self.enable_filter_after {
            if i >= enable_after {
                p.search_buffer_visited_set = true;
            }
        }
        p
    }

    fn max_candidates(&self, i: usize) -> usize {
        self.batch_size_start + self.scale_batch_size * i
    }

    fn clone_box(&self) -> Box<dyn IteratorSchedule> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn IteratorSchedule> {
    fn clone(&self) -> Self {
        self.as_ref().clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SearchBufferConfig;

    fn base() -> VamanaSearchParameters {
        VamanaSearchParameters::new(SearchBufferConfig::exact(10), false, 4, 1)
    }

    #[test]
    fn default_schedule_grows_by_batch_size() {
        let s = DefaultSchedule::new(base(), 5);
        let p0 = s.for_iteration(0);
        let p1 = s.for_iteration(1);
        assert_eq!(p0.buffer_config.window_size, 10);
        assert_eq!(p1.buffer_config.window_size, 15);
        assert_eq!(s.max_candidates(1), 5);
    }

    #[test]
    fn linear_schedule_rejects_capacity_slower_than_window() {
        assert!(LinearSchedule::new(base(), 10, 5, None, 1, 0).is_err());
    }

    #[test]
    fn linear_schedule_rejects_zero_batch_start() {
        assert!(LinearSchedule::new(base(), 5, 5, None, 0, 0).is_err());
    }

    #[test]
    fn linear_schedule_enables_filter_after_threshold() {
        let s = LinearSchedule::new(base(), 5, 5, Some(2), 1, 0).unwrap();
        assert!(!s.for_iteration(1).search_buffer_visited_set);
        assert!(s.for_iteration(2).search_buffer_visited_set);
    }

    #[test]
    fn boxed_schedule_clones_and_dispatches() {
        let boxed: Box<dyn IteratorSchedule> = Box::new(DefaultSchedule::new(base(), 3));
        let cloned = boxed.clone();
        assert_eq!(boxed.max_candidates(2), cloned.max_candidates(2));
    }
}
