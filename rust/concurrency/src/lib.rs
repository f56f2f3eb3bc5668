//! Externally-provided thread pool abstraction (spec §5): the core is
//! single-threaded at the query level, but bulk operations (compression,
//! calibration, batch search, index construction) parallelize over
//! disjoint partitions of the work through this trait rather than
//! reaching for a global thread pool directly. Living in its own crate
//! lets both `vsearch-codec` and `vsearch-graph` depend on it without
//! either depending on `vsearch-index`.

/// A half-open partition `[start, end)` of a larger unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Splits `total` items into `size()` roughly-equal, disjoint partitions.
///
/// `run` takes `f` as a `&dyn Fn` rather than a generic parameter so this
/// trait stays object-safe — callers hold an injected `&dyn ThreadPool`
/// rather than being generic over the pool implementation.
pub trait ThreadPool: Send + Sync {
    fn size(&self) -> usize;

    /// Runs `f` once per partition of `total` items, across this pool's
    /// threads. Partition count never exceeds `size()` or `total`.
    fn run(&self, total: usize, f: &(dyn Fn(Partition) + Send + Sync));
}

pub fn partitions(total: usize, workers: usize) -> Vec<Partition> {
    let workers = workers.max(1).min(total.max(1));
    let base = total / workers;
    let remainder = total % workers;
    let mut out = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let extra = if i < remainder { 1 } else { 0 };
        let end = start + base + extra;
        if start < end {
            out.push(Partition { start, end });
        }
        start = end;
    }
    out
}

/// Default, rayon-backed pool sized to the global rayon thread pool.
pub struct RayonThreadPool {
    size: usize,
}

impl RayonThreadPool {
    pub fn new() -> Self {
        RayonThreadPool {
            size: rayon::current_num_threads(),
        }
    }

    pub fn with_size(size: usize) -> Self {
        RayonThreadPool { size: size.max(1) }
    }
}

impl Default for RayonThreadPool {
    fn default() -> Self {
        RayonThreadPool::new()
    }
}

impl ThreadPool for RayonThreadPool {
    fn size(&self) -> usize {
        self.size
    }

    fn run(&self, total: usize, f: &(dyn Fn(Partition) + Send + Sync)) {
        use rayon::prelude::*;
        partitions(total, self.size).into_par_iter().for_each(|p| f(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn partitions_cover_all_items_disjointly() {
        let parts = partitions(10, 3);
        let total: usize = parts.iter().map(|p| p.len()).sum();
        assert_eq!(total, 10);
        for window in parts.windows(2) {
            assert_eq!(window[0].end, window[1].start);
        }
    }

    #[test]
    fn partitions_never_exceed_total_items() {
        let parts = partitions(2, 8);
        assert!(parts.len() <= 2);
    }

    #[test]
    fn rayon_pool_runs_every_partition() {
        let pool = RayonThreadPool::with_size(4);
        let covered = AtomicUsize::new(0);
        pool.run(37, &|p| {
            covered.fetch_add(p.len(), Ordering::Relaxed);
        });
        assert_eq!(covered.load(Ordering::Relaxed), 37);
    }
}
