//! Re-exports the externally-provided thread pool abstraction (spec §5)
//! from `vsearch-concurrency`, which both `vsearch-codec`'s bias
//! extraction and `vsearch-graph`'s calibration sweep also depend on
//! directly — keeping one shared definition instead of three.

pub use vsearch_concurrency::{partitions, Partition, RayonThreadPool, ThreadPool};
