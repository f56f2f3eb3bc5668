//! Dispatcher, dynamic index lifecycle, and the Vamana/flat/IVF index
//! families tying together bit-packed storage (C1), LVQ codecs (C2),
//! distance kernels (C3), dataset containers (C4), and graph search (C5).

pub mod dispatch;
pub mod dynamic;
pub mod error;
pub mod flat;
pub mod id_map;
pub mod ivf;
pub mod persist;
pub mod store;
pub mod thread_pool;
pub mod vamana;

pub use dispatch::{DataType, DatasetKind, DimSpec, DispatchKey, Dispatcher, QueryType};
pub use dynamic::DynamicIndex;
pub use error::IndexError;
pub use flat::FlatIndex;
pub use id_map::IdMap;
pub use ivf::{IvfBuildParameters, IvfIndex, IvfSearchParameters};
pub use persist::{load, save};
pub use store::VectorStore;
pub use thread_pool::{Partition, RayonThreadPool, ThreadPool};
pub use vamana::{VamanaBatchSearch, VamanaBuildParameters, VamanaIndex};
