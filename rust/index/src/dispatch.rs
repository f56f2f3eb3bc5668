//! Runtime dispatch table mapping `(dataset_kind, query_type, data_type,
//! distance, dimensions)` tuples to registered targets, with a
//! dimension-agnostic fallback when no exact match exists.
//!
//! Grounded in the original's compile-time specialization table: each
//! backend calls `register_target` once at process start; lookup never
//! mutates the table, only reads it.

use std::collections::HashMap;

use vsearch_types::DistanceFunction;

use crate::error::IndexError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Flat,
    Vamana,
    Ivf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryType {
    Single,
    Batch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Float32,
    Lvq,
}

/// A fixed dimensionality, or the generic-dimension fallback
/// specialization ("dynamic" in the original).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimSpec {
    Exact(usize),
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub dataset_kind: DatasetKind,
    pub query_type: QueryType,
    pub data_type: DataType,
    pub distance: DistanceFunction,
    pub dim: DimSpec,
}

impl DispatchKey {
    pub fn new(
        dataset_kind: DatasetKind,
        query_type: QueryType,
        data_type: DataType,
        distance: DistanceFunction,
        dim: usize,
    ) -> Self {
        DispatchKey {
            dataset_kind,
            query_type,
            data_type,
            distance,
            dim: DimSpec::Exact(dim),
        }
    }

    fn as_dynamic(&self) -> Self {
        DispatchKey {
            dim: DimSpec::Dynamic,
            ..*self
        }
    }
}

impl std::fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{:?}/{}/{:?}",
            self.dataset_kind, self.query_type, self.data_type, self.distance, self.dim
        )
    }
}

/// Process-wide registration table keyed by [`DispatchKey`]. Registration
/// is expected to happen explicitly (each backend module calling
/// `register_target`) rather than via static constructors.
pub struct Dispatcher<T> {
    targets: HashMap<DispatchKey, T>,
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Dispatcher { targets: HashMap::new() }
    }
}

impl<T> Dispatcher<T> {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    pub fn register_target(&mut self, key: DispatchKey, target: T) {
        self.targets.insert(key, target);
    }

    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.targets.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DispatchKey> {
        self.targets.keys()
    }

    /// Looks up `key` exactly; if absent and `try_generic` is set, retries
    /// with `key.dim` replaced by [`DimSpec::Dynamic`]. Fails with
    /// `UnimplementedSpecialization` reporting the originally-requested key.
    pub fn lookup(&self, try_generic: bool, key: DispatchKey) -> Result<&T, IndexError> {
        if let Some(target) = self.targets.get(&key) {
            return Ok(target);
        }
        if try_generic {
            if let Some(target) = self.targets.get(&key.as_dynamic()) {
                return Ok(target);
            }
        }
        tracing::warn!(%key, try_generic, "no dispatch target registered");
        Err(IndexError::UnimplementedSpecialization(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(dim: usize) -> DispatchKey {
        DispatchKey::new(DatasetKind::Vamana, QueryType::Single, DataType::Float32, DistanceFunction::Euclidean, dim)
    }

    #[test]
    fn lookup_finds_exact_registration() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_target(key(128), "vamana-f32-128-l2");
        assert_eq!(*dispatcher.lookup(false, key(128)).unwrap(), "vamana-f32-128-l2");
    }

    #[test]
    fn lookup_falls_back_to_dynamic_dimension() {
        let mut dispatcher = Dispatcher::new();
        let mut generic_key = key(0);
        generic_key.dim = DimSpec::Dynamic;
        dispatcher.register_target(generic_key, "vamana-f32-dynamic-l2");

        assert!(dispatcher.lookup(false, key(256)).is_err());
        assert_eq!(*dispatcher.lookup(true, key(256)).unwrap(), "vamana-f32-dynamic-l2");
    }

    #[test]
    fn lookup_without_match_reports_missing_tuple() {
        let dispatcher: Dispatcher<&str> = Dispatcher::new();
        let err = dispatcher.lookup(true, key(64)).unwrap_err();
        match err {
            IndexError::UnimplementedSpecialization(msg) => assert!(msg.contains("Vamana")),
            other => panic!("expected UnimplementedSpecialization, got {other:?}"),
        }
    }
}
