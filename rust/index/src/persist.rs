//! Directory-based persistence for [`VamanaIndex`]: a `svs_config.toml`
//! header (§6.1's artifact format, shared with the dataset and
//! search-parameter artifacts) plus two flat binary sidecars holding the
//! vector rows and the adjacency lists. Mirrors
//! `vsearch_dataset::persist`'s save/load pair rather than living as
//! methods on the index type itself.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vsearch_config::artifact::{atomic_save_toml, load_and_check_header, ArtifactHeader, ArtifactVersion};
use vsearch_graph::{Graph, SearchBufferConfig, VamanaSearchParameters};
use vsearch_types::{DistanceFunction, PointId};

use crate::error::IndexError;
use crate::id_map::IdMap;
use crate::store::VectorStore;
use crate::vamana::{VamanaBuildParameters, VamanaIndex};

const SCHEMA: &str = "vamana_index";
const VERSION: ArtifactVersion = ArtifactVersion::new(0, 0, 1);
const CONFIG_FILE: &str = "svs_config.toml";
const VECTORS_FILE: &str = "vectors.bin";
const GRAPH_FILE: &str = "graph.bin";

#[derive(Serialize, Deserialize)]
struct Manifest {
    #[serde(rename = "__schema__")]
    schema: String,
    #[serde(rename = "__version__")]
    version: String,
    dim: usize,
    metric: DistanceFunction,
    alpha: f32,
    max_degree: usize,
    search_window_size: usize,
    entry_point: Option<u32>,
    capacity: usize,
    /// Parallel arrays: `id_slots[i]` holds external id `id_values[i]`.
    id_slots: Vec<u32>,
    id_values: Vec<u64>,
}

fn io_err<E: std::fmt::Display>(e: E) -> IndexError {
    IndexError::Io(e.to_string())
}

/// Writes `index` to `dir`, creating it if necessary. The config file is
/// saved last-writer-atomic via [`atomic_save_toml`]; the sidecars are
/// plain little-endian dumps with no header, so a reader only trusts them
/// once the config file (written after) is present and valid.
pub fn save(dir: &Path, index: &VamanaIndex) -> Result<(), IndexError> {
    fs::create_dir_all(dir).map_err(io_err)?;

    let capacity = index.store.size();
    let (id_slots, id_values): (Vec<u32>, Vec<u64>) = index.id_map.entries().into_iter().map(|(slot, id)| (slot, id.0)).unzip();

    let mut vector_bytes = Vec::with_capacity(capacity * index.store.dimensions() * 4);
    for slot in 0..capacity {
        for &component in index.store.get(slot)? {
            vector_bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    fs::write(dir.join(VECTORS_FILE), vector_bytes).map_err(io_err)?;

    let mut graph_bytes = Vec::new();
    for slot in 0..capacity as u32 {
        let neighbors = index.graph.neighbors(slot)?;
        graph_bytes.extend_from_slice(&(neighbors.len() as u32).to_le_bytes());
        for &n in neighbors {
            graph_bytes.extend_from_slice(&n.to_le_bytes());
        }
    }
    fs::write(dir.join(GRAPH_FILE), graph_bytes).map_err(io_err)?;

    let manifest = Manifest {
        schema: SCHEMA.to_string(),
        version: VERSION.to_string(),
        dim: index.store.dimensions(),
        metric: index.metric,
        alpha: index.build_params.alpha,
        max_degree: index.build_params.max_degree,
        search_window_size: index.build_params.search_window_size,
        entry_point: index.entry_point,
        capacity,
        id_slots,
        id_values,
    };
    atomic_save_toml(&dir.join(CONFIG_FILE), &manifest).map_err(io_err)?;
    Ok(())
}

/// Loads an index previously written by [`save`]. The sidecars are
/// trusted to match `manifest.capacity`/`dim` once the header checks out;
/// a truncated or foreign sidecar fails with an `Io` error rather than
/// panicking.
pub fn load(dir: &Path) -> Result<VamanaIndex, IndexError> {
    let config_path = dir.join(CONFIG_FILE);
    load_and_check_header(&config_path, SCHEMA, VERSION).map_err(io_err)?;
    let contents = fs::read_to_string(&config_path).map_err(io_err)?;
    let manifest: Manifest = toml::from_str(&contents).map_err(io_err)?;

    let vector_bytes = fs::read(dir.join(VECTORS_FILE)).map_err(io_err)?;
    let row_bytes = manifest.dim * 4;
    if vector_bytes.len() != row_bytes * manifest.capacity {
        return Err(IndexError::Io(format!(
            "vectors.bin has {} bytes, expected {}",
            vector_bytes.len(),
            row_bytes * manifest.capacity
        )));
    }
    let mut store = VectorStore::new(manifest.dim);
    for chunk in vector_bytes.chunks(row_bytes.max(1)) {
        let row: Vec<f32> = chunk.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect();
        store.append(&row)?;
    }

    let graph_bytes = fs::read(dir.join(GRAPH_FILE)).map_err(io_err)?;
    let mut graph = Graph::new(manifest.capacity, manifest.max_degree);
    let mut cursor = 0usize;
    for slot in 0..manifest.capacity as u32 {
        let count = read_u32(&graph_bytes, &mut cursor)?;
        let neighbors: Result<Vec<u32>, IndexError> = (0..count).map(|_| read_u32(&graph_bytes, &mut cursor)).collect();
        graph.set_neighbors(slot, neighbors?)?;
    }

    if manifest.id_slots.len() != manifest.id_values.len() {
        return Err(IndexError::Io("id_slots/id_values length mismatch".to_string()));
    }
    let id_map = IdMap::restore(
        manifest.capacity,
        manifest
            .id_slots
            .into_iter()
            .zip(manifest.id_values)
            .map(|(slot, id)| (slot, PointId(id)))
            .collect(),
    );

    let build_params = VamanaBuildParameters::new(manifest.alpha, manifest.max_degree, manifest.search_window_size);
    let search_params = VamanaSearchParameters::new(SearchBufferConfig::exact(manifest.search_window_size), false, 4, 1);

    Ok(VamanaIndex {
        id_map,
        store,
        graph,
        metric: manifest.metric,
        entry_point: manifest.entry_point,
        build_params,
        search_params,
    })
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, IndexError> {
    let end = *cursor + 4;
    let word = bytes
        .get(*cursor..end)
        .ok_or_else(|| IndexError::Io("graph.bin truncated".to_string()))?;
    *cursor = end;
    Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicIndex;

    fn sample_index() -> VamanaIndex {
        let mut index = VamanaIndex::new(2, DistanceFunction::Euclidean, VamanaBuildParameters::new(1.2, 4, 16));
        let points: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32, 0.0]).collect();
        let ids: Vec<PointId> = (0..20).map(|i| PointId(i as u64)).collect();
        index.add_points(&points, &ids, false).unwrap();
        index.delete_points(&[PointId(5)]).unwrap();
        index
    }

    #[test]
    fn save_then_load_round_trips_search_results() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &index).unwrap();

        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.dimensions(), index.dimensions());
        assert!(!loaded.has_id(PointId(5)));
        assert!(loaded.has_id(PointId(10)));

        let before = index.search(&[10.0, 0.0], 3).unwrap();
        let after = loaded.search(&[10.0, 0.0], 3).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn load_rejects_mismatched_schema() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &index).unwrap();

        let bogus = ArtifactHeader::new("not_vamana_index", VERSION);
        let contents = toml::to_string_pretty(&bogus).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), contents).unwrap();

        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn load_rejects_truncated_vectors_sidecar() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &index).unwrap();
        fs::write(dir.path().join(VECTORS_FILE), vec![0u8; 3]).unwrap();

        assert!(load(dir.path()).is_err());
    }
}
