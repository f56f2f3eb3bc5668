//! Runtime search parameters, with versioned persistence: v0.0.0 lacked
//! the prefetch fields, so loading an old artifact fills them with the
//! same defaults the original schema shipped (lookahead 4, step 1).

use std::path::Path;

use serde::{Deserialize, Serialize};
use vsearch_config::artifact::{atomic_save_toml, load_and_check_header, ArtifactHeader, ArtifactVersion};

use crate::buffer::SearchBufferConfig;
use crate::error::GraphError;

const SCHEMA: &str = "vamana_search_parameters";
const SAVE_VERSION: ArtifactVersion = ArtifactVersion::new(0, 0, 1);
const LEGACY_VERSION: ArtifactVersion = ArtifactVersion::new(0, 0, 0);
const DEFAULT_PREFETCH_LOOKAHEAD: usize = 4;
const DEFAULT_PREFETCH_STEP: usize = 1;

/// Controls the accuracy/performance tradeoff of a single search call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VamanaSearchParameters {
    pub buffer_config: SearchBufferConfig,
    pub search_buffer_visited_set: bool,
    pub prefetch_lookahead: usize,
    pub prefetch_step: usize,
}

impl VamanaSearchParameters {
    pub fn new(
        buffer_config: SearchBufferConfig,
        search_buffer_visited_set: bool,
        prefetch_lookahead: usize,
        prefetch_step: usize,
    ) -> Self {
        VamanaSearchParameters {
            buffer_config,
            search_buffer_visited_set,
            prefetch_lookahead,
            prefetch_step,
        }
    }

    pub fn with_buffer_config(mut self, buffer_config: SearchBufferConfig) -> Self {
        self.buffer_config = buffer_config;
        self
    }

    pub fn with_search_buffer_visited_set(mut self, enabled: bool) -> Self {
        self.search_buffer_visited_set = enabled;
        self
    }

    pub fn with_prefetch_lookahead(mut self, lookahead: usize) -> Self {
        self.prefetch_lookahead = lookahead;
        self
    }

    pub fn with_prefetch_step(mut self, step: usize) -> Self {
        self.prefetch_step = step;
        self
    }

    pub fn save(&self, path: &Path) -> Result<(), GraphError> {
        let record = OnDiskV1 {
            header: ArtifactHeader::new(SCHEMA, SAVE_VERSION),
            search_window_size: self.buffer_config.window_size,
            search_buffer_capacity: self.buffer_config.total_capacity,
            search_buffer_visited_set: self.search_buffer_visited_set,
            prefetch_lookahead: self.prefetch_lookahead,
            prefetch_step: self.prefetch_step,
        };
        atomic_save_toml(path, &record)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let header = load_and_check_header(path, SCHEMA, SAVE_VERSION)?;
        let version = header.version()?;
        let contents = std::fs::read_to_string(path).map_err(vsearch_config::artifact::ArtifactError::Io)?;

        if version == LEGACY_VERSION {
            let legacy: OnDiskV0 = toml::from_str(&contents).map_err(vsearch_config::artifact::ArtifactError::Decode)?;
            let buffer_config =
                SearchBufferConfig::new(legacy.search_window_size, legacy.search_buffer_capacity)?;
            return Ok(VamanaSearchParameters {
                buffer_config,
                search_buffer_visited_set: legacy.search_buffer_visited_set,
                prefetch_lookahead: DEFAULT_PREFETCH_LOOKAHEAD,
                prefetch_step: DEFAULT_PREFETCH_STEP,
            });
        }

        let current: OnDiskV1 = toml::from_str(&contents).map_err(vsearch_config::artifact::ArtifactError::Decode)?;
        let buffer_config =
            SearchBufferConfig::new(current.search_window_size, current.search_buffer_capacity)?;
        Ok(VamanaSearchParameters {
            buffer_config,
            search_buffer_visited_set: current.search_buffer_visited_set,
            prefetch_lookahead: current.prefetch_lookahead,
            prefetch_step: current.prefetch_step,
        })
    }
}

impl Default for VamanaSearchParameters {
    fn default() -> Self {
        VamanaSearchParameters {
            buffer_config: SearchBufferConfig::exact(64),
            search_buffer_visited_set: false,
            prefetch_lookahead: DEFAULT_PREFETCH_LOOKAHEAD,
            prefetch_step: DEFAULT_PREFETCH_STEP,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OnDiskV1 {
    #[serde(flatten)]
    header: ArtifactHeader,
    search_window_size: usize,
    search_buffer_capacity: usize,
    search_buffer_visited_set: bool,
    prefetch_lookahead: usize,
    prefetch_step: usize,
}

#[derive(Deserialize)]
struct OnDiskV0 {
    search_window_size: usize,
    search_buffer_capacity: usize,
    search_buffer_visited_set: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        let params = VamanaSearchParameters::new(SearchBufferConfig::new(32, 64).unwrap(), true, 8, 2);
        params.save(&path).unwrap();
        let loaded = VamanaSearchParameters::load(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn loading_legacy_artifact_fills_prefetch_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        let legacy = "__schema__ = \"vamana_search_parameters\"\n__version__ = \"v0.0.0\"\nsearch_window_size = 32\nsearch_buffer_capacity = 32\nsearch_buffer_visited_set = false\n";
        std::fs::write(&path, legacy).unwrap();

        let loaded = VamanaSearchParameters::load(&path).unwrap();
        assert_eq!(loaded.prefetch_lookahead, DEFAULT_PREFETCH_LOOKAHEAD);
        assert_eq!(loaded.prefetch_step, DEFAULT_PREFETCH_STEP);
        assert_eq!(loaded.buffer_config, SearchBufferConfig::new(32, 32).unwrap());
    }
}
