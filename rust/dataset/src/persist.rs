use std::path::Path;

use vsearch_bitpack::PackingKind;
use vsearch_codec::{load_scaled_biased_dataset, save_scaled_biased_dataset, ScaledBiasedDataset};

use crate::error::DatasetError;
use crate::static_dataset::StaticPerVectorDataset;

/// Saves a static per-vector dataset to `dir`, delegating to the same
/// `svs_config.toml`/`data.bin`/`scales.bin`/`biases.bin` layout used for
/// a freshly-compressed dataset (spec §4.2's Persistence subsection).
/// Only meaningful for the concrete [`PackingKind`] instantiation, since
/// the on-disk header must record a strategy name that round-trips.
pub fn save(dir: &Path, dataset: &StaticPerVectorDataset<PackingKind>) -> Result<(), DatasetError> {
    let packed = ScaledBiasedDataset {
        bits: dataset.bits(),
        dim: dataset.dimensions(),
        len: dataset.size(),
        packing: *dataset.strategy(),
        data: dataset.data.clone(),
        scales: dataset.scales.iter().map(|s| s.to_f32()).collect(),
        biases: dataset.biases.iter().map(|b| b.to_f32()).collect(),
        residual: None,
    };
    save_scaled_biased_dataset(dir, &packed).map_err(|e| DatasetError::Io(e.to_string()))
}

pub fn load(dir: &Path) -> Result<StaticPerVectorDataset<PackingKind>, DatasetError> {
    let packed = load_scaled_biased_dataset(dir).map_err(|e| DatasetError::Io(e.to_string()))?;
    Ok(StaticPerVectorDataset::from_raw_parts(
        packed.data,
        packed.scales,
        packed.biases,
        packed.dim,
        packed.bits,
        packed.packing,
    ))
}
