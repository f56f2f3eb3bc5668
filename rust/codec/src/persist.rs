use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vsearch_bitpack::PackingKind;
use vsearch_config::artifact::{atomic_save_toml, load_and_check_header, ArtifactHeader, ArtifactVersion};

use crate::error::CompressionError;
use crate::vector::ScaledBiasedVector;

const SCHEMA: &str = "vsearch_scaled_biased_dataset";
const MAX_VERSION: ArtifactVersion = ArtifactVersion::new(0, 0, 1);

/// An at-rest compressed dataset: `n` vectors sharing `(bits, dim,
/// packing)`, one contiguous `data.bin` blob plus parallel `scales.bin`/
/// `biases.bin` arrays, and an optional `residual.bin` for the two-level
/// form. Mirrors spec §4.2's persistence layout exactly.
pub struct ScaledBiasedDataset {
    pub bits: u8,
    pub dim: usize,
    pub len: usize,
    pub packing: PackingKind,
    pub data: Vec<u8>,
    pub scales: Vec<f32>,
    pub biases: Vec<f32>,
    pub residual: Option<ResidualLevel>,
}

pub struct ResidualLevel {
    pub bits: u8,
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "__schema__")]
    schema: String,
    #[serde(rename = "__version__")]
    version: String,
    bits: u8,
    dim: usize,
    len: usize,
    packing: String,
    residual_bits: Option<u8>,
}

impl ScaledBiasedDataset {
    pub fn from_vectors<S: vsearch_bitpack::PackingStrategy>(
        vectors: &[ScaledBiasedVector<S>],
        packing: PackingKind,
    ) -> Result<Self, CompressionError> {
        let first = vectors.first().ok_or(CompressionError::EmptyDataset)?;
        let dim = first.len();
        let bits = first.bits;
        let vector_bytes = packing.storage_bytes(bits, dim);

        let mut data = Vec::with_capacity(vector_bytes * vectors.len());
        let mut scales = Vec::with_capacity(vectors.len());
        let mut biases = Vec::with_capacity(vectors.len());
        for v in vectors {
            if v.len() != dim {
                return Err(CompressionError::DimensionMismatch {
                    expected: dim,
                    actual: v.len(),
                });
            }
            data.extend_from_slice(&v.packed);
            scales.push(v.scale());
            biases.push(v.bias());
        }

        Ok(ScaledBiasedDataset {
            bits,
            dim,
            len: vectors.len(),
            packing,
            data,
            scales,
            biases,
            residual: None,
        })
    }
}

pub fn save_scaled_biased_dataset(dir: &Path, dataset: &ScaledBiasedDataset) -> Result<(), CompressionError> {
    fs::create_dir_all(dir).map_err(|e| CompressionError::Io(e.to_string()))?;

    fs::write(dir.join("data.bin"), &dataset.data).map_err(|e| CompressionError::Io(e.to_string()))?;
    fs::write(dir.join("scales.bin"), f32_slice_to_le_bytes(&dataset.scales))
        .map_err(|e| CompressionError::Io(e.to_string()))?;
    fs::write(dir.join("biases.bin"), f32_slice_to_le_bytes(&dataset.biases))
        .map_err(|e| CompressionError::Io(e.to_string()))?;
    if let Some(residual) = &dataset.residual {
        fs::write(dir.join("residual.bin"), &residual.data).map_err(|e| CompressionError::Io(e.to_string()))?;
    }

    let config = ConfigFile {
        schema: SCHEMA.to_string(),
        version: MAX_VERSION.to_string(),
        bits: dataset.bits,
        dim: dataset.dim,
        len: dataset.len,
        packing: dataset.packing.name().to_string(),
        residual_bits: dataset.residual.as_ref().map(|r| r.bits),
    };
    atomic_save_toml(&dir.join("svs_config.toml"), &config)?;
    Ok(())
}

pub fn load_scaled_biased_dataset(dir: &Path) -> Result<ScaledBiasedDataset, CompressionError> {
    let header: ArtifactHeader = load_and_check_header(&dir.join("svs_config.toml"), SCHEMA, MAX_VERSION)?;
    let _ = header; // Validated above; the typed fields below come from a second parse.

    let contents = fs::read_to_string(dir.join("svs_config.toml")).map_err(|e| CompressionError::Io(e.to_string()))?;
    let config: ConfigFile = toml::from_str(&contents).map_err(|e| CompressionError::Io(e.to_string()))?;
    let packing = PackingKind::parse(&config.packing).ok_or_else(|| CompressionError::SchemaMismatch {
        expected: "one of the known packing kinds".to_string(),
        found: config.packing.clone(),
    })?;

    let data = fs::read(dir.join("data.bin")).map_err(|e| CompressionError::Io(e.to_string()))?;
    let scales = f32_slice_from_le_bytes(&fs::read(dir.join("scales.bin")).map_err(|e| CompressionError::Io(e.to_string()))?);
    let biases = f32_slice_from_le_bytes(&fs::read(dir.join("biases.bin")).map_err(|e| CompressionError::Io(e.to_string()))?);

    let residual = match config.residual_bits {
        Some(bits) => {
            let data = fs::read(dir.join("residual.bin")).map_err(|e| CompressionError::Io(e.to_string()))?;
            Some(ResidualLevel { bits, data })
        }
        None => None,
    };

    Ok(ScaledBiasedDataset {
        bits: config.bits,
        dim: config.dim,
        len: config.len,
        packing,
        data,
        scales,
        biases,
        residual,
    })
}

fn f32_slice_to_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn f32_slice_from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::one_level_compress;
    use vsearch_bitpack::Linear;
    use vsearch_error::VectorSearchError;

    #[test]
    fn save_then_load_round_trips() {
        let v1 = one_level_compress(&[1.0, 2.0, 3.0, 4.0], 8, Linear).unwrap();
        let v2 = one_level_compress(&[5.0, 6.0, 7.0, 8.0], 8, Linear).unwrap();
        let dataset = ScaledBiasedDataset::from_vectors(&[v1, v2], PackingKind::Linear).unwrap();

        let dir = tempfile::tempdir().unwrap();
        save_scaled_biased_dataset(dir.path(), &dataset).unwrap();
        let loaded = load_scaled_biased_dataset(dir.path()).unwrap();

        assert_eq!(loaded.bits, 8);
        assert_eq!(loaded.dim, 4);
        assert_eq!(loaded.len, 2);
        assert_eq!(loaded.data, dataset.data);
        assert_eq!(loaded.scales.len(), 2);
    }

    #[test]
    fn load_missing_directory_reports_io_error_not_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        let err = load_scaled_biased_dataset(&missing).unwrap_err();
        assert_eq!(err.code(), vsearch_error::ErrorCode::IOError);
        assert!(matches!(err, CompressionError::Io(_)));
    }

    #[test]
    fn load_wrong_schema_reports_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let header = ArtifactHeader::new("some_other_schema", MAX_VERSION);
        atomic_save_toml(&dir.path().join("svs_config.toml"), &header).unwrap();

        let err = load_scaled_biased_dataset(dir.path()).unwrap_err();
        assert_eq!(err.code(), vsearch_error::ErrorCode::SchemaMismatch);
        assert!(matches!(err, CompressionError::SchemaMismatch { .. }));
    }

    #[test]
    fn load_newer_version_reports_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let too_new = ArtifactVersion::new(MAX_VERSION.major + 1, 0, 0);
        let header = ArtifactHeader::new(SCHEMA, too_new);
        atomic_save_toml(&dir.path().join("svs_config.toml"), &header).unwrap();

        let err = load_scaled_biased_dataset(dir.path()).unwrap_err();
        assert_eq!(err.code(), vsearch_error::ErrorCode::VersionMismatch);
        assert!(matches!(err, CompressionError::VersionMismatch { .. }));
    }
}
