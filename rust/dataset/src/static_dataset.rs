use half::f16;
use vsearch_bitpack::{CompressedVector, CompressedVectorMut, Encoding, PackingStrategy};

use crate::datum::DatumRef;
use crate::error::DatasetError;

/// A size-`N` sequence of compressed vectors sharing `(bits, dim,
/// strategy)`, each with its own `(scale, bias)` pair. Storage is one
/// contiguous byte blob plus parallel `scale`/`bias` arrays of length `N`.
pub struct StaticPerVectorDataset<S: PackingStrategy> {
    pub(crate) data: Vec<u8>,
    pub(crate) scales: Vec<f16>,
    pub(crate) biases: Vec<f16>,
    dim: usize,
    bits: u8,
    strategy: S,
    vector_bytes: usize,
}

impl<S: PackingStrategy> StaticPerVectorDataset<S> {
    pub fn with_capacity(dim: usize, bits: u8, strategy: S, capacity: usize) -> Self {
        let vector_bytes = strategy.storage_bytes(bits, dim);
        StaticPerVectorDataset {
            data: Vec::with_capacity(vector_bytes * capacity),
            scales: Vec::with_capacity(capacity),
            biases: Vec::with_capacity(capacity),
            dim,
            bits,
            strategy,
            vector_bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.scales.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Rebuilds a dataset from already-validated parts, e.g. after
    /// loading from disk. Does not re-check `data.len()` against
    /// `scales.len() * storage_bytes(bits, dim)`.
    pub fn from_raw_parts(
        data: Vec<u8>,
        scales: Vec<f32>,
        biases: Vec<f32>,
        dim: usize,
        bits: u8,
        strategy: S,
    ) -> Self {
        let vector_bytes = strategy.storage_bytes(bits, dim);
        StaticPerVectorDataset {
            data,
            scales: scales.into_iter().map(f16::from_f32).collect(),
            biases: biases.into_iter().map(f16::from_f32).collect(),
            dim,
            bits,
            strategy,
            vector_bytes,
        }
    }

    /// Appends a vector's packed bytes and scale/bias, growing the dataset
    /// by one. `packed` must be exactly `storage_bytes(bits, dim)` long.
    pub fn push(&mut self, packed: &[u8], scale: f32, bias: f32) -> Result<(), DatasetError> {
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        self.data.extend_from_slice(packed);
        self.scales.push(f16::from_f32(scale));
        self.biases.push(f16::from_f32(bias));
        Ok(())
    }

    pub fn get_datum(&self, i: usize) -> Result<DatumRef<'_, S>, DatasetError> {
        if i >= self.size() {
            return Err(DatasetError::OutOfRange { index: i, size: self.size() });
        }
        let start = i * self.vector_bytes;
        let view = CompressedVector::new(
            &self.data[start..start + self.vector_bytes],
            self.dim,
            Encoding::unsigned(self.bits),
            self.strategy.clone(),
        );
        Ok(DatumRef {
            scale: self.scales[i].to_f32(),
            bias: self.biases[i].to_f32(),
            view,
        })
    }

    pub fn set_datum(&mut self, i: usize, packed: &[u8], scale: f32, bias: f32) -> Result<(), DatasetError> {
        if i >= self.size() {
            return Err(DatasetError::OutOfRange { index: i, size: self.size() });
        }
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        let start = i * self.vector_bytes;
        self.data[start..start + self.vector_bytes].copy_from_slice(packed);
        self.scales[i] = f16::from_f32(scale);
        self.biases[i] = f16::from_f32(bias);
        Ok(())
    }
}

/// Like [`StaticPerVectorDataset`] but shares a single `(scale, bias)`
/// pair across the whole dataset, used for globally-compressed datasets
/// (spec §4.2.4).
pub struct StaticGlobalDataset<S: PackingStrategy> {
    pub(crate) data: Vec<u8>,
    pub scale: f32,
    pub bias: f32,
    dim: usize,
    bits: u8,
    strategy: S,
    vector_bytes: usize,
    len: usize,
}

impl<S: PackingStrategy> StaticGlobalDataset<S> {
    pub fn with_capacity(dim: usize, bits: u8, strategy: S, scale: f32, bias: f32, capacity: usize) -> Self {
        let vector_bytes = strategy.storage_bytes(bits, dim);
        StaticGlobalDataset {
            data: Vec::with_capacity(vector_bytes * capacity),
            scale,
            bias,
            dim,
            bits,
            strategy,
            vector_bytes,
            len: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    pub fn push(&mut self, packed: &[u8]) -> Result<(), DatasetError> {
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        self.data.extend_from_slice(packed);
        self.len += 1;
        Ok(())
    }

    pub fn get_datum(&self, i: usize) -> Result<DatumRef<'_, S>, DatasetError> {
        if i >= self.len {
            return Err(DatasetError::OutOfRange { index: i, size: self.len });
        }
        let start = i * self.vector_bytes;
        let view = CompressedVector::new(
            &self.data[start..start + self.vector_bytes],
            self.dim,
            Encoding::unsigned(self.bits),
            self.strategy.clone(),
        );
        Ok(DatumRef {
            scale: self.scale,
            bias: self.bias,
            view,
        })
    }

    pub fn set_datum(&mut self, i: usize, packed: &[u8]) -> Result<(), DatasetError> {
        if i >= self.len {
            return Err(DatasetError::OutOfRange { index: i, size: self.len });
        }
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        let start = i * self.vector_bytes;
        self.data[start..start + self.vector_bytes].copy_from_slice(packed);
        Ok(())
    }
}

#[allow(dead_code)]
fn mut_view<S: PackingStrategy>(
    bytes: &mut [u8],
    dim: usize,
    bits: u8,
    strategy: S,
) -> CompressedVectorMut<'_, S> {
    CompressedVectorMut::new(bytes, dim, Encoding::unsigned(bits), strategy)
}
