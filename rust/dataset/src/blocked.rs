use half::f16;
use vsearch_bitpack::{CompressedVector, PackingStrategy};

use crate::datum::DatumRef;
use crate::error::DatasetError;

const DEFAULT_BLOCK_SIZE: usize = 1024;

struct Block {
    data: Vec<u8>,
    scales: Vec<f16>,
    biases: Vec<f16>,
}

impl Block {
    fn new(capacity: usize, vector_bytes: usize) -> Self {
        Block {
            data: Vec::with_capacity(capacity * vector_bytes),
            scales: Vec::with_capacity(capacity),
            biases: Vec::with_capacity(capacity),
        }
    }
}

/// A growable dataset backed by fixed-size blocks of `block_size`
/// vectors each, so that `resize`/`append`/`erase_at` never reallocate or
/// move vectors already stored in earlier blocks. Used by dynamic
/// indices, whose ID map — not this container — tracks which slots are
/// logically live after `erase_at`.
pub struct BlockedDataset<S: PackingStrategy> {
    blocks: Vec<Block>,
    block_size: usize,
    len: usize,
    dim: usize,
    bits: u8,
    strategy: S,
    vector_bytes: usize,
}

impl<S: PackingStrategy> BlockedDataset<S> {
    pub fn new(dim: usize, bits: u8, strategy: S) -> Self {
        Self::with_block_size(dim, bits, strategy, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(dim: usize, bits: u8, strategy: S, block_size: usize) -> Self {
        let vector_bytes = strategy.storage_bytes(bits, dim);
        BlockedDataset {
            blocks: Vec::new(),
            block_size: block_size.max(1),
            len: 0,
            dim,
            bits,
            strategy,
            vector_bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.len
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    fn locate(&self, i: usize) -> (usize, usize) {
        (i / self.block_size, i % self.block_size)
    }

    fn ensure_block(&mut self, block_idx: usize) {
        while self.blocks.len() <= block_idx {
            self.blocks.push(Block::new(self.block_size, self.vector_bytes));
        }
    }

    /// Appends a vector, growing the dataset by one and allocating a new
    /// block if the current last block is full. Returns the new entry's
    /// index.
    pub fn append(&mut self, packed: &[u8], scale: f32, bias: f32) -> Result<usize, DatasetError> {
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        let i = self.len;
        let (block_idx, _) = self.locate(i);
        self.ensure_block(block_idx);
        let block = &mut self.blocks[block_idx];
        block.data.extend_from_slice(packed);
        block.scales.push(f16::from_f32(scale));
        block.biases.push(f16::from_f32(bias));
        self.len += 1;
        Ok(i)
    }

    /// Zeroes the slot's packed bytes and scale/bias. The slot remains
    /// physically present — `size()` is unchanged — until `compact()`
    /// (at the index layer) renumbers live entries.
    pub fn erase_at(&mut self, i: usize) -> Result<(), DatasetError> {
        if i >= self.len {
            return Err(DatasetError::OutOfRange { index: i, size: self.len });
        }
        let (block_idx, offset) = self.locate(i);
        let block = &mut self.blocks[block_idx];
        let start = offset * self.vector_bytes;
        block.data[start..start + self.vector_bytes].fill(0);
        block.scales[offset] = f16::from_f32(1.0);
        block.biases[offset] = f16::from_f32(0.0);
        Ok(())
    }

    pub fn get_datum(&self, i: usize) -> Result<DatumRef<'_, S>, DatasetError> {
        if i >= self.len {
            return Err(DatasetError::OutOfRange { index: i, size: self.len });
        }
        let (block_idx, offset) = self.locate(i);
        let block = &self.blocks[block_idx];
        let start = offset * self.vector_bytes;
        let view = CompressedVector::new(
            &block.data[start..start + self.vector_bytes],
            self.dim,
            vsearch_bitpack::Encoding::unsigned(self.bits),
            self.strategy.clone(),
        );
        Ok(DatumRef {
            scale: block.scales[offset].to_f32(),
            bias: block.biases[offset].to_f32(),
            view,
        })
    }

    pub fn set_datum(&mut self, i: usize, packed: &[u8], scale: f32, bias: f32) -> Result<(), DatasetError> {
        if i >= self.len {
            return Err(DatasetError::OutOfRange { index: i, size: self.len });
        }
        if packed.len() != self.vector_bytes {
            return Err(DatasetError::DimensionMismatch {
                expected: self.vector_bytes,
                actual: packed.len(),
            });
        }
        let (block_idx, offset) = self.locate(i);
        let block = &mut self.blocks[block_idx];
        let start = offset * self.vector_bytes;
        block.data[start..start + self.vector_bytes].copy_from_slice(packed);
        block.scales[offset] = f16::from_f32(scale);
        block.biases[offset] = f16::from_f32(bias);
        Ok(())
    }

    /// Rewrites the dataset in place so that new slot `new_i` holds the
    /// vector currently at `permutation[new_i]`. `permutation` must be a
    /// bijection on `0..size()`; entries for slots the caller means to
    /// drop should simply not appear as a target (the dataset is then
    /// truncated to `permutation.len()`).
    pub fn compact_in_place(&mut self, permutation: &[u32]) -> Result<(), DatasetError> {
        if permutation.len() > self.len {
            return Err(DatasetError::PermutationLengthMismatch {
                expected: self.len,
                actual: permutation.len(),
            });
        }

        let mut new_data = Vec::with_capacity(permutation.len() * self.vector_bytes);
        let mut new_scales = Vec::with_capacity(permutation.len());
        let mut new_biases = Vec::with_capacity(permutation.len());
        for &old_i in permutation {
            let old_i = old_i as usize;
            if old_i >= self.len {
                return Err(DatasetError::OutOfRange { index: old_i, size: self.len });
            }
            let (block_idx, offset) = self.locate(old_i);
            let block = &self.blocks[block_idx];
            let start = offset * self.vector_bytes;
            new_data.extend_from_slice(&block.data[start..start + self.vector_bytes]);
            new_scales.push(block.scales[offset]);
            new_biases.push(block.biases[offset]);
        }

        self.blocks.clear();
        self.len = 0;
        for i in 0..permutation.len() {
            let (block_idx, _) = self.locate(i);
            self.ensure_block(block_idx);
            let offset_start = i * self.vector_bytes;
            let block = &mut self.blocks[block_idx];
            block
                .data
                .extend_from_slice(&new_data[offset_start..offset_start + self.vector_bytes]);
            block.scales.push(new_scales[i]);
            block.biases.push(new_biases[i]);
        }
        self.len = permutation.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_bitpack::Linear;

    #[test]
    fn append_grows_across_blocks() {
        let mut dataset = BlockedDataset::with_block_size(1, 8, Linear, 2);
        for i in 0..5u8 {
            dataset.append(&[i], 1.0, 0.0).unwrap();
        }
        assert_eq!(dataset.size(), 5);
        assert_eq!(dataset.get_datum(4).unwrap().decode(0), 4.0);
    }

    #[test]
    fn erase_zeroes_without_shrinking() {
        let mut dataset = BlockedDataset::with_block_size(1, 8, Linear, 4);
        dataset.append(&[9], 1.0, 0.0).unwrap();
        dataset.erase_at(0).unwrap();
        assert_eq!(dataset.size(), 1);
        assert_eq!(dataset.get_datum(0).unwrap().decode(0), 0.0);
    }

    #[test]
    fn compact_preserves_relative_order() {
        let mut dataset = BlockedDataset::with_block_size(1, 8, Linear, 2);
        for i in 0..4u8 {
            dataset.append(&[i * 10], 1.0, 0.0).unwrap();
        }
        // Drop slot 1, keep 0, 2, 3 in order.
        dataset.compact_in_place(&[0, 2, 3]).unwrap();
        assert_eq!(dataset.size(), 3);
        assert_eq!(dataset.get_datum(0).unwrap().decode(0), 0.0);
        assert_eq!(dataset.get_datum(1).unwrap().decode(0), 20.0);
        assert_eq!(dataset.get_datum(2).unwrap().decode(0), 30.0);
    }

    #[test]
    fn compact_rejects_out_of_range_source() {
        let mut dataset = BlockedDataset::with_block_size(1, 8, Linear, 2);
        dataset.append(&[1], 1.0, 0.0).unwrap();
        assert!(dataset.compact_in_place(&[5]).is_err());
    }
}
