//! Block-allocated storage for raw `f32` vectors, mirroring
//! `vsearch_dataset::BlockedDataset`'s growth idiom (fixed-size blocks so
//! earlier rows never move) but holding full-precision rows directly.
//! `FlatIndex`/`VamanaIndex`/`IvfIndex` all read exact vectors through
//! this store; callers wanting LVQ-quantized storage instead wire
//! `vsearch-dataset`'s containers through the same distance-closure
//! contract that `vsearch-graph` expects.

use crate::error::IndexError;

const DEFAULT_BLOCK_SIZE: usize = 1024;

struct Block {
    data: Vec<f32>,
}

impl Block {
    fn new(capacity: usize, dim: usize) -> Self {
        Block {
            data: Vec::with_capacity(capacity * dim),
        }
    }
}

pub struct VectorStore {
    blocks: Vec<Block>,
    block_size: usize,
    len: usize,
    dim: usize,
}

impl VectorStore {
    pub fn new(dim: usize) -> Self {
        Self::with_block_size(dim, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(dim: usize, block_size: usize) -> Self {
        VectorStore {
            blocks: Vec::new(),
            block_size: block_size.max(1),
            len: 0,
            dim,
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
            self.blocks.push(Block::new(self.block_size, self.dim));
        }
    }

    fn check_dim(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    pub fn append(&mut self, vector: &[f32]) -> Result<usize, IndexError> {
        self.check_dim(vector)?;
        let i = self.len;
        let (block_idx, _) = self.locate(i);
        self.ensure_block(block_idx);
        self.blocks[block_idx].data.extend_from_slice(vector);
        self.len += 1;
        Ok(i)
    }

    /// Zeroes a slot's storage. `size()` is unchanged; renumbering happens
    /// only at `compact_in_place`, matching `BlockedDataset::erase_at`.
    pub fn erase_at(&mut self, i: usize) -> Result<(), IndexError> {
        self.bounds_check(i)?;
        let (block_idx, offset) = self.locate(i);
        let start = offset * self.dim;
        self.blocks[block_idx].data[start..start + self.dim].fill(0.0);
        Ok(())
    }

    fn bounds_check(&self, i: usize) -> Result<(), IndexError> {
        if i >= self.len {
            return Err(IndexError::DimensionMismatch {
                expected: self.len,
                actual: i,
            });
        }
        Ok(())
    }

    pub fn get(&self, i: usize) -> Result<&[f32], IndexError> {
        self.bounds_check(i)?;
        let (block_idx, offset) = self.locate(i);
        let start = offset * self.dim;
        Ok(&self.blocks[block_idx].data[start..start + self.dim])
    }

    pub fn set(&mut self, i: usize, vector: &[f32]) -> Result<(), IndexError> {
        self.bounds_check(i)?;
        self.check_dim(vector)?;
        let (block_idx, offset) = self.locate(i);
        let start = offset * self.dim;
        self.blocks[block_idx].data[start..start + self.dim].copy_from_slice(vector);
        Ok(())
    }

    /// Rewrites storage so new slot `new_i` holds the vector currently at
    /// `permutation[new_i]`, truncating to `permutation.len()`.
    pub fn compact_in_place(&mut self, permutation: &[u32]) -> Result<(), IndexError> {
        let mut rows = Vec::with_capacity(permutation.len());
        for &old_i in permutation {
            rows.push(self.get(old_i as usize)?.to_vec());
        }
        self.blocks.clear();
        self.len = 0;
        for row in rows {
            self.append(&row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_get_across_blocks() {
        let mut store = VectorStore::with_block_size(2, 2);
        for i in 0..5 {
            store.append(&[i as f32, (i * 2) as f32]).unwrap();
        }
        assert_eq!(store.size(), 5);
        assert_eq!(store.get(4).unwrap(), &[4.0, 8.0]);
    }

    #[test]
    fn erase_zeroes_without_shrinking() {
        let mut store = VectorStore::with_block_size(1, 4);
        store.append(&[9.0]).unwrap();
        store.erase_at(0).unwrap();
        assert_eq!(store.size(), 1);
        assert_eq!(store.get(0).unwrap(), &[0.0]);
    }

    #[test]
    fn compact_preserves_relative_order() {
        let mut store = VectorStore::with_block_size(1, 2);
        for i in 0..4 {
            store.append(&[(i * 10) as f32]).unwrap();
        }
        store.compact_in_place(&[0, 2, 3]).unwrap();
        assert_eq!(store.size(), 3);
        assert_eq!(store.get(1).unwrap(), &[20.0]);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut store = VectorStore::new(3);
        assert!(store.append(&[1.0, 2.0]).is_err());
    }
}
