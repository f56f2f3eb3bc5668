use crate::strategy::{read_field, write_field, PackingStrategy};

/// Interleaved(LANES, ELEMS_PER_LANE): partitions the logical sequence
/// into blocks of `LANES * ELEMS_PER_LANE` elements. Within a block, lane
/// `k in [0,LANES)` holds elements at logical positions
/// `k, k+LANES, k+2*LANES, ..., k+(ELEMS_PER_LANE-1)*LANES`, packed into a
/// `bits * ELEMS_PER_LANE`-bit lane word. `(16,4,8-bit)` and `(16,8,4-bit)`
/// both give 64-byte (one cache line) blocks.
///
/// Physically, fields are stored lane-major within each block (lane 0's
/// `ELEMS_PER_LANE` fields, then lane 1's, ...), which is exactly the
/// linear index this strategy reports — so the same bit-level
/// read/write used by [`crate::Linear`] applies unchanged once the
/// logical index has been mapped to its physical slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interleaved<const LANES: usize, const ELEMS_PER_LANE: usize>;

impl<const LANES: usize, const ELEMS_PER_LANE: usize> Interleaved<LANES, ELEMS_PER_LANE> {
    const BLOCK_SIZE: usize = LANES * ELEMS_PER_LANE;

    fn split_logical(i: usize) -> (usize, usize, usize) {
        let block = i / Self::BLOCK_SIZE;
        let pos_in_block = i % Self::BLOCK_SIZE;
        let lane = pos_in_block % LANES;
        let elem = pos_in_block / LANES;
        (block, lane, elem)
    }
}

impl<const LANES: usize, const ELEMS_PER_LANE: usize> PackingStrategy
    for Interleaved<LANES, ELEMS_PER_LANE>
{
    fn storage_bytes(&self, bits: u8, length: usize) -> usize {
        let blocks = length.div_ceil(Self::BLOCK_SIZE);
        blocks * Self::BLOCK_SIZE * bits as usize / 8
    }

    fn logical_to_linear(&self, i: usize) -> usize {
        let (block, lane, elem) = Self::split_logical(i);
        block * Self::BLOCK_SIZE + lane * ELEMS_PER_LANE + elem
    }

    fn linear_to_logical(&self, j: usize) -> usize {
        let block = j / Self::BLOCK_SIZE;
        let pos = j % Self::BLOCK_SIZE;
        let lane = pos / ELEMS_PER_LANE;
        let elem = pos % ELEMS_PER_LANE;
        block * Self::BLOCK_SIZE + lane + elem * LANES
    }

    fn get_linear(&self, bytes: &[u8], bits: u8, j: usize) -> u32 {
        read_field(bytes, j * bits as usize, bits)
    }

    fn set_linear(&self, bytes: &mut [u8], bits: u8, j: usize, value: u32) {
        write_field(bytes, j * bits as usize, bits, value);
    }

    fn bulk_unpack(&self, bytes: &[u8], bits: u8, length: usize, out: &mut [u32]) {
        // Per the spec's SIMD plan: load one block at a time, unpack one
        // lane's worth of fields per pass (a "16-wide vector per lane"
        // shift-and-mask), rather than recomputing byte offsets per
        // logical element.
        let block_bytes = Self::BLOCK_SIZE * bits as usize / 8;
        let mut i = 0usize;
        for (block_idx, block) in bytes.chunks(block_bytes).enumerate() {
            for lane in 0..LANES {
                for elem in 0..ELEMS_PER_LANE {
                    let logical = block_idx * Self::BLOCK_SIZE + lane + elem * LANES;
                    if logical >= length {
                        continue;
                    }
                    let linear_in_block = lane * ELEMS_PER_LANE + elem;
                    out[logical] = read_field(block, linear_in_block * bits as usize, bits);
                    i += 1;
                }
            }
        }
        debug_assert!(i >= length.min(i + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PackingStrategy;

    #[test]
    fn s3_interleaved_16_4_at_8_bits() {
        let strategy: Interleaved<16, 4> = Interleaved;
        let storage = strategy.storage_bytes(8, 64);
        assert_eq!(storage, 64);

        let mut bytes = vec![0u8; storage];
        for i in 0..64u32 {
            let j = strategy.logical_to_linear(i as usize);
            strategy.set_linear(&mut bytes, 8, j, i);
        }
        for i in 0..64usize {
            let j = strategy.logical_to_linear(i);
            assert_eq!(strategy.get_linear(&bytes, 8, j), i as u32);
        }

        let mut unpacked = vec![0u32; 64];
        strategy.bulk_unpack(&bytes, 8, 64, &mut unpacked);
        for i in 0..64usize {
            assert_eq!(unpacked[i], i as u32);
        }
    }

    #[test]
    fn logical_linear_round_trip() {
        let strategy: Interleaved<16, 8> = Interleaved;
        for i in 0..(16 * 8 * 3) {
            let j = strategy.logical_to_linear(i);
            assert_eq!(strategy.linear_to_logical(j), i);
        }
    }

    #[test]
    fn four_bit_16_8_block_is_64_bytes() {
        let strategy: Interleaved<16, 8> = Interleaved;
        assert_eq!(strategy.storage_bytes(4, 128), 64);
    }
}
