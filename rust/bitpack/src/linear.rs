use crate::strategy::{read_field, write_field, PackingStrategy};

/// Packs fields back-to-back: element `i` occupies bits
/// `[i*bits, (i+1)*bits)` of the flat byte stream. `logical_to_linear` is
/// the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Linear;

impl PackingStrategy for Linear {
    fn storage_bytes(&self, bits: u8, length: usize) -> usize {
        (bits as usize * length).div_ceil(8)
    }

    fn logical_to_linear(&self, i: usize) -> usize {
        i
    }

    fn linear_to_logical(&self, j: usize) -> usize {
        j
    }

    fn get_linear(&self, bytes: &[u8], bits: u8, j: usize) -> u32 {
        read_field(bytes, j * bits as usize, bits)
    }

    fn set_linear(&self, bytes: &mut [u8], bits: u8, j: usize, value: u32) {
        write_field(bytes, j * bits as usize, bits, value);
    }

    fn bulk_unpack(&self, bytes: &[u8], bits: u8, length: usize, out: &mut [u32]) {
        // Shift-and-mask fan-out: walk the byte stream once, extracting
        // every field in order rather than recomputing a byte offset per
        // element via `get_linear`.
        let mask = (1u32 << bits) - 1;
        let mut bit_pos = 0usize;
        for slot in out.iter_mut().take(length) {
            *slot = read_field(bytes, bit_pos, bits) & mask;
            bit_pos += bits as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;

    #[test]
    fn s2_linear_5bit_eight_cells() {
        let strategy = Linear;
        let values = [0u32, 31, 1, 30, 2, 29, 3, 28];
        let enc = Encoding::unsigned(5);
        let bytes_len = strategy.storage_bytes(5, 8);
        assert_eq!(bytes_len, 5);
        let mut bytes = vec![0u8; bytes_len];
        for (i, &v) in values.iter().enumerate() {
            strategy.set_linear(&mut bytes, 5, strategy.logical_to_linear(i), v);
        }
        for (i, &v) in values.iter().enumerate() {
            let stored = strategy.get_linear(&bytes, 5, strategy.logical_to_linear(i));
            assert_eq!(stored, v);
            assert_eq!(enc.decode(stored), v as i32);
        }
    }

    #[test]
    fn bulk_unpack_matches_scalar_get() {
        let strategy = Linear;
        for bits in 3..=8u8 {
            let len = 37;
            let storage = strategy.storage_bytes(bits, len);
            let mut bytes = vec![0u8; storage];
            let values: Vec<u32> = (0..len).map(|i| (i as u32) % (1 << bits)).collect();
            for (i, &v) in values.iter().enumerate() {
                strategy.set_linear(&mut bytes, bits, i, v);
            }
            let mut unpacked = vec![0u32; len];
            strategy.bulk_unpack(&bytes, bits, len, &mut unpacked);
            for i in 0..len {
                assert_eq!(unpacked[i], strategy.get_linear(&bytes, bits, i));
            }
        }
    }
}
