use vsearch_bitpack::{CompressedVectorMut, Encoding, PackingStrategy};

use crate::error::CompressionError;
use crate::vector::{ScaledBiasedVector, TwoLevelVector};

fn extrema(vector: &[f32]) -> (f32, f32) {
    let min = vector.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = vector.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    (min, max)
}

/// `clamp(round_ties_even(scale * value), min, max)`, matching the
/// reference compressor's rounding policy.
fn crunch(scale: f32, value: f32, min: f32, max: f32) -> f32 {
    (scale * value).round_ties_even().clamp(min, max)
}

/// One-level compression (spec §4.2.2): per-vector `min`/`max` become
/// `scale = (max-min)/(2^bits-1)`, `bias = min`. A zero-variance vector
/// (`min == max`) is not an error: `scale` is fixed at `1.0` so decoding
/// returns `bias` for every entry.
pub fn one_level_compress<S: PackingStrategy>(
    vector: &[f32],
    bits: u8,
    strategy: S,
) -> Result<ScaledBiasedVector<S>, CompressionError> {
    if vector.is_empty() {
        return Err(CompressionError::EmptyDataset);
    }
    let (min, max) = extrema(vector);
    let encoding = Encoding::unsigned(bits);
    let max_s = encoding.max() as f32;

    let (scale, bias) = if max == min {
        (1.0, min)
    } else {
        ((max - min) / max_s, min)
    };
    let compressor = if max == min { 0.0 } else { max_s / (max - min) };

    let len = vector.len();
    let mut packed = vec![0u8; strategy.storage_bytes(bits, len)];
    {
        let mut view = CompressedVectorMut::new(&mut packed, len, encoding, strategy.clone());
        for (i, &x) in vector.iter().enumerate() {
            let code = crunch(compressor, x - bias, 0.0, max_s) as i32;
            view.set(code, i).expect("crunch() clamps into range");
        }
    }
    Ok(ScaledBiasedVector::new(scale, bias, 0, packed, len, bits, strategy))
}

/// Two-level compression (spec §4.2.3): encodes the residual between the
/// original vector and the one-level primary's reconstruction, at a
/// finer `residual_bits`-wide signed step size.
pub fn two_level_compress<S: PackingStrategy>(
    vector: &[f32],
    primary_bits: u8,
    residual_bits: u8,
    strategy: S,
) -> Result<TwoLevelVector<S>, CompressionError> {
    let primary = one_level_compress(vector, primary_bits, strategy.clone())?;
    let residual_step = primary.scale() / (1u32 << residual_bits) as f32;
    let residual_encoding = Encoding::signed(residual_bits);
    let r_min = residual_encoding.min() as f32;
    let r_max = residual_encoding.max() as f32;

    let len = vector.len();
    let mut residual = vec![0u8; strategy.storage_bytes(residual_bits, len)];
    {
        let mut view = CompressedVectorMut::new(&mut residual, len, residual_encoding, strategy.clone());
        for (i, &x) in vector.iter().enumerate() {
            let delta = x - primary.decode(i);
            let code = if residual_step == 0.0 {
                0.0
            } else {
                crunch(1.0 / residual_step, delta, r_min, r_max)
            } as i32;
            view.set(code, i).expect("crunch() clamps into range");
        }
    }
    Ok(TwoLevelVector::new(primary, residual, residual_bits, strategy))
}

/// Result of [`global_one_level_compress`]: a dataset-wide `(scale,bias)`
/// pair plus one packed byte buffer per vector.
pub struct GlobalOneLevel {
    pub scale: f32,
    pub bias: f32,
    pub packed: Vec<Vec<u8>>,
    pub bits: u8,
    pub dim: usize,
}

/// Global one-level compression (spec §4.2.4): like one-level, but the
/// `scale`/`bias` pair is computed once over the whole dataset rather
/// than per vector.
pub fn global_one_level_compress<S: PackingStrategy>(
    dataset: &[&[f32]],
    bits: u8,
    strategy: S,
) -> Result<GlobalOneLevel, CompressionError> {
    let dim = dataset.first().ok_or(CompressionError::EmptyDataset)?.len();
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in dataset {
        if v.len() != dim {
            return Err(CompressionError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
        let (vmin, vmax) = extrema(v);
        min = min.min(vmin);
        max = max.max(vmax);
    }

    let encoding = Encoding::unsigned(bits);
    let max_s = encoding.max() as f32;
    let (scale, bias) = if max == min {
        (1.0, min)
    } else {
        ((max - min) / max_s, min)
    };
    let compressor = if max == min { 0.0 } else { max_s / (max - min) };

    let packed = dataset
        .iter()
        .map(|vector| {
            let mut bytes = vec![0u8; strategy.storage_bytes(bits, dim)];
            let mut view = CompressedVectorMut::new(&mut bytes, dim, encoding, strategy.clone());
            for (i, &x) in vector.iter().enumerate() {
                let code = crunch(compressor, x - bias, 0.0, max_s) as i32;
                view.set(code, i).expect("crunch() clamps into range");
            }
            bytes
        })
        .collect();

    Ok(GlobalOneLevel {
        scale,
        bias,
        packed,
        bits,
        dim,
    })
}
