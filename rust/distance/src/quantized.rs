use vsearch_bitpack::PackingStrategy;
use vsearch_codec::{ScaledBiasedVector, TwoLevelVector};
use vsearch_types::DistanceFunction;

use crate::compute::distance_raw;

/// Distance between a raw query and a one-level quantized vector.
///
/// Decodes `datum` to `f32` and runs the plain kernel. This favors a
/// small, obviously-correct implementation over a literal `(bits,
/// strategy)`-specialized unpack-and-accumulate SIMD fan-out; the packed
/// layouts in `vsearch-bitpack` already carry the bulk-unpack fast path
/// this would ride on.
pub fn quantized_distance<S: PackingStrategy>(
    metric: DistanceFunction,
    query: &[f32],
    datum: &ScaledBiasedVector<S>,
) -> f32 {
    distance_raw(metric, query, &datum.decode_all())
}

/// Distance between a raw query and a two-level (primary + residual)
/// quantized vector.
pub fn quantized_distance_two_level<S: PackingStrategy>(
    metric: DistanceFunction,
    query: &[f32],
    datum: &TwoLevelVector<S>,
) -> f32 {
    distance_raw(metric, query, &datum.decode_all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_bitpack::Linear;
    use vsearch_codec::one_level_compress;

    #[test]
    fn quantized_distance_is_close_to_exact() {
        let original = vec![1.0f32, 2.0, 3.0, 4.0, 5.0];
        let compressed = one_level_compress(&original, 8, Linear).unwrap();
        let query = vec![1.1f32, 2.1, 2.9, 4.2, 5.1];

        let exact = distance_raw(DistanceFunction::Euclidean, &query, &original);
        let quantized = quantized_distance(DistanceFunction::Euclidean, &query, &compressed);
        assert!((quantized - exact).abs() < 0.1, "quantized={quantized} exact={exact}");
    }
}
