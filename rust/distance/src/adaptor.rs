use vsearch_bitpack::PackingStrategy;
use vsearch_codec::ScaledBiasedVector;

use crate::traits::Distance;

/// Adapts any `Distance` functor, which normally takes a raw `f32` query,
/// into one usable for construction-time distances between two already
/// quantized vectors: `fix_argument` decodes the left-hand side once,
/// `compute` decodes the right-hand side per call.
///
/// If the dataset had a global mean removed before compression, pass it
/// as `mean` so the decoded left-hand side (which is itself
/// mean-subtracted) is restored to the original space before being
/// handed to `inner.fix_argument` — otherwise a biased inner functor
/// would subtract the mean a second time.
#[derive(Clone)]
pub struct DecompressionAdaptor<D: Distance> {
    inner: D,
    mean: Option<Vec<f32>>,
}

impl<D: Distance> DecompressionAdaptor<D> {
    pub fn new(inner: D) -> Self {
        DecompressionAdaptor { inner, mean: None }
    }

    pub fn with_mean(inner: D, mean: Vec<f32>) -> Self {
        DecompressionAdaptor {
            inner,
            mean: Some(mean),
        }
    }

    pub fn fix_argument<S: PackingStrategy>(&mut self, lhs: &ScaledBiasedVector<S>) {
        let mut decoded = lhs.decode_all();
        if let Some(mean) = &self.mean {
            for (d, m) in decoded.iter_mut().zip(mean) {
                *d += m;
            }
        }
        self.inner.fix_argument(&decoded);
    }

    pub fn compute<S: PackingStrategy>(&self, rhs: &ScaledBiasedVector<S>) -> f32 {
        self.inner.compute(&rhs.decode_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::distance_raw;
    use vsearch_bitpack::Linear;
    use vsearch_codec::one_level_compress;
    use vsearch_types::DistanceFunction;

    #[derive(Clone)]
    struct RawDistance {
        metric: DistanceFunction,
        query: Vec<f32>,
    }
    impl Distance for RawDistance {
        fn fix_argument(&mut self, query: &[f32]) {
            self.query = query.to_vec();
        }
        fn compute(&self, datum: &[f32]) -> f32 {
            distance_raw(self.metric, &self.query, datum)
        }
    }

    #[test]
    fn adaptor_matches_direct_compressed_distance() {
        let a = vec![1.0f32, 2.0, 3.0];
        let b = vec![1.5f32, 1.8, 3.2];
        let ca = one_level_compress(&a, 8, Linear).unwrap();
        let cb = one_level_compress(&b, 8, Linear).unwrap();

        let mut adaptor = DecompressionAdaptor::new(RawDistance {
            metric: DistanceFunction::Euclidean,
            query: Vec::new(),
        });
        adaptor.fix_argument(&ca);
        let via_adaptor = adaptor.compute(&cb);

        let direct = distance_raw(DistanceFunction::Euclidean, &ca.decode_all(), &cb.decode_all());
        assert_eq!(via_adaptor, direct);
    }
}
