use vsearch_types::DistanceFunction;

use crate::compute::distance_raw;
use crate::traits::Distance;

/// Wraps a raw metric over data that had a per-dimension global mean
/// subtracted at compression time (`vsearch_codec::bias::extract_global_bias`).
/// `fix_argument` folds the mean into the query once so `compute` can run
/// directly against the still-centered stored data, preserving
/// `dist_original(q, x) == dist_modified(q, x - mean)` without touching
/// compressed data.
#[derive(Clone)]
pub struct BiasedDistance {
    metric: DistanceFunction,
    mean: Vec<f32>,
    /// For `Euclidean`: `q - mean`, used directly as the fixed query.
    /// For `InnerProduct`/`Cosine`: the original query, plus `q . mean`
    /// cached separately.
    query: Vec<f32>,
    query_dot_mean: f32,
}

impl BiasedDistance {
    pub fn new(metric: DistanceFunction, mean: Vec<f32>) -> Self {
        BiasedDistance {
            metric,
            mean,
            query: Vec::new(),
            query_dot_mean: 0.0,
        }
    }
}

impl Distance for BiasedDistance {
    fn fix_argument(&mut self, query: &[f32]) {
        match self.metric {
            DistanceFunction::Euclidean => {
                self.query = query.iter().zip(&self.mean).map(|(&q, &m)| q - m).collect();
            }
            DistanceFunction::InnerProduct | DistanceFunction::Cosine => {
                self.query = query.to_vec();
                self.query_dot_mean = query.iter().zip(&self.mean).map(|(&q, &m)| q * m).sum();
            }
        }
    }

    fn compute(&self, datum: &[f32]) -> f32 {
        match self.metric {
            DistanceFunction::Euclidean => distance_raw(self.metric, &self.query, datum),
            DistanceFunction::InnerProduct | DistanceFunction::Cosine => {
                let centered_ip: f32 = self.query.iter().zip(datum).map(|(&q, &d)| q * d).sum();
                1.0 - (self.query_dot_mean + centered_ip)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_with_bias_matches_unbiased_on_reconstructed_data() {
        let mean = vec![1.0, 2.0, 3.0];
        let original = vec![4.0, 6.0, 3.0];
        let centered: Vec<f32> = original.iter().zip(&mean).map(|(&o, &m)| o - m).collect();

        let mut biased = BiasedDistance::new(DistanceFunction::Euclidean, mean.clone());
        let query = vec![1.0, 2.0, 3.0];
        biased.fix_argument(&query);
        let via_bias = biased.compute(&centered);

        let direct = distance_raw(DistanceFunction::Euclidean, &query, &original);
        assert!((via_bias - direct).abs() < 1e-4);
    }

    #[test]
    fn inner_product_with_bias_matches_unbiased() {
        let mean = vec![0.5, 0.5];
        let original = vec![2.0, 3.0];
        let centered: Vec<f32> = original.iter().zip(&mean).map(|(&o, &m)| o - m).collect();

        let mut biased = BiasedDistance::new(DistanceFunction::InnerProduct, mean.clone());
        let query = vec![1.0, 1.0];
        biased.fix_argument(&query);
        let via_bias = biased.compute(&centered);

        let direct = distance_raw(DistanceFunction::InnerProduct, &query, &original);
        assert!((via_bias - direct).abs() < 1e-4);
    }
}
