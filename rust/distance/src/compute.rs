use vsearch_types::DistanceFunction;

use crate::scalar::{cosine_distance_scalar, euclidean_distance_scalar, inner_product_scalar};

pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    vector.iter().map(|x| x / (norm + 1e-32)).collect()
}

/// Computes `metric`'s distance between two raw `f32` vectors, dispatching
/// to the AVX2+FMA kernel when the binary was built with the matching
/// target features and falling back to the scalar kernel otherwise.
pub fn distance_raw(metric: DistanceFunction, a: &[f32], b: &[f32]) -> f32 {
    #[cfg(all(target_feature = "avx", target_feature = "fma"))]
    {
        use crate::distance_avx::{cosine_distance, euclidean_distance, inner_product};
        // Safety: this code path only compiles when the crate itself was
        // built with `target-feature=+avx,+fma`, so the instructions are
        // always available at runtime on the binary's target CPU.
        unsafe {
            return match metric {
                DistanceFunction::Euclidean => euclidean_distance(a, b),
                DistanceFunction::InnerProduct => inner_product(a, b),
                DistanceFunction::Cosine => cosine_distance(a, b),
            };
        }
    }
    #[cfg(not(all(target_feature = "avx", target_feature = "fma")))]
    match metric {
        DistanceFunction::Euclidean => euclidean_distance_scalar(a, b),
        DistanceFunction::InnerProduct => inner_product_scalar(a, b),
        DistanceFunction::Cosine => cosine_distance_scalar(a, b),
    }
}
