use std::sync::Mutex;

use vsearch_concurrency::ThreadPool;

use crate::error::CompressionError;

/// Computes the per-dimension mean of `dataset` (one `&[f32]` per vector,
/// all of the same length), parallelizing over `pool`.
///
/// Returns the mean vector; callers re-apply it via a distance-preserving
/// wrapper at query time (see `vsearch-distance`'s biased distance
/// functors) rather than by mutating the dataset back.
pub fn extract_global_bias(dataset: &[&[f32]], pool: &dyn ThreadPool) -> Result<Vec<f32>, CompressionError> {
    let dim = dataset.first().ok_or(CompressionError::EmptyDataset)?.len();
    for v in dataset {
        if v.len() != dim {
            return Err(CompressionError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
    }

    let sums = Mutex::new(vec![0.0f64; dim]);
    pool.run(dataset.len(), &|partition| {
        let mut local = vec![0.0f64; dim];
        for v in &dataset[partition.start..partition.end] {
            for (d, &x) in v.iter().enumerate() {
                local[d] += x as f64;
            }
        }
        let mut sums = sums.lock().expect("bias accumulator mutex is never poisoned");
        for (d, s) in local.into_iter().enumerate() {
            sums[d] += s;
        }
    });

    let n = dataset.len() as f64;
    let sums = sums.into_inner().expect("bias accumulator mutex is never poisoned");
    Ok(sums.into_iter().map(|s| (s / n) as f32).collect())
}

/// Subtracts `bias` from every dimension of `vector`, returning a new
/// owned vector. Mirrors the `ScaleShift` pre-op's element-wise
/// `scale[i] * (x[i] + shift[i])` with `scale = 1`, `shift = -bias`.
pub fn remove_bias(vector: &[f32], bias: &[f32]) -> Vec<f32> {
    vector.iter().zip(bias).map(|(&x, &b)| x - b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_concurrency::RayonThreadPool;

    #[test]
    fn mean_of_constant_dataset() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [3.0f32, 4.0, 5.0];
        let dataset: Vec<&[f32]> = vec![&a, &b];
        let pool = RayonThreadPool::with_size(2);
        let mean = extract_global_bias(&dataset, &pool).unwrap();
        assert_eq!(mean, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn mean_matches_single_threaded_result() {
        let rows: Vec<Vec<f32>> = (0..50).map(|i| vec![i as f32, (i * 2) as f32]).collect();
        let dataset: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        let single = RayonThreadPool::with_size(1);
        let many = RayonThreadPool::with_size(8);
        let a = extract_global_bias(&dataset, &single).unwrap();
        let b = extract_global_bias(&dataset, &many).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_dims_rejected() {
        let a = [1.0f32, 2.0];
        let b = [1.0f32, 2.0, 3.0];
        let dataset: Vec<&[f32]> = vec![&a, &b];
        let pool = RayonThreadPool::with_size(2);
        assert!(extract_global_bias(&dataset, &pool).is_err());
    }
}
