//! Locally-adaptive Vector Quantization (LVQ): translating raw `f32`
//! vectors to and from low-bit quantized form.
//!
//! - [`bias`] computes and removes a per-dimension global mean (§4.2.1).
//! - [`compress`] implements one-level, two-level, and global one-level
//!   compression (§4.2.2-4).
//! - [`vector`] holds the [`ScaledBiasedVector`] and [`TwoLevelVector`]
//!   value types.
//! - [`persist`] serializes a compressed dataset to the directory layout
//!   from spec §6.1/§6.2.

mod bias;
mod compress;
mod error;
mod persist;
mod vector;

pub use bias::extract_global_bias;
pub use compress::{
    global_one_level_compress, one_level_compress, two_level_compress, GlobalOneLevel,
};
pub use error::CompressionError;
pub use persist::{load_scaled_biased_dataset, save_scaled_biased_dataset, ResidualLevel, ScaledBiasedDataset};
pub use vector::{ScaledBiasedVector, TwoLevelVector};
