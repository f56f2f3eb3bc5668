//! Distance kernels: plain `f32` metrics, a bias-aware wrapper for
//! mean-centered compressed data, and decompress-then-compute adaptors
//! for distances between two quantized vectors.
//!
//! - [`compute::distance_raw`] dispatches a metric over two raw vectors
//!   to the AVX2+FMA kernel ([`distance_avx`]) or the portable scalar
//!   kernel ([`scalar`]).
//! - [`traits::Distance`] is the query-fixed functor contract; [`biased`]
//!   implements it for mean-centered data.
//! - [`quantized`] computes a raw query against a quantized dataset
//!   vector; [`adaptor::DecompressionAdaptor`] computes between two
//!   quantized vectors.

pub mod adaptor;
pub mod biased;
pub mod compute;
pub mod distance_avx;
pub mod quantized;
pub mod scalar;
pub mod traits;

pub use adaptor::DecompressionAdaptor;
pub use biased::BiasedDistance;
pub use compute::{distance_raw, normalize};
pub use quantized::{quantized_distance, quantized_distance_two_level};
pub use traits::Distance;

pub use vsearch_types::DistanceFunction;
