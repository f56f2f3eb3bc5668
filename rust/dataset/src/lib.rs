//! Containers of quantized vectors with O(1) random access.
//!
//! - [`StaticPerVectorDataset`] and [`StaticGlobalDataset`] are fixed-size,
//!   contiguous blobs for static indices.
//! - [`BlockedDataset`] is a growable, block-allocated container for
//!   dynamic indices, supporting `append`/`erase_at`/`compact_in_place`.
//! - [`datum::DatumRef`] is the non-owning `(scale, bias, packed view)`
//!   triple both return from `get_datum`.
//! - [`persist`] saves/loads a [`StaticPerVectorDataset`] through the same
//!   directory layout `vsearch-codec` uses for a freshly-compressed
//!   dataset.

mod blocked;
mod datum;
mod error;
mod persist;
mod static_dataset;

pub use blocked::BlockedDataset;
pub use datum::DatumRef;
pub use error::DatasetError;
pub use persist::{load, save};
pub use static_dataset::{StaticGlobalDataset, StaticPerVectorDataset};
