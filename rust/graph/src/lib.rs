//! Vamana-style adjacency graph, greedy search, batch iteration, and the
//! runtime search parameters that configure both.
//!
//! This crate is deliberately decoupled from `vsearch-dataset` and
//! `vsearch-distance`: [`search::greedy_search`] and [`iterator::BatchIterator`]
//! take a `distance_to: impl FnMut(u32) -> f32` closure rather than a
//! concrete dataset/distance type, so the index layer wires them together.

pub mod buffer;
pub mod calibrate;
pub mod error;
pub mod graph;
pub mod iterator;
pub mod neighbor;
pub mod params;
pub mod schedule;
pub mod search;

pub use buffer::{SearchBuffer, SearchBufferConfig};
pub use calibrate::{calibrate, tune_up, CalibrationContext, CalibrationOutcome, CalibrationTarget};
pub use error::GraphError;
pub use graph::Graph;
pub use iterator::BatchIterator;
pub use neighbor::{Neighbor, SearchNeighbor};
pub use params::VamanaSearchParameters;
pub use schedule::{DefaultSchedule, IteratorSchedule, LinearSchedule};
pub use search::greedy_search;
