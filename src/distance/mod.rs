//! Distance computation.
//!
//! Provides the planar Euclidean metric and a dense, read-only distance
//! matrix built once per solve.

mod matrix;

pub use matrix::{euclidean, DistanceMatrix};
