//! Small dense linear algebra helpers

pub mod svd3;

pub use svd3::{determinant, mat_mul, svd3, transpose, Mat3, Svd3};
