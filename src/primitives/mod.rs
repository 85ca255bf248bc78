//! Core compute primitives (Vector, Matrix).
//!
//! Dense row-major storage; sized for design matrices of a few thousand rows
//! and a handful of covariates.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
