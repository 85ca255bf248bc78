//! Brainreg: classical and Bayesian regression of cognitive scores on
//! demographic and brain-volume covariates.
//!
//! The library loads a longitudinal clinical table, fits an ordinary least
//! squares baseline, samples a flat and a varying-intercept Bayesian
//! regression by Gibbs sampling, checks convergence and compares residuals.
//!
//! # Quick Start
//!
//! ```
//! use brainreg::prelude::*;
//!
//! // y = 2x + 1
//! let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! let y = Vector::from_slice(&[3.1, 4.9, 7.0, 9.1, 10.9]);
//!
//! let fit = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).unwrap();
//! assert!((fit.coefficients[1] - 2.0).abs() < 0.1);
//! assert!(fit.r_squared > 0.99);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types with Cholesky solves
//! - [`data`]: DataFrame and CSV cleaning
//! - [`stats`]: Descriptive statistics and distribution functions
//! - [`linear_model`]: Ordinary least squares with inference
//! - [`bayesian`]: Model specifications, Gibbs samplers, posterior summaries
//!   and convergence diagnostics
//! - [`residuals`]: Residual summaries and model comparison
//! - [`plot`]: Text-mode scatter, Q-Q, autocorrelation and trace plots
//! - [`analysis`]: The end-to-end pipeline and its report

pub mod analysis;
pub mod bayesian;
pub mod data;
pub mod error;
pub mod linear_model;
pub mod plot;
pub mod prelude;
pub mod primitives;
pub mod residuals;
pub mod stats;

pub use error::{BrainregError, Result};
