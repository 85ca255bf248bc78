//! Bayesian regression by Gibbs sampling.
//!
//! Two models are supported:
//! - Flat linear regression with a single intercept
//! - Varying-intercept regression with one intercept per group level,
//!   partially pooled towards a common mean
//!
//! Both use conditionally conjugate priors, so every update is an exact draw
//! from a full conditional and no tuning is required.
//!
//! # Design Philosophy
//!
//! A model is declared once as a [`ModelSpec`]. From it come the printable
//! model string, the numeric [`Design`], and a sampler implementing
//! [`GibbsModel`]. [`McmcSampler`] knows nothing about regression; it only
//! drives chains and collects draws into a [`Posterior`].
//!
//! # Example
//!
//! ```
//! use brainreg::bayesian::{
//!     HierarchicalGibbs, McmcSampler, ModelSpec, PointEstimate, Priors, SamplerConfig,
//! };
//! use brainreg::data::DataFrame;
//! use brainreg::primitives::Vector;
//! use brainreg::bayesian::GibbsModel;
//!
//! let frame = DataFrame::new(vec![
//!     ("score".to_string(), Vector::from_slice(&[28.0, 29.0, 24.0, 25.0, 30.0, 29.0, 23.0, 26.0])),
//!     ("age".to_string(), Vector::from_slice(&[70.0, 65.0, 80.0, 78.0, 60.0, 66.0, 85.0, 75.0])),
//!     ("ses".to_string(), Vector::from_slice(&[1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0])),
//! ])
//! .unwrap();
//!
//! let spec = ModelSpec::Hierarchical {
//!     response: "score".into(),
//!     predictors: vec!["age".into()],
//!     group: "ses".into(),
//! };
//! let design = spec.design(&frame, true).unwrap();
//! let model = HierarchicalGibbs::new(&design, &Priors::default()).unwrap();
//!
//! let config = SamplerConfig { chains: 2, burn_in: 200, iterations: 500, thin: 1, seed: 1 };
//! let posterior = McmcSampler::new(config).unwrap().run(&model).unwrap();
//!
//! let estimate = PointEstimate::from_posterior(&posterior, &model.layout());
//! assert_eq!(estimate.intercepts.len(), 2);
//! let residuals = estimate.residuals(&design).unwrap();
//! assert_eq!(residuals.len(), 8);
//! ```
//!
//! # References
//!
//! - Gelman, A., & Hill, J. (2007). *Data Analysis Using Regression and
//!   Multilevel/Hierarchical Models*. Cambridge University Press.
//! - Gelman, A., & Rubin, D. B. (1992). Inference from iterative simulation
//!   using multiple sequences. *Statistical Science*, 7(4), 457-472.

pub mod diagnostics;
mod gibbs;
mod posterior;
mod sampler;
mod spec;

pub use diagnostics::ConvergenceReport;
pub use gibbs::{GibbsModel, HierarchicalGibbs, LinearGibbs, ParameterLayout};
pub use posterior::{Chain, ParameterSummary, PointEstimate, Posterior};
pub use sampler::{McmcSampler, SamplerConfig};
pub use spec::{Design, Grouping, ModelSpec, Priors};
