//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use brainreg::prelude::*;
//! ```

pub use crate::analysis::{run_analysis, AnalysisConfig, AnalysisReport, DataConfig, ModelKind};
pub use crate::bayesian::{
    GibbsModel, HierarchicalGibbs, LinearGibbs, McmcSampler, ModelSpec, PointEstimate, Posterior,
    Priors, SamplerConfig,
};
pub use crate::data::{CsvLoader, DataFrame, Schema};
pub use crate::error::{BrainregError, Result};
pub use crate::linear_model::{OlsFit, OrdinaryLeastSquares};
pub use crate::primitives::{Matrix, Vector};
pub use crate::residuals::{ResidualComparison, ResidualStats};
