//! End-to-end analysis pipeline.
//!
//! Stages run once, in order:
//!
//! 1. load and clean the clinical table
//! 2. descriptive statistics
//! 3. classical least squares
//! 4. flat Bayesian regression
//! 5. varying-intercept Bayesian regression
//! 6. posterior-mean predictions, residuals and their comparison
//! 7. plots
//!
//! Each stage is also exposed on its own so callers can run a subset.

mod report;

pub use report::{AnalysisReport, BayesianFit, DescribeReport};

use crate::bayesian::{
    GibbsModel, HierarchicalGibbs, LinearGibbs, McmcSampler, ModelSpec, PointEstimate, Priors,
    SamplerConfig,
};
use crate::data::{CleanData, CsvLoader, DataFrame, Schema};
use crate::error::{BrainregError, Result};
use crate::linear_model::{OlsFit, OrdinaryLeastSquares};
use crate::plot::{self, PlotConfig, RenderedPlot};
use crate::residuals::ResidualComparison;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the data lives and which columns enter the models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file
    pub path: PathBuf,
    /// Columns retained while cleaning
    pub schema: Schema,
    /// Response column
    pub response: String,
    /// Covariates for the classical and flat models
    pub predictors: Vec<String>,
    /// Grouping column for the varying-intercept model
    pub group: String,
    /// Subtract covariate means before sampling
    pub center: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/oasis_longitudinal.csv"),
            schema: Schema::default(),
            response: "MMSE".to_string(),
            predictors: ["Age", "EDUC", "SES", "eTIV", "nWBV", "Gender"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            group: "SES".to_string(),
            center: true,
        }
    }
}

impl DataConfig {
    /// Flat-model specification.
    #[must_use]
    pub fn linear_spec(&self) -> ModelSpec {
        ModelSpec::Linear {
            response: self.response.clone(),
            predictors: self.predictors.clone(),
        }
    }

    /// Varying-intercept specification; the group column leaves the
    /// covariate list.
    #[must_use]
    pub fn hierarchical_spec(&self) -> ModelSpec {
        ModelSpec::Hierarchical {
            response: self.response.clone(),
            predictors: self
                .predictors
                .iter()
                .filter(|p| **p != self.group)
                .cloned()
                .collect(),
            group: self.group.clone(),
        }
    }

    /// Specification for `kind`.
    #[must_use]
    pub fn spec(&self, kind: ModelKind) -> ModelSpec {
        match kind {
            ModelKind::Linear => self.linear_spec(),
            ModelKind::Hierarchical => self.hierarchical_spec(),
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input and model columns
    pub data: DataConfig,
    /// Chain settings
    pub sampler: SamplerConfig,
    /// Prior hyperparameters
    pub priors: Priors,
    /// Plot settings
    pub plots: PlotConfig,
    /// R̂ below which a parameter is reported as converged
    pub rhat_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            sampler: SamplerConfig::default(),
            priors: Priors::default(),
            plots: PlotConfig::default(),
            rhat_threshold: crate::bayesian::diagnostics::DEFAULT_RHAT_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Checks sampler, priors and threshold.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        self.priors.validate()?;
        if !(self.rhat_threshold.is_finite() && self.rhat_threshold > 1.0) {
            return Err(BrainregError::InvalidHyperparameter {
                param: "rhat_threshold".to_string(),
                value: self.rhat_threshold.to_string(),
                constraint: "> 1".to_string(),
            });
        }
        if self.data.predictors.is_empty() {
            return Err(BrainregError::empty_input("predictor list"));
        }
        Ok(())
    }
}

/// Which Bayesian model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Single intercept
    Linear,
    /// One intercept per group level
    Hierarchical,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = BrainregError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "flat" => Ok(Self::Linear),
            "hierarchical" | "grouped" => Ok(Self::Hierarchical),
            other => Err(format!("unknown model kind '{other}'").into()),
        }
    }
}

/// Loads and cleans the configured table.
///
/// # Errors
///
/// Propagates I/O, parse and schema errors.
pub fn load(config: &DataConfig) -> Result<CleanData> {
    tracing::info!(path = %config.path.display(), "loading data");
    CsvLoader::load(&config.path, &config.schema)
}

/// Cleaning report plus per-column statistics.
///
/// # Errors
///
/// Same as [`load`].
pub fn describe(config: &DataConfig) -> Result<DescribeReport> {
    let clean = load(config)?;
    Ok(DescribeReport::new(&clean))
}

/// Least squares on raw (uncentred) covariates.
///
/// # Errors
///
/// Returns an error for missing columns or a singular design.
pub fn fit_ols(config: &DataConfig, frame: &DataFrame) -> Result<OlsFit> {
    let names: Vec<&str> = config.predictors.iter().map(String::as_str).collect();
    let x = frame.to_matrix(&names)?;
    let y = frame.column(&config.response)?;
    let fit = OrdinaryLeastSquares::new().fit(&x, y, &names)?;
    tracing::info!(
        r_squared = fit.r_squared,
        sigma = fit.residual_std_error,
        "least squares fitted"
    );
    Ok(fit)
}

/// Samples one Bayesian model and summarises it.
///
/// # Errors
///
/// Returns an error for invalid settings, missing columns or a failed draw.
pub fn fit_bayesian(config: &AnalysisConfig, frame: &DataFrame, kind: ModelKind) -> Result<BayesianFit> {
    let spec = config.data.spec(kind);
    let design = spec.design(frame, config.data.center)?;
    let sampler = McmcSampler::new(config.sampler.clone())?;
    tracing::info!(
        model = %kind,
        parameters = design.n_predictors(),
        observations = design.n_obs(),
        "sampling"
    );

    match kind {
        ModelKind::Linear => {
            let model = LinearGibbs::new(&design, &config.priors)?;
            summarise(config, kind, &spec, &design, &sampler, &model)
        }
        ModelKind::Hierarchical => {
            let model = HierarchicalGibbs::new(&design, &config.priors)?;
            summarise(config, kind, &spec, &design, &sampler, &model)
        }
    }
}

fn summarise<M: GibbsModel>(
    config: &AnalysisConfig,
    kind: ModelKind,
    spec: &ModelSpec,
    design: &crate::bayesian::Design,
    sampler: &McmcSampler,
    model: &M,
) -> Result<BayesianFit> {
    let posterior = sampler.run(model)?;
    let summary = posterior.summary()?;
    let convergence = posterior.convergence();
    let estimate = PointEstimate::from_posterior(&posterior, &model.layout());
    let fitted = estimate.predict(design)?;
    let residuals = design.y.sub(&fitted)?;

    let unconverged: Vec<&str> = convergence
        .iter()
        .filter(|c| !c.converged(config.rhat_threshold))
        .map(|c| c.parameter.as_str())
        .collect();
    if unconverged.is_empty() {
        tracing::info!(model = %kind, "all chains converged");
    } else {
        tracing::warn!(
            model = %kind,
            threshold = config.rhat_threshold,
            parameters = %unconverged.join(", "),
            "R-hat above threshold"
        );
    }

    let group_labels = design
        .groups
        .as_ref()
        .map(|g| (0..g.n_groups()).map(|i| g.label(i)).collect())
        .unwrap_or_default();

    Ok(BayesianFit {
        kind,
        model_string: spec.to_model_string(&config.priors),
        converged: unconverged.is_empty(),
        intercepts_at_origin: estimate.intercepts_at_origin(&design.centers),
        group_labels,
        predictors: design.predictors.clone(),
        summary,
        convergence,
        estimate,
        layout: model.layout(),
        fitted: fitted.into_vec(),
        residuals: residuals.into_vec(),
        posterior,
    })
}

/// Residual, trace and autocorrelation plots for one Bayesian fit.
///
/// # Errors
///
/// Returns an error only for empty residuals or draws.
pub fn render_model_plots(config: &PlotConfig, fit: &BayesianFit) -> Result<Vec<RenderedPlot>> {
    let kind = fit.kind;
    let mut plots = vec![
        plot::scatter(
            &format!("Bayesian {kind} residuals vs fitted"),
            &fit.fitted,
            &fit.residuals,
            "fitted",
            "residual",
            config,
        )?,
        plot::qq_normal(
            &format!("Bayesian {kind} residuals, normal Q-Q"),
            &fit.residuals,
            config,
        )?,
    ];

    // first slope; intercept traces mostly show the response mean
    let k = fit.layout.slopes.start;
    if let (false, Some(name)) = (fit.layout.slopes.is_empty(), fit.posterior.names().get(k)) {
        let chains = fit.posterior.chain_draws(k);
        plots.push(plot::trace(&format!("{kind}: trace of {name}"), &chains, config)?);
        plots.push(plot::acf(
            &format!("{kind}: autocorrelation of {name}"),
            &chains[0],
            config.acf_max_lag,
            config,
        )?);
    }
    Ok(plots)
}

/// Diagnostic plots for a finished run.
///
/// # Errors
///
/// Returns an error only for degenerate inputs (empty residuals or draws).
pub fn render_plots(
    config: &PlotConfig,
    ols: &OlsFit,
    fits: &[&BayesianFit],
) -> Result<Vec<RenderedPlot>> {
    let mut plots = Vec::new();
    plots.push(plot::scatter(
        "OLS residuals vs fitted",
        &ols.fitted,
        &ols.residuals,
        "fitted",
        "residual",
        config,
    )?);
    plots.push(plot::qq_normal("OLS residuals, normal Q-Q", &ols.residuals, config)?);

    for fit in fits {
        plots.extend(render_model_plots(config, fit)?);
    }

    if let Some(linear) = fits.iter().find(|f| f.kind == ModelKind::Linear) {
        plots.push(plot::scatter(
            "OLS vs Bayesian linear residuals",
            &ols.residuals,
            &linear.residuals,
            "OLS",
            "Bayesian",
            config,
        )?);
    }
    Ok(plots)
}

/// Runs every stage.
///
/// # Errors
///
/// Stops at the first failing stage.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let clean = load(&config.data)?;
    let description = DescribeReport::new(&clean);

    let ols = fit_ols(&config.data, &clean.frame)?;
    let linear = fit_bayesian(config, &clean.frame, ModelKind::Linear)?;
    let hierarchical = fit_bayesian(config, &clean.frame, ModelKind::Hierarchical)?;

    let residuals = ResidualComparison::compare(&ols.residuals, &linear.residuals, &hierarchical.residuals)?;
    tracing::info!(
        max_abs_difference = residuals.max_abs_difference_linear,
        correlation = residuals.correlation_linear,
        "residuals compared"
    );

    let plots = if config.plots.enabled {
        render_plots(&config.plots, &ols, &[&linear, &hierarchical])?
    } else {
        Vec::new()
    };

    Ok(AnalysisReport {
        description,
        ols,
        linear,
        hierarchical,
        residuals,
        plots,
    })
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
