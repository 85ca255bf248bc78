//! Report types and their console tables.

use super::ModelKind;
use crate::bayesian::{ConvergenceReport, ParameterLayout, ParameterSummary, PointEstimate, Posterior};
use crate::data::{CleanData, CleaningReport, ColumnStats};
use crate::linear_model::OlsFit;
use crate::plot::RenderedPlot;
use crate::residuals::{ResidualComparison, ResidualStats};
use serde::Serialize;
use std::fmt;

/// Output of the cleaning and description stages.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeReport {
    /// Rows read, kept and dropped
    pub cleaning: CleaningReport,
    /// Per-column statistics of the cleaned table
    pub columns: Vec<ColumnStats>,
}

impl DescribeReport {
    /// Summarises a cleaned table.
    #[must_use]
    pub fn new(clean: &CleanData) -> Self {
        Self {
            cleaning: clean.report.clone(),
            columns: clean.frame.describe(),
        }
    }
}

/// One sampled Bayesian model.
#[derive(Debug, Clone, Serialize)]
pub struct BayesianFit {
    /// Model family
    pub kind: ModelKind,
    /// BUGS-style model text
    pub model_string: String,
    /// Every parameter below the R̂ threshold
    pub converged: bool,
    /// Intercepts for raw (uncentred) covariates
    pub intercepts_at_origin: Vec<f64>,
    /// Group labels for hierarchical intercepts
    pub group_labels: Vec<String>,
    /// Covariates in slope order
    pub predictors: Vec<String>,
    /// Posterior summary table
    pub summary: Vec<ParameterSummary>,
    /// Diagnostics per parameter
    pub convergence: Vec<ConvergenceReport>,
    /// Posterior means
    pub estimate: PointEstimate,
    /// State layout of the sampler
    #[serde(skip)]
    pub layout: ParameterLayout,
    /// Posterior-mean predictions
    #[serde(skip)]
    pub fitted: Vec<f64>,
    /// Observed minus predicted
    #[serde(skip)]
    pub residuals: Vec<f64>,
    /// Raw draws
    #[serde(skip)]
    pub posterior: Posterior,
}

/// Everything produced by a full run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Cleaning and descriptive statistics
    pub description: DescribeReport,
    /// Classical baseline
    pub ols: OlsFit,
    /// Flat Bayesian model
    pub linear: BayesianFit,
    /// Varying-intercept Bayesian model
    pub hierarchical: BayesianFit,
    /// Residual comparison
    pub residuals: ResidualComparison,
    /// Text plots (empty when disabled)
    pub plots: Vec<RenderedPlot>,
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "NA".to_string(), |x| format!("{x:.3}"))
}

fn significance(p: f64) -> &'static str {
    match p {
        p if p < 0.001 => "***",
        p if p < 0.01 => "**",
        p if p < 0.05 => "*",
        p if p < 0.1 => ".",
        _ => "",
    }
}

impl fmt::Display for DescribeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.cleaning;
        writeln!(
            f,
            "rows read: {}  kept: {}  dropped: {}",
            c.rows_read, c.rows_kept, c.rows_dropped
        )?;
        let missing: Vec<String> = c
            .missing_by_column
            .iter()
            .filter(|m| m.count > 0)
            .map(|m| format!("{}={}", m.column, m.count))
            .collect();
        if !missing.is_empty() {
            writeln!(f, "missing cells: {}", missing.join(", "))?;
        }
        writeln!(
            f,
            "{:<10} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "n", "mean", "sd", "min", "median", "max"
        )?;
        for s in &self.columns {
            writeln!(
                f,
                "{:<10} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                s.name, s.count, s.mean, s.std, s.min, s.median, s.max
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for OlsFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>12} {:>12} {:>9} {:>10}",
            "term", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
        )?;
        for i in 0..self.names.len() {
            writeln!(
                f,
                "{:<12} {:>12.5} {:>12.5} {:>9.3} {:>10.3e} {}",
                self.names[i],
                self.coefficients[i],
                self.std_errors[i],
                self.t_values[i],
                self.p_values[i],
                significance(self.p_values[i])
            )?;
        }
        writeln!(
            f,
            "Residual standard error: {:.4} on {} degrees of freedom",
            self.residual_std_error, self.df_residual
        )?;
        writeln!(
            f,
            "Multiple R-squared: {:.4}, Adjusted R-squared: {:.4}",
            self.r_squared, self.adj_r_squared
        )?;
        writeln!(
            f,
            "F-statistic: {:.3} on {} and {} DF, p-value: {:.3e}",
            self.f_statistic,
            self.names.len() - 1,
            self.df_residual,
            self.f_pvalue
        )
    }
}

impl fmt::Display for BayesianFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "model: {}  converged: {}",
            self.kind,
            if self.converged { "yes" } else { "NO" }
        )?;
        writeln!(f, "{}", self.model_string)?;
        writeln!(
            f,
            "{:<14} {:>10} {:>9} {:>9} {:>9} {:>10} {:>10} {:>10} {:>10} {:>10} {:>7} {:>8}",
            "parameter", "mean", "sd", "naive se", "ts se", "2.5%", "25%", "50%", "75%", "97.5%", "Rhat", "ESS"
        )?;
        for s in &self.summary {
            writeln!(
                f,
                "{:<14} {:>10.4} {:>9.4} {:>9.5} {:>9.5} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>7} {:>8.0}",
                s.name,
                s.mean,
                s.sd,
                s.naive_se,
                s.time_series_se,
                s.q2_5,
                s.q25,
                s.q50,
                s.q75,
                s.q97_5,
                fmt_opt(s.r_hat),
                s.ess
            )?;
        }

        writeln!(f, "autocorrelation (chain 1) and Geweke z:")?;
        let lags: Vec<String> = self
            .convergence
            .first()
            .map(|c| c.autocorrelation.iter().map(|(l, _)| format!("lag {l}")).collect())
            .unwrap_or_default();
        write!(f, "{:<14}", "parameter")?;
        for l in &lags {
            write!(f, " {l:>8}")?;
        }
        writeln!(f, " {:>8}", "Geweke")?;
        for c in &self.convergence {
            write!(f, "{:<14}", c.parameter)?;
            for (_, rho) in &c.autocorrelation {
                write!(f, " {rho:>8.3}")?;
            }
            writeln!(f, " {:>8}", fmt_opt(c.geweke_z))?;
        }

        let labels: Vec<String> = if self.group_labels.is_empty() {
            vec!["(Intercept)".to_string()]
        } else {
            self.group_labels.clone()
        };
        let origin: Vec<String> = labels
            .iter()
            .zip(&self.intercepts_at_origin)
            .map(|(l, v)| format!("{l}: {v:.4}"))
            .collect();
        writeln!(f, "intercepts for uncentred covariates: {}", origin.join(", "))
    }
}

fn write_residual_row(f: &mut fmt::Formatter<'_>, label: &str, s: &ResidualStats) -> fmt::Result {
    writeln!(
        f,
        "{:<24} {:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
        label, s.n, s.mean, s.sd, s.rmse, s.mae, s.min, s.max
    )
}

impl fmt::Display for ResidualComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "fit", "n", "mean", "sd", "rmse", "mae", "min", "max"
        )?;
        write_residual_row(f, "OLS", &self.classical)?;
        write_residual_row(f, "Bayesian linear", &self.bayesian_linear)?;
        write_residual_row(f, "Bayesian hierarchical", &self.bayesian_hierarchical)?;
        writeln!(
            f,
            "max |OLS - Bayesian linear|: {:.5}  correlation: {:.5}",
            self.max_abs_difference_linear, self.correlation_linear
        )
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Data ===")?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "=== Least squares ===")?;
        writeln!(f, "{}", self.ols)?;
        writeln!(f, "=== Bayesian linear ===")?;
        writeln!(f, "{}", self.linear)?;
        writeln!(f, "=== Bayesian hierarchical ===")?;
        writeln!(f, "{}", self.hierarchical)?;
        writeln!(f, "=== Residuals ===")?;
        write!(f, "{}", self.residuals)?;
        for plot in &self.plots {
            writeln!(f)?;
            writeln!(f, "{plot}")?;
        }
        Ok(())
    }
}
