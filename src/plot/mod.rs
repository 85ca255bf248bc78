//! Text-mode diagnostic plots.
//!
//! Every plot renders to a [`RenderedPlot`] holding plain text, so the same
//! output can be printed to a terminal, embedded in a JSON report or compared
//! in tests.
//!
//! # Example
//!
//! ```
//! use brainreg::plot::{scatter, PlotConfig};
//!
//! let xs = [1.0, 2.0, 3.0, 4.0];
//! let ys = [2.0, 4.1, 5.9, 8.2];
//! let plot = scatter("fitted vs observed", &xs, &ys, "x", "y", &PlotConfig::default()).unwrap();
//! assert!(plot.body.contains('*'));
//! ```

mod canvas;

pub use canvas::{data_range, Canvas};

use crate::bayesian::diagnostics::autocorrelation;
use crate::error::{BrainregError, Result};
use crate::stats::{normal_quantile, quantile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Marks used for successive chains in trace plots.
const CHAIN_MARKS: [char; 6] = ['1', '2', '3', '4', '5', '6'];

/// Plot sizes and switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Render plots at all
    pub enabled: bool,
    /// Plot area width in characters
    pub width: usize,
    /// Plot area height in rows
    pub height: usize,
    /// Largest lag shown in autocorrelation plots
    pub acf_max_lag: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 60,
            height: 18,
            acf_max_lag: 50,
        }
    }
}

/// A plot rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPlot {
    /// Heading
    pub title: String,
    /// Rendered lines
    pub body: String,
}

impl fmt::Display for RenderedPlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "── {} ──", self.title)?;
        write!(f, "{}", self.body)
    }
}

/// Scatter plot of `ys` against `xs`.
///
/// # Errors
///
/// Returns an error for empty input or mismatched lengths.
pub fn scatter(
    title: &str,
    xs: &[f64],
    ys: &[f64],
    x_label: &str,
    y_label: &str,
    config: &PlotConfig,
) -> Result<RenderedPlot> {
    check_pair(xs, ys)?;
    let mut canvas = Canvas::fitted(config.width, config.height, xs, ys);
    for (&x, &y) in xs.iter().zip(ys) {
        canvas.point(x, y, '*');
    }
    Ok(RenderedPlot {
        title: title.to_string(),
        body: canvas.render(x_label, y_label),
    })
}

/// Normal quantile-quantile plot with the line through the quartiles.
///
/// Plotting positions follow Blom's rule for n ≤ 10 (`a = 3/8`) and
/// `(i − ½)/n` otherwise.
///
/// # Errors
///
/// Returns an error for fewer than two finite values.
pub fn qq_normal(title: &str, values: &[f64], config: &PlotConfig) -> Result<RenderedPlot> {
    let mut sample: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sample.len() < 2 {
        return Err(BrainregError::InsufficientSamples {
            needed: 1,
            got: sample.len(),
        });
    }
    sample.sort_by(f64::total_cmp);

    let n = sample.len();
    let a = if n <= 10 { 0.375 } else { 0.5 };
    let theoretical: Vec<f64> = (1..=n)
        .map(|i| normal_quantile((i as f64 - a) / (n as f64 + 1.0 - 2.0 * a)))
        .collect();

    let mut canvas = Canvas::fitted(config.width, config.height, &theoretical, &sample);

    let (q1, q3) = (quantile(&sample, 0.25)?, quantile(&sample, 0.75)?);
    let (z1, z3) = (normal_quantile(0.25), normal_quantile(0.75));
    let slope = (q3 - q1) / (z3 - z1);
    let intercept = q1 - slope * z1;
    let (x_lo, x_hi) = data_range(&theoretical);

    for (&x, &y) in theoretical.iter().zip(&sample) {
        canvas.point(x, y, '*');
    }
    canvas.line(
        (x_lo, intercept + slope * x_lo),
        (x_hi, intercept + slope * x_hi),
        '.',
    );

    Ok(RenderedPlot {
        title: title.to_string(),
        body: canvas.render("theoretical quantiles", "sample quantiles"),
    })
}

/// Autocorrelation bars for lags `0..=max_lag`, one row per lag.
///
/// The dashed columns mark the approximate 95% band `±1.96/√n`.
///
/// # Errors
///
/// Returns an error for an empty series.
pub fn acf(title: &str, values: &[f64], max_lag: usize, config: &PlotConfig) -> Result<RenderedPlot> {
    if values.is_empty() {
        return Err(BrainregError::empty_input("autocorrelation series"));
    }
    let half = (config.width / 2).max(2);
    let band = 1.96 / (values.len() as f64).sqrt();
    let band_col = ((band * half as f64).round() as usize).min(half);

    let mut body = String::new();
    for lag in 0..=max_lag.min(values.len() - 1) {
        let rho = autocorrelation(values, lag);
        let len = ((rho.abs() * half as f64).round() as usize).min(half);

        let mut left: Vec<char> = vec![' '; half];
        let mut right: Vec<char> = vec![' '; half];
        if band_col > 0 {
            left[half - band_col] = '¦';
            right[band_col - 1] = '¦';
        }
        if rho < 0.0 {
            for c in &mut left[half - len..] {
                *c = '█';
            }
        } else {
            for c in &mut right[..len] {
                *c = '█';
            }
        }
        let _ = writeln!(
            body,
            "{lag:>4} {}│{} {rho:>6.3}",
            left.iter().collect::<String>(),
            right.iter().collect::<String>()
        );
    }
    let _ = write!(body, "     band ±{band:.3} (n = {})", values.len());

    Ok(RenderedPlot {
        title: title.to_string(),
        body,
    })
}

/// Trace plot of one parameter; chains are marked `1`, `2`, ...
///
/// Long chains are drawn at one point per column stride.
///
/// # Errors
///
/// Returns an error if there are no draws.
pub fn trace(title: &str, chains: &[Vec<f64>], config: &PlotConfig) -> Result<RenderedPlot> {
    let len = chains.iter().map(Vec::len).max().unwrap_or(0);
    if len == 0 {
        return Err(BrainregError::empty_input("trace draws"));
    }
    let all: Vec<f64> = chains.iter().flatten().copied().collect();
    let mut canvas = Canvas::new(
        config.width,
        config.height,
        (0.0, (len - 1).max(1) as f64),
        data_range(&all),
    );

    let stride = (len / config.width.max(1)).max(1);
    for (c, chain) in chains.iter().enumerate() {
        let mark = CHAIN_MARKS[c % CHAIN_MARKS.len()];
        for (t, &v) in chain.iter().enumerate().step_by(stride) {
            canvas.point(t as f64, v, mark);
        }
    }

    Ok(RenderedPlot {
        title: title.to_string(),
        body: canvas.render("iteration", "value"),
    })
}

fn check_pair(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.is_empty() {
        return Err(BrainregError::empty_input("plot data"));
    }
    if xs.len() != ys.len() {
        return Err(BrainregError::dimension_mismatch("plot points", xs.len(), ys.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> PlotConfig {
        PlotConfig {
            width: 30,
            height: 10,
            ..PlotConfig::default()
        }
    }

    #[test]
    fn test_scatter_renders_points() {
        let plot = scatter("s", &[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0], "x", "y", &small())
            .expect("valid input");
        assert_eq!(plot.title, "s");
        assert_eq!(plot.body.matches('*').count(), 3);
    }

    #[test]
    fn test_scatter_rejects_bad_input() {
        assert!(scatter("s", &[], &[], "x", "y", &small()).is_err());
        assert!(scatter("s", &[1.0], &[1.0, 2.0], "x", "y", &small()).is_err());
    }

    #[test]
    fn test_qq_normal_has_points_and_line() {
        let values: Vec<f64> = (0..50).map(|i| normal_quantile((i as f64 + 0.5) / 50.0)).collect();
        let plot = qq_normal("qq", &values, &small()).expect("enough values");
        assert!(plot.body.contains('*'));
        assert!(plot.body.contains("theoretical quantiles"));
    }

    #[test]
    fn test_qq_normal_needs_two_values() {
        assert!(qq_normal("qq", &[1.0], &small()).is_err());
        assert!(qq_normal("qq", &[f64::NAN, 2.0], &small()).is_err());
    }

    #[test]
    fn test_acf_rows_per_lag() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 11) as f64).collect();
        let plot = acf("acf", &values, 10, &small()).expect("non-empty");
        // lags 0..=10 plus the band line
        assert_eq!(plot.body.lines().count(), 12);
        assert!(plot.body.starts_with("   0 "));
        assert!(plot.body.contains("1.000"));
    }

    #[test]
    fn test_acf_lag_capped_by_length() {
        let plot = acf("acf", &[1.0, 2.0, 3.0], 50, &small()).expect("non-empty");
        assert_eq!(plot.body.lines().count(), 4);
        assert!(acf("acf", &[], 5, &small()).is_err());
    }

    #[test]
    fn test_trace_marks_each_chain() {
        let chains = vec![vec![0.0; 100], vec![1.0; 100]];
        let plot = trace("t", &chains, &small()).expect("draws");
        assert!(plot.body.contains('1'));
        assert!(plot.body.contains('2'));
        assert!(trace("t", &[], &small()).is_err());
    }

    #[test]
    fn test_display_includes_title() {
        let plot = RenderedPlot {
            title: "Residuals".to_string(),
            body: "body".to_string(),
        };
        assert_eq!(plot.to_string(), "── Residuals ──\nbody");
    }
}
