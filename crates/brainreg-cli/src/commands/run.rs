//! `brainreg run`: the whole pipeline.

use super::require_file;
use crate::error::Result;
use crate::output::{self, Format};
use brainreg::analysis::{self, AnalysisConfig};

pub(crate) fn run(config: &AnalysisConfig, format: Format) -> Result<()> {
    require_file(&config.data.path)?;
    let report = analysis::run_analysis(config)?;

    if format == Format::Json {
        return output::json(&report);
    }

    output::section("Data");
    output::kv("file", config.data.path.display());
    output::block(&report.description);

    output::section("Least squares");
    output::block(&report.ols);

    for fit in [&report.linear, &report.hierarchical] {
        output::section(&format!("Bayesian {}", fit.kind));
        output::block(fit);
        output::convergence(&fit.kind.to_string(), fit.converged, config.rhat_threshold);
    }

    output::section("Residuals");
    output::block(&report.residuals);

    if !report.plots.is_empty() {
        output::section("Plots");
        for plot in &report.plots {
            println!();
            output::block(plot);
        }
    }
    Ok(())
}
