//! `brainreg sample`: one Bayesian model with diagnostics.

use super::require_file;
use crate::error::Result;
use crate::output::{self, Format};
use brainreg::analysis::{self, AnalysisConfig, ModelKind};

pub(crate) fn run(config: &AnalysisConfig, kind: ModelKind, format: Format) -> Result<()> {
    require_file(&config.data.path)?;
    let clean = analysis::load(&config.data)?;
    let fit = analysis::fit_bayesian(config, &clean.frame, kind)?;

    match format {
        Format::Json => output::json(&fit),
        Format::Table => {
            output::section(&format!("Bayesian {kind}"));
            output::kv("chains", config.sampler.chains);
            output::kv("kept draws per chain", fit.posterior.draws_per_chain());
            output::kv("seed", config.sampler.seed);
            output::block(&fit);
            output::convergence(&kind.to_string(), fit.converged, config.rhat_threshold);

            if config.plots.enabled {
                for plot in analysis::render_model_plots(&config.plots, &fit)? {
                    println!();
                    output::block(plot);
                }
            }
            Ok(())
        }
    }
}
