//! `brainreg ols`: classical least-squares baseline.

use super::require_file;
use crate::error::Result;
use crate::output::{self, Format};
use brainreg::analysis::{self, AnalysisConfig};

pub(crate) fn run(config: &AnalysisConfig, format: Format) -> Result<()> {
    require_file(&config.data.path)?;
    let clean = analysis::load(&config.data)?;
    let fit = analysis::fit_ols(&config.data, &clean.frame)?;

    match format {
        Format::Json => output::json(&fit),
        Format::Table => {
            output::section("Least squares");
            output::kv("response", &config.data.response);
            output::kv("observations", fit.n_observations);
            output::block(&fit);
            Ok(())
        }
    }
}
