//! `brainreg describe`: cleaning report and column statistics.

use super::require_file;
use crate::error::Result;
use crate::output::{self, Format};
use brainreg::analysis::{self, AnalysisConfig};

pub(crate) fn run(config: &AnalysisConfig, format: Format) -> Result<()> {
    require_file(&config.data.path)?;
    let report = analysis::describe(&config.data)?;

    match format {
        Format::Json => output::json(&report),
        Format::Table => {
            output::section("Data");
            output::kv("file", config.data.path.display());
            output::block(&report);
            Ok(())
        }
    }
}
