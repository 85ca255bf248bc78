//! `brainreg model`: print the declarative model text.

use crate::error::Result;
use crate::output::{self, Format};
use brainreg::analysis::{AnalysisConfig, ModelKind};
use serde::Serialize;

#[derive(Serialize)]
struct ModelText<'a> {
    kind: ModelKind,
    spec: brainreg::bayesian::ModelSpec,
    priors: &'a brainreg::bayesian::Priors,
    model_string: String,
}

pub(crate) fn run(config: &AnalysisConfig, kind: ModelKind, format: Format) -> Result<()> {
    let spec = config.data.spec(kind);
    let model_string = spec.to_model_string(&config.priors);

    match format {
        Format::Json => output::json(&ModelText {
            kind,
            spec,
            priors: &config.priors,
            model_string,
        }),
        Format::Table => {
            output::block(model_string);
            Ok(())
        }
    }
}
