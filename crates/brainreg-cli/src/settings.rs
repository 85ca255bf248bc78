//! Layered settings: built-in defaults, optional TOML file, environment,
//! then command-line flags.

use crate::error::{CliError, Result};
use brainreg::analysis::AnalysisConfig;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Environment prefix; `BRAINREG__SAMPLER__CHAINS=4` sets `sampler.chains`.
const ENV_PREFIX: &str = "BRAINREG";

/// Settings file looked up in the working directory when `--config` is absent.
const DEFAULT_FILE: &str = "brainreg";

/// Command-line values that take precedence over every other layer.
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub data: Option<PathBuf>,
    pub chains: Option<usize>,
    pub iterations: Option<usize>,
    pub burn_in: Option<usize>,
    pub thin: Option<usize>,
    pub seed: Option<u64>,
    pub no_plots: bool,
}

impl Overrides {
    fn apply(&self, cfg: &mut AnalysisConfig) {
        if let Some(path) = &self.data {
            cfg.data.path.clone_from(path);
        }
        if let Some(v) = self.chains {
            cfg.sampler.chains = v;
        }
        if let Some(v) = self.iterations {
            cfg.sampler.iterations = v;
        }
        if let Some(v) = self.burn_in {
            cfg.sampler.burn_in = v;
        }
        if let Some(v) = self.thin {
            cfg.sampler.thin = v;
        }
        if let Some(v) = self.seed {
            cfg.sampler.seed = v;
        }
        if self.no_plots {
            cfg.plots.enabled = false;
        }
    }
}

/// Builds the effective configuration.
///
/// An explicit `file` must exist; the implicit `brainreg.toml` is optional.
pub(crate) fn load(file: Option<&Path>, overrides: &Overrides) -> Result<AnalysisConfig> {
    let defaults = Config::try_from(&AnalysisConfig::default())?;

    let mut builder = Config::builder().add_source(defaults);
    builder = match file {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.to_path_buf()));
            }
            builder.add_source(File::from(path).required(true))
        }
        None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
    };

    let mut cfg: AnalysisConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("data.predictors"),
        )
        .build()?
        .try_deserialize()?;

    overrides.apply(&mut cfg);
    cfg.validate()?;
    tracing::debug!(?cfg, "configuration resolved");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_round_trip() {
        let cfg = load(None, &Overrides::default()).expect("defaults load");
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn test_file_layer() {
        let mut file = Builder::new().suffix(".toml").tempfile().expect("temp file");
        writeln!(
            file,
            "rhat_threshold = 1.05\n[sampler]\nchains = 4\nseed = 7\n[data]\nresponse = \"MMSE\"\ncenter = false"
        )
        .expect("write settings");

        let cfg = load(Some(file.path()), &Overrides::default()).expect("file loads");
        assert_eq!(cfg.sampler.chains, 4);
        assert_eq!(cfg.sampler.seed, 7);
        assert_eq!(cfg.sampler.iterations, 5000);
        assert!(!cfg.data.center);
        assert!((cfg.rhat_threshold - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().expect("temp file");
        writeln!(file, "[sampler]\nchains = 4\nthin = 2").expect("write settings");

        let overrides = Overrides {
            chains: Some(2),
            data: Some(PathBuf::from("other.csv")),
            no_plots: true,
            ..Overrides::default()
        };
        let cfg = load(Some(file.path()), &overrides).expect("file loads");
        assert_eq!(cfg.sampler.chains, 2);
        assert_eq!(cfg.sampler.thin, 2);
        assert_eq!(cfg.data.path, PathBuf::from("other.csv"));
        assert!(!cfg.plots.enabled);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load(Some(Path::new("/nonexistent/brainreg.toml")), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = Overrides {
            thin: Some(0),
            ..Overrides::default()
        };
        let err = load(None, &overrides).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
