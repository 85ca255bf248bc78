//! Multi-chain MCMC driver.

use super::gibbs::GibbsModel;
use super::posterior::{Chain, Posterior};
use crate::error::{BrainregError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Run length and seeding for a sampler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Independent chains
    pub chains: usize,
    /// Warm-up iterations discarded per chain
    pub burn_in: usize,
    /// Post-burn-in iterations per chain (before thinning)
    pub iterations: usize,
    /// Keep every `thin`-th post-burn-in draw
    pub thin: usize,
    /// Base seed; chain `c` uses `seed + c`
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            chains: 3,
            burn_in: 1000,
            iterations: 5000,
            thin: 1,
            seed: 42,
        }
    }
}

impl SamplerConfig {
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for zero chains, iterations or thin,
    /// or when thinning would keep no draws.
    pub fn validate(&self) -> Result<()> {
        let check = |param: &str, value: usize| {
            if value == 0 {
                Err(BrainregError::InvalidHyperparameter {
                    param: param.to_string(),
                    value: value.to_string(),
                    constraint: ">= 1".to_string(),
                })
            } else {
                Ok(())
            }
        };
        check("chains", self.chains)?;
        check("iterations", self.iterations)?;
        check("thin", self.thin)?;
        if self.thin > self.iterations {
            return Err(BrainregError::InvalidHyperparameter {
                param: "thin".to_string(),
                value: self.thin.to_string(),
                constraint: format!("<= iterations ({})", self.iterations),
            });
        }
        Ok(())
    }

    /// Draws kept per chain.
    #[must_use]
    pub fn kept_per_chain(&self) -> usize {
        self.iterations / self.thin.max(1)
    }
}

/// Runs independent Gibbs chains in parallel.
///
/// # Examples
///
/// ```
/// use brainreg::bayesian::{LinearGibbs, McmcSampler, ModelSpec, Priors, SamplerConfig};
/// use brainreg::data::DataFrame;
/// use brainreg::primitives::Vector;
///
/// let frame = DataFrame::new(vec![
///     ("y".to_string(), Vector::from_slice(&[1.0, 2.9, 5.1, 7.0, 9.2, 10.8])),
///     ("x".to_string(), Vector::from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])),
/// ])
/// .unwrap();
/// let spec = ModelSpec::Linear { response: "y".into(), predictors: vec!["x".into()] };
/// let design = spec.design(&frame, true).unwrap();
/// let model = LinearGibbs::new(&design, &Priors::default()).unwrap();
///
/// let config = SamplerConfig { chains: 2, burn_in: 100, iterations: 400, thin: 2, seed: 7 };
/// let posterior = McmcSampler::new(config).unwrap().run(&model).unwrap();
/// assert_eq!(posterior.n_chains(), 2);
/// assert_eq!(posterior.draws_per_chain(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct McmcSampler {
    config: SamplerConfig,
}

impl McmcSampler {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Samples every chain and collects the kept draws.
    ///
    /// Chains are independent, so results depend only on the seed, not on
    /// thread scheduling.
    ///
    /// # Errors
    ///
    /// Propagates the first failing chain's error.
    pub fn run<M: GibbsModel>(&self, model: &M) -> Result<Posterior> {
        let cfg = &self.config;
        tracing::debug!(
            chains = cfg.chains,
            burn_in = cfg.burn_in,
            iterations = cfg.iterations,
            thin = cfg.thin,
            seed = cfg.seed,
            "starting sampler"
        );

        let chains = (0..cfg.chains)
            .into_par_iter()
            .map(|c| self.run_chain(model, c))
            .collect::<Result<Vec<Chain>>>()?;

        Posterior::new(model.parameter_names(), chains)
    }

    fn run_chain<M: GibbsModel>(&self, model: &M, chain: usize) -> Result<Chain> {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(chain as u64));
        let mut state = model.initial_state(&mut rng, chain);

        for _ in 0..cfg.burn_in {
            model.step(&mut rng, &mut state)?;
        }

        let mut draws = Vec::with_capacity(cfg.kept_per_chain());
        for it in 1..=cfg.iterations {
            model.step(&mut rng, &mut state)?;
            if it % cfg.thin == 0 {
                draws.push(model.record(&state));
            }
        }

        tracing::debug!(chain, kept = draws.len(), "chain finished");
        Ok(Chain { draws })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayesian::gibbs::ParameterLayout;
    use rand::Rng;

    /// Independent standard-normal draws; enough to exercise the driver.
    struct NormalModel;

    impl GibbsModel for NormalModel {
        fn parameter_names(&self) -> Vec<String> {
            vec!["z".to_string()]
        }

        fn layout(&self) -> ParameterLayout {
            ParameterLayout {
                intercepts: 0..1,
                slopes: 1..1,
                precision: 0,
            }
        }

        fn initial_state(&self, _rng: &mut StdRng, chain: usize) -> Vec<f64> {
            vec![chain as f64 * 10.0]
        }

        fn step(&self, rng: &mut StdRng, state: &mut [f64]) -> Result<()> {
            state[0] = rng.sample::<f64, _>(rand_distr::StandardNormal);
            Ok(())
        }
    }

    /// Counts iterations so thinning is observable.
    struct CounterModel;

    impl GibbsModel for CounterModel {
        fn parameter_names(&self) -> Vec<String> {
            vec!["t".to_string()]
        }

        fn layout(&self) -> ParameterLayout {
            ParameterLayout {
                intercepts: 0..1,
                slopes: 1..1,
                precision: 0,
            }
        }

        fn initial_state(&self, _rng: &mut StdRng, _chain: usize) -> Vec<f64> {
            vec![0.0]
        }

        fn step(&self, _rng: &mut StdRng, state: &mut [f64]) -> Result<()> {
            state[0] += 1.0;
            Ok(())
        }
    }

    fn config(chains: usize, burn_in: usize, iterations: usize, thin: usize) -> SamplerConfig {
        SamplerConfig {
            chains,
            burn_in,
            iterations,
            thin,
            seed: 42,
        }
    }

    #[test]
    fn test_default_config() {
        let cfg = SamplerConfig::default();
        assert_eq!((cfg.chains, cfg.burn_in, cfg.iterations, cfg.thin, cfg.seed), (3, 1000, 5000, 1, 42));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        assert!(config(0, 0, 10, 1).validate().is_err());
        assert!(config(1, 0, 0, 1).validate().is_err());
        assert!(config(1, 0, 10, 0).validate().is_err());
        assert!(config(1, 0, 10, 11).validate().is_err());
        assert!(McmcSampler::new(config(0, 0, 10, 1)).is_err());
    }

    #[test]
    fn test_burn_in_and_thinning() {
        let sampler = McmcSampler::new(config(2, 5, 20, 4)).expect("valid");
        let post = sampler.run(&CounterModel).expect("runs");
        assert_eq!(post.draws_per_chain(), 5);
        let kept: Vec<f64> = post.chain_draws(0)[0].clone();
        // iterations 6..=25 after burn-in, every fourth kept
        assert_eq!(kept, vec![9.0, 13.0, 17.0, 21.0, 25.0]);
    }

    #[test]
    fn test_reproducible_for_same_seed() {
        let sampler = McmcSampler::new(config(3, 10, 200, 1)).expect("valid");
        let a = sampler.run(&NormalModel).expect("runs");
        let b = sampler.run(&NormalModel).expect("runs");
        assert_eq!(a.chains(), b.chains());
    }

    #[test]
    fn test_chains_use_distinct_streams() {
        let sampler = McmcSampler::new(config(2, 0, 50, 1)).expect("valid");
        let post = sampler.run(&NormalModel).expect("runs");
        let draws = post.chain_draws(0);
        assert_ne!(draws[0], draws[1]);
    }

    #[test]
    fn test_different_seed_changes_draws() {
        let a = McmcSampler::new(config(1, 0, 50, 1)).expect("valid");
        let mut cfg = config(1, 0, 50, 1);
        cfg.seed = 43;
        let b = McmcSampler::new(cfg).expect("valid");
        assert_ne!(
            a.run(&NormalModel).expect("runs").chains(),
            b.run(&NormalModel).expect("runs").chains()
        );
    }

    #[test]
    fn test_config_serde_defaults() {
        let cfg: SamplerConfig = serde_json::from_str(r#"{"chains": 4}"#).expect("partial config");
        assert_eq!(cfg.chains, 4);
        assert_eq!(cfg.iterations, 5000);
    }
}
