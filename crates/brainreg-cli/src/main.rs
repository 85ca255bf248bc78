//! brainreg - regression of cognitive scores on brain-volume covariates
//!
//! Usage:
//!   brainreg run                              # Full pipeline
//!   brainreg describe --data visits.csv       # Cleaning report and statistics
//!   brainreg ols                              # Least-squares baseline
//!   brainreg sample --model hierarchical      # One Bayesian model
//!   brainreg model --model linear             # Print the model text
//!
//! Settings come from built-in defaults, `brainreg.toml` (or `--config`),
//! `BRAINREG__SECTION__KEY` environment variables and flags, in that order.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;
mod settings;

use brainreg::analysis::ModelKind;
use output::Format;
use settings::Overrides;

/// brainreg - classical and Bayesian regression of MMSE on brain volume
#[derive(Parser)]
#[command(name = "brainreg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Flags shared by every subcommand that reads data.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// CSV file to analyse
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Number of chains
    #[arg(long)]
    chains: Option<usize>,

    /// Post-burn-in iterations per chain
    #[arg(long)]
    iterations: Option<usize>,

    /// Burn-in iterations per chain
    #[arg(long)]
    burn_in: Option<usize>,

    /// Keep every n-th draw
    #[arg(long)]
    thin: Option<usize>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Skip plots
    #[arg(long)]
    no_plots: bool,
}

impl From<RunArgs> for Overrides {
    fn from(a: RunArgs) -> Self {
        Self {
            data: a.data,
            chains: a.chains,
            iterations: a.iterations,
            burn_in: a.burn_in,
            thin: a.thin,
            seed: a.seed,
            no_plots: a.no_plots,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelArg {
    /// Single intercept
    Linear,
    /// One intercept per group level
    Hierarchical,
}

impl From<ModelArg> for ModelKind {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::Linear => ModelKind::Linear,
            ModelArg::Hierarchical => ModelKind::Hierarchical,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage: clean, OLS, both Bayesian models, residuals, plots
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Show the cleaning report and descriptive statistics
    Describe {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Fit the least-squares baseline
    Ols {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Sample one Bayesian model and report diagnostics
    Sample {
        /// Model to sample
        #[arg(long, value_enum, default_value = "linear")]
        model: ModelArg,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the model in BUGS-style notation
    Model {
        /// Model to print
        #[arg(long, value_enum, default_value = "linear")]
        model: ModelArg,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "brainreg=warn"
    } else if verbose {
        "brainreg=debug"
    } else {
        "brainreg=info"
    };
    // stdout carries results only
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(cli: Cli) -> error::Result<()> {
    let format = cli.format;
    let file = cli.config.as_deref();

    match cli.command {
        Commands::Run { args } => {
            let cfg = settings::load(file, &args.into())?;
            commands::run::run(&cfg, format)
        }
        Commands::Describe { args } => {
            let cfg = settings::load(file, &args.into())?;
            commands::describe::run(&cfg, format)
        }
        Commands::Ols { args } => {
            let cfg = settings::load(file, &args.into())?;
            commands::ols::run(&cfg, format)
        }
        Commands::Sample { model, args } => {
            let cfg = settings::load(file, &args.into())?;
            commands::sample::run(&cfg, model.into(), format)
        }
        Commands::Model { model } => {
            let cfg = settings::load(file, &Overrides::default())?;
            commands::model::run(&cfg, model.into(), format)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}
