//! Error types for brainreg-cli
//!
//! Every failure maps to a distinct process exit code.

use brainreg::BrainregError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file missing
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The table could not be read or cleaned
    #[error("Data error: {0}")]
    Data(String),

    /// Fitting or sampling failed
    #[error("Model error: {0}")]
    Model(String),

    /// Settings could not be loaded or are invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::Data(_) => ExitCode::from(4),
            Self::Model(_) => ExitCode::from(5),
            Self::Config(_) => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
        }
    }
}

impl From<BrainregError> for CliError {
    fn from(e: BrainregError) -> Self {
        match e {
            BrainregError::Io(io) => Self::Io(io),
            BrainregError::InvalidHyperparameter { .. } => Self::Config(e.to_string()),
            BrainregError::MissingColumn { .. }
            | BrainregError::UnknownCategory { .. }
            | BrainregError::Parse { .. }
            | BrainregError::EmptyData { .. }
            | BrainregError::Csv(_) => Self::Data(e.to_string()),
            BrainregError::DimensionMismatch { .. }
            | BrainregError::SingularMatrix { .. }
            | BrainregError::InsufficientSamples { .. }
            | BrainregError::Other(_) => Self::Model(e.to_string()),
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Io(std::io::Error::other(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::FileNotFound(PathBuf::from("x.csv")).exit_code(),
            ExitCode::from(3)
        );
        assert_eq!(CliError::Data("bad".into()).exit_code(), ExitCode::from(4));
        assert_eq!(CliError::Model("bad".into()).exit_code(), ExitCode::from(5));
        assert_eq!(CliError::Config("bad".into()).exit_code(), ExitCode::from(6));
    }

    #[test]
    fn test_library_error_mapping() {
        let data: CliError = BrainregError::MissingColumn {
            column: "MMSE".into(),
            available: "Age".into(),
        }
        .into();
        assert!(matches!(data, CliError::Data(_)));

        let model: CliError = BrainregError::singular("OLS normal equations").into();
        assert!(matches!(model, CliError::Model(_)));

        let config: CliError = BrainregError::InvalidHyperparameter {
            param: "thin".into(),
            value: "0".into(),
            constraint: ">= 1".into(),
        }
        .into();
        assert!(matches!(config, CliError::Config(_)));

        let io: CliError =
            BrainregError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into();
        assert!(matches!(io, CliError::Io(_)));
    }
}
