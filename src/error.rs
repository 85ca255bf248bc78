//! Error types for brainreg operations.
//!
//! Provides rich error context for library consumers.

use thiserror::Error;

/// Main error type for brainreg operations.
///
/// Covers the three places an analysis run can fail: reading the clinical
/// table, solving a regression, and configuring the sampler.
///
/// # Examples
///
/// ```
/// use brainreg::error::BrainregError;
///
/// let err = BrainregError::DimensionMismatch {
///     expected: "100x7".to_string(),
///     actual: "100x5".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum BrainregError {
    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Matrix is not positive definite (collinear design, degenerate prior).
    #[error("Singular matrix in {context}: not positive definite")]
    SingularMatrix {
        /// Where the factorization was attempted
        context: String,
    },

    /// A column required by the schema is absent from the input header.
    #[error("Missing column '{column}' (available: {available})")]
    MissingColumn {
        /// Requested column
        column: String,
        /// Comma-separated header names
        available: String,
    },

    /// A binary categorical cell holds neither of its two levels.
    #[error("Unknown category '{value}' in column '{column}' at line {line}")]
    UnknownCategory {
        /// Column name
        column: String,
        /// Offending cell
        value: String,
        /// 1-based line number in the source file
        line: usize,
    },

    /// A numeric cell could not be parsed.
    #[error("Parse error at line {line}, column '{column}': {message}")]
    Parse {
        /// 1-based line number in the source file
        line: usize,
        /// Column name
        column: String,
        /// Error details
        message: String,
    },

    /// Nothing left to work with.
    #[error("Empty input: {context}")]
    EmptyData {
        /// What was empty
        context: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Too few observations for the number of parameters.
    #[error("Insufficient samples: need more than {needed}, got {got}")]
    InsufficientSamples {
        /// Minimum number of rows (exclusive)
        needed: usize,
        /// Rows available
        got: usize,
    },

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with string message.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for BrainregError {
    fn from(msg: &str) -> Self {
        BrainregError::Other(msg.to_string())
    }
}

impl From<String> for BrainregError {
    fn from(msg: String) -> Self {
        BrainregError::Other(msg)
    }
}

impl BrainregError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyData {
            context: context.to_string(),
        }
    }

    /// Create a singular matrix error
    #[must_use]
    pub fn singular(context: &str) -> Self {
        Self::SingularMatrix {
            context: context.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, BrainregError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = BrainregError::dimension_mismatch("columns", 7, 5);
        let msg = err.to_string();
        assert!(msg.contains("dimension mismatch"));
        assert!(msg.contains("columns=7"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_missing_column_display() {
        let err = BrainregError::MissingColumn {
            column: "MMSE".to_string(),
            available: "Age, EDUC".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing column 'MMSE' (available: Age, EDUC)"
        );
    }

    #[test]
    fn test_unknown_category_display() {
        let err = BrainregError::UnknownCategory {
            column: "M/F".to_string(),
            value: "X".to_string(),
            line: 12,
        };
        assert!(err.to_string().contains("line 12"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BrainregError = io.into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_from_str() {
        let err: BrainregError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
