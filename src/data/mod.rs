//! Clinical visit table: named columns, CSV loading, cleaning.
//!
//! The loader reads the OASIS-style layout (one row per MRI visit), keeps the
//! columns named by a [`Schema`], drops every row with a missing retained
//! value, and recodes two-level categorical columns to 0/1.

mod loader;

pub use loader::{BinaryEncoding, CleanData, CleaningReport, CsvLoader, Schema, MISSING_MARKERS};

use crate::error::{BrainregError, Result};
use crate::primitives::{Matrix, Vector};
use serde::Serialize;

/// A minimal `DataFrame` with named `f64` columns.
///
/// # Examples
///
/// ```
/// use brainreg::data::DataFrame;
/// use brainreg::primitives::Vector;
///
/// let columns = vec![
///     ("Age".to_string(), Vector::from_slice(&[71.0, 74.0, 80.0])),
///     ("MMSE".to_string(), Vector::from_slice(&[29.0, 27.0, 24.0])),
/// ];
/// let df = DataFrame::new(columns).expect("DataFrame creation should succeed with valid columns");
/// assert_eq!(df.shape(), (3, 2));
/// ```
#[derive(Debug, Clone)]
pub struct DataFrame {
    columns: Vec<(String, Vector<f64>)>,
    n_rows: usize,
}

impl DataFrame {
    /// Creates a new `DataFrame` from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if columns have different lengths, a name is empty or
    /// duplicated, or no columns are given.
    pub fn new(columns: Vec<(String, Vector<f64>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err("DataFrame must have at least one column".into());
        }

        let n_rows = columns[0].1.len();

        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(BrainregError::dimension_mismatch(
                    &format!("rows in column '{name}'"),
                    n_rows,
                    col.len(),
                ));
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("Duplicate column name '{}'", dup[0]).into());
        }

        Ok(Self { columns, n_rows })
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Vector<f64>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| BrainregError::MissingColumn {
                column: name.to_string(),
                available: self.column_names().join(", "),
            })
    }

    /// Selects multiple columns by name, returning a new `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns an error if any column doesn't exist.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err("Must select at least one column".into());
        }

        let mut selected = Vec::with_capacity(names.len());
        for &name in names {
            let col = self.column(name)?;
            selected.push((name.to_string(), col.clone()));
        }

        Self::new(selected)
    }

    /// Stacks the named columns into an `n_rows × names.len()` matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if any column doesn't exist.
    pub fn to_matrix(&self, names: &[&str]) -> Result<Matrix<f64>> {
        let cols: Vec<&Vector<f64>> = names
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let mut data = Vec::with_capacity(self.n_rows * cols.len());
        for row_idx in 0..self.n_rows {
            for col in &cols {
                data.push(col[row_idx]);
            }
        }

        Ok(Matrix::from_vec(self.n_rows, cols.len(), data)?)
    }

    /// Returns an iterator over columns as (name, vector) pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Vector<f64>)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Adds a new column to the `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns an error if column length doesn't match or name already exists.
    pub fn add_column(&mut self, name: String, data: Vector<f64>) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(BrainregError::dimension_mismatch(
                "column length",
                self.n_rows,
                data.len(),
            ));
        }

        if self.columns.iter().any(|(n, _)| n == &name) {
            return Err(format!("Column '{name}' already exists").into());
        }

        if name.is_empty() {
            return Err("Column name cannot be empty".into());
        }

        self.columns.push((name, data));
        Ok(())
    }

    /// Returns descriptive statistics for all columns.
    #[must_use]
    pub fn describe(&self) -> Vec<ColumnStats> {
        self.columns
            .iter()
            .map(|(name, col)| {
                let values = col.as_slice();
                ColumnStats {
                    name: name.clone(),
                    count: values.len(),
                    mean: col.mean(),
                    std: col.variance().sqrt(),
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    median: crate::stats::quantile(values, 0.5).unwrap_or(f64::NAN),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect()
    }
}

/// Descriptive statistics for a column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of elements.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Standard deviation.
    pub std: f64,
    /// Minimum value.
    pub min: f64,
    /// Median value.
    pub median: f64,
    /// Maximum value.
    pub max: f64,
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
