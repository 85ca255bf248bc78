//! Matrix type for 2D numeric data.

use super::Vector;
use crate::error::{BrainregError, Result};
use serde::{Deserialize, Serialize};

const PIVOT_TOLERANCE: f64 = 1e-10;

/// A 2D matrix of floating-point values (row-major storage).
///
/// # Examples
///
/// ```
/// use brainreg::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> std::result::Result<Self, &'static str> {
        if data.len() != rows * cols {
            return Err("Data length must equal rows * cols");
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrows a row as a slice.
    #[must_use]
    pub fn row_slice(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns a row as a Vector.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> Vector<T> {
        Vector::from_slice(self.row_slice(row_idx))
    }

    /// Returns a column as a Vector.
    #[must_use]
    pub fn column(&self, col_idx: usize) -> Vector<T> {
        let data: Vec<T> = (0..self.rows)
            .map(|row| self.data[row * self.cols + col_idx])
            .collect();
        Vector::from_vec(data)
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<f64> {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn eye(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self {
            data,
            rows: n,
            cols: n,
        }
    }

    /// Transposes the matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut data = vec![0.0; self.rows * self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Matrix-matrix multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn matmul(&self, other: &Self) -> std::result::Result<Self, &'static str> {
        if self.cols != other.rows {
            return Err("Matrix dimensions don't match for multiplication");
        }

        let mut result = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    result[i * other.cols + j] += a * other.get(k, j);
                }
            }
        }

        Ok(Self {
            data: result,
            rows: self.rows,
            cols: other.cols,
        })
    }

    /// Matrix-vector multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn matvec(&self, vec: &Vector<f64>) -> std::result::Result<Vector<f64>, &'static str> {
        if self.cols != vec.len() {
            return Err("Matrix columns must match vector length");
        }

        let v = vec.as_slice();
        let result: Vec<f64> = (0..self.rows)
            .map(|i| {
                self.row_slice(i)
                    .iter()
                    .zip(v.iter())
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect();

        Ok(Vector::from_vec(result))
    }

    /// Gram matrix `XᵀX`.
    #[must_use]
    pub fn gram(&self) -> Self {
        let p = self.cols;
        let mut data = vec![0.0; p * p];
        for i in 0..self.rows {
            let row = self.row_slice(i);
            for a in 0..p {
                let ra = row[a];
                for b in a..p {
                    data[a * p + b] += ra * row[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                data[a * p + b] = data[b * p + a];
            }
        }
        Self {
            data,
            rows: p,
            cols: p,
        }
    }

    /// `Xᵀv` without materialising the transpose.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` does not have one entry per row.
    pub fn t_matvec(&self, v: &Vector<f64>) -> std::result::Result<Vector<f64>, &'static str> {
        if self.rows != v.len() {
            return Err("Matrix rows must match vector length");
        }
        let mut out = vec![0.0; self.cols];
        for i in 0..self.rows {
            let vi = v[i];
            for (o, x) in out.iter_mut().zip(self.row_slice(i)) {
                *o += x * vi;
            }
        }
        Ok(Vector::from_vec(out))
    }

    /// Multiplies each element by a scalar.
    #[must_use]
    pub fn mul_scalar(&self, scalar: f64) -> Self {
        Self {
            data: self.data.iter().map(|x| x * scalar).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Adds `value` to every diagonal element.
    #[must_use]
    pub fn add_diagonal(&self, value: f64) -> Self {
        let mut out = self.clone();
        for i in 0..self.rows.min(self.cols) {
            out.data[i * self.cols + i] += value;
        }
        out
    }

    /// Prepends a column of ones (intercept column).
    #[must_use]
    pub fn with_intercept_column(&self) -> Self {
        let mut data = Vec::with_capacity(self.rows * (self.cols + 1));
        for i in 0..self.rows {
            data.push(1.0);
            data.extend_from_slice(self.row_slice(i));
        }
        Self {
            data,
            rows: self.rows,
            cols: self.cols + 1,
        }
    }

    /// Cholesky factorization `A = L Lᵀ`, returning the lower factor `L`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the matrix is not square and
    /// `SingularMatrix` if it is not positive definite.
    pub fn cholesky(&self) -> Result<Self> {
        if self.rows != self.cols {
            return Err(BrainregError::DimensionMismatch {
                expected: "square matrix".to_string(),
                actual: format!("{}x{}", self.rows, self.cols),
            });
        }

        let n = self.rows;
        let mut l = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;

                if i == j {
                    for k in 0..j {
                        sum += l[j * n + k] * l[j * n + k];
                    }
                    let diag = self.get(j, j) - sum;
                    // relative pivot floor catches rank deficiency lost to rounding
                    if diag <= PIVOT_TOLERANCE * self.get(j, j).abs() || !diag.is_finite() {
                        return Err(BrainregError::singular("Cholesky decomposition"));
                    }
                    l[j * n + j] = diag.sqrt();
                } else {
                    for k in 0..j {
                        sum += l[i * n + k] * l[j * n + k];
                    }
                    l[i * n + j] = (self.get(i, j) - sum) / l[j * n + j];
                }
            }
        }

        Ok(Self {
            data: l,
            rows: n,
            cols: n,
        })
    }

    /// Forward substitution `L y = b` with `self` lower triangular.
    ///
    /// # Errors
    ///
    /// Returns an error if `b` has the wrong length.
    pub fn solve_lower(&self, b: &[f64]) -> Result<Vec<f64>> {
        let n = self.rows;
        if b.len() != n {
            return Err(BrainregError::dimension_mismatch("rhs length", n, b.len()));
        }
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..i {
                sum += self.get(i, j) * y[j];
            }
            y[i] = (b[i] - sum) / self.get(i, i);
        }
        Ok(y)
    }

    /// Backward substitution `Lᵀ x = y` with `self` lower triangular.
    ///
    /// # Errors
    ///
    /// Returns an error if `y` has the wrong length.
    pub fn solve_upper_transposed(&self, y: &[f64]) -> Result<Vec<f64>> {
        let n = self.rows;
        if y.len() != n {
            return Err(BrainregError::dimension_mismatch("rhs length", n, y.len()));
        }
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1)..n {
                sum += self.get(j, i) * x[j];
            }
            x[i] = (y[i] - sum) / self.get(i, i);
        }
        Ok(x)
    }

    /// Solves the linear system Ax = b using Cholesky decomposition.
    ///
    /// The matrix must be symmetric positive definite.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square or not positive definite.
    pub fn cholesky_solve(&self, b: &Vector<f64>) -> Result<Vector<f64>> {
        if self.rows != b.len() {
            return Err(BrainregError::dimension_mismatch(
                "matrix rows",
                self.rows,
                b.len(),
            ));
        }
        let l = self.cholesky()?;
        let y = l.solve_lower(b.as_slice())?;
        Ok(Vector::from_vec(l.solve_upper_transposed(&y)?))
    }

    /// Inverse of a symmetric positive-definite matrix.
    ///
    /// # Errors
    ///
    /// Returns `SingularMatrix` if the matrix is not positive definite.
    pub fn inverse_spd(&self) -> Result<Self> {
        let l = self.cholesky()?;
        let n = self.rows;
        let mut inv = Self::zeros(n, n);
        let mut e = vec![0.0; n];
        for col in 0..n {
            e.iter_mut().for_each(|x| *x = 0.0);
            e[col] = 1.0;
            let y = l.solve_lower(&e)?;
            let x = l.solve_upper_transposed(&y)?;
            for (row, value) in x.into_iter().enumerate() {
                inv.set(row, col, value);
            }
        }
        Ok(inv)
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
