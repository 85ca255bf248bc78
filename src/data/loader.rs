//! CSV loading and row-wise cleaning for the clinical visit table.

use super::DataFrame;
use crate::error::{BrainregError, Result};
use crate::primitives::Vector;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Cell values treated as missing (after trimming). Numeric cells that parse
/// to NaN or an infinity are counted as missing too.
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "."];

/// Recoding of a two-level categorical column to 0/1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryEncoding {
    /// Source column in the CSV header
    pub column: String,
    /// Name of the encoded column in the cleaned frame
    pub output: String,
    /// Level mapped to 0.0
    pub zero: String,
    /// Level mapped to 1.0
    pub one: String,
}

impl BinaryEncoding {
    fn encode(&self, value: &str) -> Option<f64> {
        if value == self.zero {
            Some(0.0)
        } else if value == self.one {
            Some(1.0)
        } else {
            None
        }
    }
}

/// Columns retained from the raw file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Numeric columns kept as-is
    pub numeric: Vec<String>,
    /// Two-level categorical columns recoded to 0/1
    #[serde(default)]
    pub binary: Vec<BinaryEncoding>,
}

impl Default for Schema {
    /// OASIS longitudinal layout: demographics, MMSE and anatomic volumes,
    /// with `M/F` recoded as `Gender` (F = 0, M = 1).
    fn default() -> Self {
        Self {
            numeric: ["Age", "EDUC", "SES", "MMSE", "eTIV", "nWBV"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            binary: vec![BinaryEncoding {
                column: "M/F".to_string(),
                output: "Gender".to_string(),
                zero: "F".to_string(),
                one: "M".to_string(),
            }],
        }
    }
}

impl Schema {
    /// Names of the columns in the cleaned frame, in output order.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        self.numeric
            .iter()
            .cloned()
            .chain(self.binary.iter().map(|b| b.output.clone()))
            .collect()
    }
}

/// Per-column count of missing cells seen while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    /// Source column
    pub column: String,
    /// Number of missing cells
    pub count: usize,
}

/// What the cleaning pass did.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    /// Data rows read (header excluded)
    pub rows_read: usize,
    /// Rows with every retained value present
    pub rows_kept: usize,
    /// Rows dropped for a missing value
    pub rows_dropped: usize,
    /// Missing cells per retained column
    pub missing_by_column: Vec<MissingCount>,
}

/// Cleaned frame plus the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleanData {
    /// Complete-case table
    pub frame: DataFrame,
    /// Cleaning summary
    pub report: CleaningReport,
}

/// Reads the clinical CSV and performs complete-case cleaning.
pub struct CsvLoader;

enum Slot<'a> {
    Numeric,
    Binary(&'a BinaryEncoding),
}

impl CsvLoader {
    /// Load and clean a CSV file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, a schema column is missing,
    /// a cell cannot be parsed, or no complete rows remain.
    pub fn load<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<CleanData> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening clinical table");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, schema)
    }

    /// Load and clean CSV data from any reader.
    ///
    /// # Errors
    /// Same as [`CsvLoader::load`].
    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<CleanData> {
        if schema.numeric.is_empty() && schema.binary.is_empty() {
            return Err(BrainregError::empty_input("schema selects no columns"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let locate = |column: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| BrainregError::MissingColumn {
                    column: column.to_string(),
                    available: headers.iter().collect::<Vec<_>>().join(", "),
                })
        };

        let mut slots: Vec<(usize, &str, Slot<'_>)> = Vec::new();
        for name in &schema.numeric {
            slots.push((locate(name)?, name.as_str(), Slot::Numeric));
        }
        for enc in &schema.binary {
            slots.push((locate(&enc.column)?, enc.column.as_str(), Slot::Binary(enc)));
        }

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); slots.len()];
        let mut missing = vec![0usize; slots.len()];
        let mut row = vec![0.0; slots.len()];
        let mut rows_read = 0usize;

        for (offset, result) in reader.records().enumerate() {
            let record = result?;
            // header is line 1
            let line = record
                .position()
                .map_or(offset + 2, |p| p.line() as usize);
            rows_read += 1;

            let mut complete = true;
            for (k, (idx, name, slot)) in slots.iter().enumerate() {
                let cell = record.get(*idx).unwrap_or("");
                if MISSING_MARKERS.contains(&cell) {
                    missing[k] += 1;
                    complete = false;
                    continue;
                }
                row[k] = match slot {
                    Slot::Numeric => {
                        let value = cell.parse::<f64>().map_err(|e| BrainregError::Parse {
                            line,
                            column: (*name).to_string(),
                            message: format!("'{cell}': {e}"),
                        })?;
                        // "inf", "NAN" and friends parse but are not observations
                        if !value.is_finite() {
                            missing[k] += 1;
                            complete = false;
                            continue;
                        }
                        value
                    }
                    Slot::Binary(enc) => {
                        enc.encode(cell)
                            .ok_or_else(|| BrainregError::UnknownCategory {
                                column: enc.column.clone(),
                                value: cell.to_string(),
                                line,
                            })?
                    }
                };
            }

            if complete {
                for (col, value) in columns.iter_mut().zip(row.iter()) {
                    col.push(*value);
                }
            }
        }

        let rows_kept = columns.first().map_or(0, Vec::len);
        if rows_kept == 0 {
            return Err(BrainregError::empty_input(&format!(
                "no complete rows among {rows_read} read"
            )));
        }

        let report = CleaningReport {
            rows_read,
            rows_kept,
            rows_dropped: rows_read - rows_kept,
            missing_by_column: slots
                .iter()
                .zip(missing)
                .map(|((_, name, _), count)| MissingCount {
                    column: (*name).to_string(),
                    count,
                })
                .collect(),
        };

        tracing::info!(
            rows_read = report.rows_read,
            rows_kept = report.rows_kept,
            rows_dropped = report.rows_dropped,
            "clinical table cleaned"
        );

        let frame = DataFrame::new(
            schema
                .output_columns()
                .into_iter()
                .zip(columns)
                .map(|(name, values)| (name, Vector::from_vec(values)))
                .collect(),
        )?;

        Ok(CleanData { frame, report })
    }
}
