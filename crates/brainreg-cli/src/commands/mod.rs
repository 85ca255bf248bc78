//! Subcommand implementations.

pub(crate) mod describe;
pub(crate) mod model;
pub(crate) mod ols;
pub(crate) mod run;
pub(crate) mod sample;

use crate::error::{CliError, Result};
use std::path::Path;

/// Fails with `FileNotFound` before any stage touches a missing table.
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}
