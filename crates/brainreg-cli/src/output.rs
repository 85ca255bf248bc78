//! Output formatting utilities

use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Format {
    /// Aligned text tables
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[PASS]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an error message
pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Print a block of preformatted text
pub(crate) fn block(body: impl Display) {
    println!("{body}");
}

/// Print any serializable value as JSON
pub(crate) fn json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Convergence verdict line
pub(crate) fn convergence(model: &str, converged: bool, threshold: f64) {
    if converged {
        success(&format!("{model}: all R-hat < {threshold}"));
    } else {
        warning(&format!("{model}: some R-hat >= {threshold}; run longer chains"));
    }
}
