//! Expanding input patterns into concrete log files.
//!
//! A log directory staged from a cluster usually holds several part files
//! (`logs/2024-02-01/*.csv.gz`). Inputs given on the command line may be plain
//! paths or glob patterns; both resolve to a sorted, de-duplicated file list so
//! multi-file runs ingest in a deterministic order.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand one pattern into the sorted list of regular files it matches.
///
/// A pattern without glob metacharacters is returned as-is when it names a file.
///
/// # Errors
/// Returns an error for an invalid pattern or an unreadable directory entry.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("read glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Expand every pattern, failing if the combined result is empty.
///
/// # Errors
/// See [`expand_pattern`]; also fails when nothing matches at all.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        files.extend(expand_pattern(pattern.as_ref())?);
    }
    files.sort();
    files.dedup();
    if files.is_empty() {
        let joined: Vec<&str> = patterns.iter().map(AsRef::as_ref).collect();
        bail!("no input files match: {}", joined.join(", "));
    }
    Ok(files)
}
