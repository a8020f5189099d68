//! Publish-on-success file writes.
//!
//! Output is written to a temporary file in the destination directory and renamed
//! over the final path only after the writer closure returns `Ok` and the buffer is
//! flushed. A failed write leaves the previous file (or no file) in place.

use anyhow::{Context, Result};
use std::fs::create_dir_all;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a temporary file next to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns an error naming the directory if it cannot be created or written.
pub fn temp_sibling(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    NamedTempFile::new_in(dir).with_context(|| format!("create temp file in {}", dir.display()))
}

/// Flush and rename a finished temporary file onto `path`.
///
/// # Errors
/// Returns an error naming `path` if the rename fails.
pub fn publish(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("publish {}", path.display()))?;
    Ok(())
}

/// Write `path` atomically through `write`.
///
/// # Errors
/// Propagates errors from `write`, with the target path attached, and any I/O
/// error from creating, flushing or renaming the file.
pub fn write_atomic<F>(path: impl AsRef<Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let path = path.as_ref();
    let tmp = temp_sibling(path)?;
    let mut w = BufWriter::new(tmp);
    write(&mut w).with_context(|| format!("write {}", path.display()))?;
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    let tmp = w
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("flush {}", path.display()))?;
    publish(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn failed_write_publishes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        let res = write_atomic(&path, |w| {
            w.write_all(b"partial")?;
            anyhow::bail!("boom")
        });
        assert!(res.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn successful_write_replaces_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("out.txt");
        write_atomic(&path, |w| Ok(w.write_all(b"first")?))?;
        write_atomic(&path, |w| Ok(w.write_all(b"second")?))?;
        assert_eq!(fs::read_to_string(&path)?, "second");
        Ok(())
    }
}
