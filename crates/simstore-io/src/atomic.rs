//! Atomic file replacement: write into a uniquely named temp file next to the
//! target, sync, then rename over the target. The temp file is deleted when
//! dropped, so every failure path leaves the target untouched.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};

/// Directory a path lives in (`.` for bare file names).
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create a temp file in the target's directory, creating the directory if
/// needed.
pub(crate) fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir).map_err(|e| StoreError::io("create directory", dir, e))?;
    tempfile::Builder::new()
        .prefix(".simstore-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| StoreError::io("create", dir, e))
}

/// Sync a finished temp file and rename it over `path`.
pub(crate) fn persist(temp: NamedTempFile, path: &Path) -> Result<()> {
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io("sync", temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io("replace", path, e.error))?;
    Ok(())
}

/// Replace `path` with `bytes`.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = temp_beside(path)?;
    temp.write_all(bytes)
        .map_err(|e| StoreError::io("write", temp.path(), e))?;
    persist(temp, path)
}
