//! Filesystem helpers shared by the storage and snapshot crates.
//!
//! All helpers return [`TesseraError`] so call sites stay on the unified
//! error type. Durable writes follow the write-fsync-rename pattern:
//!
//! 1. Write to a temporary sibling (`<name>.tmp`)
//! 2. fsync the temporary file
//! 3. Atomic rename to the final path
//! 4. fsync the parent directory

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TesseraError};

/// Canonicalize a path, mapping a missing target to
/// [`TesseraError::DirNotFound`].
pub fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TesseraError::DirNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TesseraError::Io(e)
        }
    })
}

/// Recursively remove a directory tree. Missing targets are not an error.
pub fn remove_all(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed directory tree");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TesseraError::Io(e)),
    }
}

/// Create a directory and all parents, mapping failure to
/// [`TesseraError::CannotCreateDir`].
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| TesseraError::CannotCreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Hard-link `src` to `dst`, mapping failure to [`TesseraError::LinkFailed`].
///
/// The link shares the source inode, so removing either name never deletes
/// the underlying data while the other name exists.
pub fn hard_link(src: &Path, dst: &Path) -> Result<()> {
    std::fs::hard_link(src, dst).map_err(|e| TesseraError::LinkFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })
}

/// Durably write `bytes` to `path` using write-fsync-rename.
///
/// Either the complete new content is visible at `path` or the previous
/// content is; a crash can never expose a partial file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(path);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;

    if let Some(parent) = path.parent() {
        if parent.exists() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
