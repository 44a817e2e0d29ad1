//! Data roots.
//!
//! Each data root holds a `data/` tree of tablet directories and a
//! `snapshot/` tree of materialised snapshots. ReleaseSnapshot's prefix
//! rule is anchored on these roots.

use std::path::{Path, PathBuf};

use tessera_core::{fs_util, Result};

/// Name of the snapshot subtree under every data root.
pub const SNAPSHOT_PREFIX: &str = "snapshot";

/// One storage root registered with the engine.
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    /// Register a data root, creating its `data/` and `snapshot/` subtrees.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs_util::create_dir_all(&path.join("data"))?;
        fs_util::create_dir_all(&path.join(SNAPSHOT_PREFIX))?;
        Ok(DataDir { path })
    }

    /// The root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The root's snapshot subtree.
    pub fn snapshot_root(&self) -> PathBuf {
        self.path.join(SNAPSHOT_PREFIX)
    }
}
