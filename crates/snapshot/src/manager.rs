//! The snapshot manager.
//!
//! Engine-scoped service exporting the three snapshot operations:
//! [`SnapshotManager::make_snapshot`],
//! [`SnapshotManager::release_snapshot`], and
//! [`SnapshotManager::convert_rowset_ids`]. One instance serves the whole
//! engine; requests run on their callers' threads and may execute
//! concurrently on different tablets.
//!
//! # Directory layout produced
//!
//! ```text
//! <data-root>/snapshot/<YYYYMMDDhhmmss>.<seq>.<timeout>/
//!     <tablet-id>/
//!         <schema-hash>/
//!             <tablet-id>.hdr
//!             <rowset-id>_0.dat, <rowset-id>_0.idx, ...   (hard-linked)
//! ```
//!
//! Every failure after directory creation tears the whole snapshot tree
//! down; on success the caller owns the returned path until it calls
//! `release_snapshot`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use tessera_core::{fs_util, Result, SchemaHash, TabletId, TesseraError};
use tessera_storage::rowset::Rowset;
use tessera_storage::tablet::{Tablet, TabletHeader};
use tessera_storage::{StorageEngine, SNAPSHOT_PREFIX};

use crate::normalise::normalise_to_legacy;
use crate::path_alloc::SnapshotPathAllocator;
use crate::rebind;
use crate::request::{SnapshotFormat, SnapshotRequest};
use crate::select::{select_consistent_rowsets, SelectedRowsets};

/// Engine-scoped snapshot service.
pub struct SnapshotManager {
    engine: Arc<StorageEngine>,
    allocator: SnapshotPathAllocator,
}

impl SnapshotManager {
    /// Create a manager over an engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        SnapshotManager {
            engine,
            allocator: SnapshotPathAllocator::new(),
        }
    }

    /// Materialise a snapshot of the requested tablet.
    ///
    /// Returns the canonicalised snapshot root. On success of an
    /// incremental-mode request, `request.allow_incremental_clone` is set.
    pub fn make_snapshot(&self, request: &mut SnapshotRequest) -> Result<PathBuf> {
        let tablet = self
            .engine
            .tablet_manager()
            .get_tablet(request.tablet_id, request.schema_hash)
            .ok_or(TesseraError::TabletNotFound {
                tablet_id: request.tablet_id,
                schema_hash: request.schema_hash,
            })?;

        let snapshot_path = self.create_snapshot_files(&tablet, request)?;
        if request.is_incremental() {
            request.allow_incremental_clone = true;
        }

        info!(
            tablet_id = request.tablet_id,
            schema_hash = request.schema_hash,
            path = %snapshot_path.display(),
            "made snapshot"
        );
        Ok(snapshot_path)
    }

    /// Remove a snapshot directory previously returned by
    /// [`SnapshotManager::make_snapshot`].
    ///
    /// The path must be lexically under some registered data root's
    /// `snapshot/` subtree; anything else is refused with `IllegalPath`
    /// before any unlink happens. Releasing an already-released path
    /// reports `DirNotFound`.
    pub fn release_snapshot(&self, snapshot_path: &Path) -> Result<()> {
        for store in self.engine.stores() {
            let root = fs_util::canonicalize(store.path())?;
            let prefix = root.join(SNAPSHOT_PREFIX);
            if snapshot_path.starts_with(&prefix) {
                if !snapshot_path.exists() {
                    return Err(TesseraError::DirNotFound {
                        path: snapshot_path.to_path_buf(),
                    });
                }
                fs_util::remove_all(snapshot_path)?;
                info!(path = %snapshot_path.display(), "released snapshot");
                return Ok(());
            }
        }

        warn!(path = %snapshot_path.display(), "refused to release path outside snapshot trees");
        Err(TesseraError::IllegalPath {
            path: snapshot_path.to_path_buf(),
        })
    }

    /// Rebind the rowset ids of a received snapshot directory to fresh
    /// ids from this engine's generator.
    ///
    /// `clone_dir` must contain `<new_tablet_id>.hdr`; the file is named
    /// after the target tablet even when its body still references the
    /// source tablet (see the module docs of the rebind routine).
    pub fn convert_rowset_ids(
        &self,
        clone_dir: &Path,
        new_tablet_id: TabletId,
        new_schema_hash: SchemaHash,
    ) -> Result<()> {
        rebind::convert_rowset_ids(&self.engine, clone_dir, new_tablet_id, new_schema_hash)
    }

    /// Materialise the snapshot directory; tears the whole tree down on
    /// any failure after path allocation.
    fn create_snapshot_files(
        &self,
        tablet: &Tablet,
        request: &SnapshotRequest,
    ) -> Result<PathBuf> {
        let timeout_secs = request
            .timeout_secs
            .unwrap_or(self.engine.config().snapshot_expire_secs);
        let snapshot_id_path = self.allocator.allocate(tablet.data_dir(), timeout_secs);

        match self.fill_snapshot_dir(tablet, request, &snapshot_id_path) {
            Ok(()) => fs_util::canonicalize(&snapshot_id_path),
            Err(e) => {
                warn!(
                    tablet_id = tablet.tablet_id(),
                    path = %snapshot_id_path.display(),
                    error = %e,
                    "snapshot failed, removing its directory"
                );
                fs_util::remove_all(&snapshot_id_path).ok();
                Err(e)
            }
        }
    }

    fn fill_snapshot_dir(
        &self,
        tablet: &Tablet,
        request: &SnapshotRequest,
        snapshot_id_path: &Path,
    ) -> Result<()> {
        let schema_full_path = snapshot_id_path
            .join(tablet.tablet_id().to_string())
            .join(tablet.schema_hash().to_string());
        let header_path = schema_full_path.join(TabletHeader::file_name(tablet.tablet_id()));

        if schema_full_path.exists() {
            fs_util::remove_all(&schema_full_path)?;
        }
        fs_util::create_dir_all(&schema_full_path)?;

        let SelectedRowsets {
            rowsets,
            mut header,
            incremental,
        } = select_consistent_rowsets(tablet, request)?;

        // Selection released the header lock; rowsets published after the
        // copy are invisible from here on.
        for rowset in &rowsets {
            rowset.link_files_to(&schema_full_path, rowset.rowset_id())?;
        }

        header.clear_alter_task();
        let metas = rowsets.iter().map(|r| r.rowset_meta().clone()).collect();
        if incremental {
            header.revise_incremental(metas);
            header.revise_visible(Vec::new());
        } else {
            header.revise_visible(metas);
            header.revise_incremental(Vec::new());
        }

        match request.preferred_format {
            SnapshotFormat::V1 => {
                normalise_to_legacy(&mut header, tablet.schema(), &schema_full_path, incremental)?;
                header.save(&header_path)?;
            }
            SnapshotFormat::V2 => header.save(&header_path)?,
        }

        if !incremental {
            if let Some(requested) = request.version {
                self.warn_on_cumulative_tail(tablet, &rowsets, requested);
            }
        }
        Ok(())
    }

    /// Downstream clone and restore paths prefer the snapshot to end in a
    /// single delta; a cumulative tail at exactly the requested version is
    /// shipped as-is but flagged.
    fn warn_on_cumulative_tail(&self, tablet: &Tablet, rowsets: &[Arc<Rowset>], requested: i64) {
        for rowset in rowsets {
            let version = rowset.version();
            if version.end == requested {
                if version.start != requested {
                    warn!(
                        tablet_id = tablet.tablet_id(),
                        version = %version,
                        requested,
                        "snapshot tail is a cumulative delta at the requested version"
                    );
                }
                break;
            }
        }
    }
}
