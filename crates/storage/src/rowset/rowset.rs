//! Rowset handles.
//!
//! A [`Rowset`] is a cheap handle over a [`RowsetMeta`] and the directory
//! holding its segment files. Handles are immutable views; the backing
//! files are guaranteed to exist until the engine unlinks them, which can
//! never delete data still referenced by a snapshot's hard links.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use tessera_core::{fs_util, Result, RowsetId, TesseraError, Version};

use crate::rowset::index_cache::IndexCache;
use crate::rowset::meta::RowsetMeta;
use crate::rowset::segment;
use crate::tablet::schema::TabletSchema;

/// Handle over one immutable rowset.
#[derive(Clone)]
pub struct Rowset {
    schema: Arc<TabletSchema>,
    dir: PathBuf,
    meta: RowsetMeta,
    index_cache: Option<Arc<IndexCache>>,
}

impl Rowset {
    /// Open a handle over an existing rowset. Performs no I/O; call
    /// [`Rowset::load`] to validate the files.
    pub fn open(schema: Arc<TabletSchema>, dir: impl Into<PathBuf>, meta: RowsetMeta) -> Self {
        Rowset {
            schema,
            dir: dir.into(),
            meta,
            index_cache: None,
        }
    }

    /// Attach the shared index cache so `load(true)` can reuse offset
    /// tables across handles.
    pub fn with_index_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.index_cache = Some(cache);
        self
    }

    /// The rowset's globally unique id.
    pub fn rowset_id(&self) -> RowsetId {
        self.meta.rowset_id
    }

    /// The version interval this rowset covers.
    pub fn version(&self) -> Version {
        self.meta.version
    }

    /// The metadata record.
    pub fn rowset_meta(&self) -> &RowsetMeta {
        &self.meta
    }

    /// Schema the rows were written under.
    pub fn schema(&self) -> &Arc<TabletSchema> {
        &self.schema
    }

    /// Directory holding the segment files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate the rowset's files and load every segment index.
    ///
    /// With `use_cache = false` the shared index cache is bypassed and
    /// indexes are read directly from disk. Restore flows must use this:
    /// a clone directory's ids may collide with cached entries belonging
    /// to other tablets.
    pub fn load(&self, use_cache: bool) -> Result<()> {
        for n in 0..self.meta.num_segments {
            match (&self.index_cache, use_cache) {
                (Some(cache), true) => {
                    cache.get_or_load(&self.dir, self.meta.rowset_id, n, self.meta.rowset_type)?;
                }
                _ => {
                    segment::load_index(&self.dir, self.meta.rowset_id, n, self.meta.rowset_type)?;
                }
            }
            // The data file must be present even when only the index is
            // consulted here.
            let data = segment::data_path(&self.dir, self.meta.rowset_id, n);
            if !data.exists() {
                return Err(TesseraError::DirNotFound { path: data });
            }
        }
        Ok(())
    }

    /// Hard-link every segment file into `dst_dir`, keyed by `id`.
    ///
    /// File names inside the rowset are preserved apart from the id
    /// component; linked files share inodes with the originals.
    pub fn link_files_to(&self, dst_dir: &Path, id: RowsetId) -> Result<()> {
        for n in 0..self.meta.num_segments {
            let src_data = segment::data_path(&self.dir, self.meta.rowset_id, n);
            let src_index = segment::index_path(&self.dir, self.meta.rowset_id, n);
            fs_util::hard_link(&src_data, &segment::data_path(dst_dir, id, n))?;
            fs_util::hard_link(&src_index, &segment::index_path(dst_dir, id, n))?;
        }
        debug!(
            rowset_id = %self.meta.rowset_id,
            version = %self.meta.version,
            dst = %dst_dir.display(),
            "linked rowset files"
        );
        Ok(())
    }

    /// Unlink this rowset's files from its directory.
    ///
    /// Only the names under [`Rowset::dir`] are removed; hard links held
    /// by snapshots keep the inodes alive.
    pub fn remove(&self) -> Result<()> {
        for n in 0..self.meta.num_segments {
            for path in [
                segment::data_path(&self.dir, self.meta.rowset_id, n),
                segment::index_path(&self.dir, self.meta.rowset_id, n),
            ] {
                match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        if let Some(cache) = &self.index_cache {
            cache.evict_rowset(self.meta.rowset_id);
        }
        debug!(rowset_id = %self.meta.rowset_id, "removed rowset files");
        Ok(())
    }

    /// Read every row of every segment, in segment order.
    pub fn read_all_rows(&self) -> Result<Vec<Vec<u8>>> {
        let mut rows = Vec::with_capacity(self.meta.num_rows as usize);
        for n in 0..self.meta.num_segments {
            rows.extend(segment::read_rows(
                &self.dir,
                self.meta.rowset_id,
                n,
                self.meta.rowset_type,
            )?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowset::writer::{RowsetWriter, RowsetWriterContext};
    use tempfile::tempdir;
    use tessera_core::{RowsetState, RowsetType, TesseraError};

    fn build_rowset(dir: &Path, rows: &[&[u8]]) -> Rowset {
        let schema = Arc::new(TabletSchema::for_testing());
        let ctx = RowsetWriterContext {
            rowset_id: RowsetId::new(11, 1),
            tablet_id: 10,
            partition_id: 1,
            tablet_schema_hash: 42,
            rowset_type: RowsetType::Modern,
            state: RowsetState::Visible,
            version: Version::new(0, 0),
            version_hash: 1,
            segments_overlap: false,
            dir: dir.to_path_buf(),
            schema,
        };
        let mut writer = RowsetWriter::new(ctx).unwrap();
        for row in rows {
            writer.add_row(row).unwrap();
        }
        writer.build().unwrap()
    }

    #[test]
    fn test_load_and_read() {
        let dir = tempdir().unwrap();
        let rowset = build_rowset(dir.path(), &[b"a", b"b"]);
        rowset.load(false).unwrap();
        assert_eq!(rowset.read_all_rows().unwrap(), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_link_files_to_other_dir() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let rowset = build_rowset(src.path(), &[b"a"]);

        rowset.link_files_to(dst.path(), rowset.rowset_id()).unwrap();

        let linked = Rowset::open(
            rowset.schema().clone(),
            dst.path(),
            rowset.rowset_meta().clone(),
        );
        linked.load(false).unwrap();
        assert_eq!(linked.read_all_rows().unwrap(), vec![b"a".to_vec()]);
    }

    #[test]
    fn test_remove_unlinks_only_own_names() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let rowset = build_rowset(src.path(), &[b"a"]);
        rowset.link_files_to(dst.path(), rowset.rowset_id()).unwrap();

        rowset.remove().unwrap();
        assert!(matches!(
            rowset.load(false),
            Err(TesseraError::DirNotFound { .. })
        ));

        // The hard links in dst still read fine.
        let linked = Rowset::open(
            rowset.schema().clone(),
            dst.path(),
            rowset.rowset_meta().clone(),
        );
        assert_eq!(linked.read_all_rows().unwrap(), vec![b"a".to_vec()]);
    }

    #[test]
    fn test_empty_rowset_has_no_files() {
        let dir = tempdir().unwrap();
        let rowset = build_rowset(dir.path(), &[]);
        assert!(rowset.rowset_meta().empty);
        assert_eq!(rowset.rowset_meta().num_segments, 0);
        rowset.load(false).unwrap();
        assert!(rowset.read_all_rows().unwrap().is_empty());
        rowset.link_files_to(dir.path(), RowsetId::new(9, 9)).unwrap();
    }
}
