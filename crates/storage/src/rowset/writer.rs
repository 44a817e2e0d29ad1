//! Rowset writer.
//!
//! Writers are created from a [`RowsetWriterContext`] naming the identity
//! of the rowset being produced. Rows are buffered and flushed into
//! fixed-size segments; `build` emits the final segment and returns the
//! finished [`Rowset`] handle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use tessera_core::{
    PartitionId, Result, RowsetId, RowsetState, RowsetType, SchemaHash, TabletId, TesseraError,
    Version, VersionHash,
};

use crate::rowset::meta::RowsetMeta;
use crate::rowset::rowset::Rowset;
use crate::rowset::segment;
use crate::tablet::schema::TabletSchema;

/// Rows buffered before a segment pair is flushed to disk.
pub const ROWS_PER_SEGMENT: usize = 4096;

/// Identity and placement of the rowset a writer will produce.
#[derive(Clone, Debug)]
pub struct RowsetWriterContext {
    /// Id of the rowset being written.
    pub rowset_id: RowsetId,
    /// Owning tablet.
    pub tablet_id: TabletId,
    /// Partition of the owning tablet.
    pub partition_id: PartitionId,
    /// Schema hash of the owning tablet.
    pub tablet_schema_hash: SchemaHash,
    /// Physical layout to emit.
    pub rowset_type: RowsetType,
    /// Lifecycle state recorded in the meta.
    pub state: RowsetState,
    /// Version interval recorded in the meta.
    pub version: Version,
    /// Content hash recorded in the meta.
    pub version_hash: VersionHash,
    /// Whether segments may contain overlapping key ranges.
    pub segments_overlap: bool,
    /// Directory the segment files are written into.
    pub dir: PathBuf,
    /// Schema the rows are written under.
    pub schema: Arc<TabletSchema>,
}

/// Streams rows into segment files and produces a [`Rowset`].
#[derive(Debug)]
pub struct RowsetWriter {
    ctx: RowsetWriterContext,
    pending: Vec<Vec<u8>>,
    segments_written: u32,
    total_rows: u64,
}

impl RowsetWriter {
    /// Create a writer; the target directory must already exist.
    pub fn new(ctx: RowsetWriterContext) -> Result<Self> {
        if !ctx.dir.is_dir() {
            return Err(TesseraError::DirNotFound {
                path: ctx.dir.clone(),
            });
        }
        Ok(RowsetWriter {
            ctx,
            pending: Vec::new(),
            segments_written: 0,
            total_rows: 0,
        })
    }

    /// Append one row.
    pub fn add_row(&mut self, row: &[u8]) -> Result<()> {
        self.pending.push(row.to_vec());
        self.total_rows += 1;
        if self.pending.len() >= ROWS_PER_SEGMENT {
            self.flush_segment()?;
        }
        Ok(())
    }

    /// Stream every row of an existing rowset into this writer.
    pub fn add_rowset(&mut self, src: &Rowset) -> Result<()> {
        for row in src.read_all_rows()? {
            self.add_row(&row)?;
        }
        Ok(())
    }

    fn flush_segment(&mut self) -> Result<()> {
        let rows = std::mem::take(&mut self.pending);
        segment::write_segment(
            &self.ctx.dir,
            self.ctx.rowset_id,
            self.segments_written,
            &rows,
            self.ctx.rowset_type,
        )?;
        self.segments_written += 1;
        Ok(())
    }

    /// Flush remaining rows and return the finished rowset.
    pub fn build(mut self) -> Result<Rowset> {
        if !self.pending.is_empty() {
            self.flush_segment()?;
        }

        let creation_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TesseraError::RowsetBuildFailed {
                rowset_id: self.ctx.rowset_id,
            })?
            .as_secs() as i64;

        let meta = RowsetMeta {
            rowset_id: self.ctx.rowset_id,
            tablet_id: self.ctx.tablet_id,
            partition_id: self.ctx.partition_id,
            tablet_schema_hash: self.ctx.tablet_schema_hash,
            rowset_type: self.ctx.rowset_type,
            state: self.ctx.state,
            version: self.ctx.version,
            version_hash: self.ctx.version_hash,
            num_rows: self.total_rows,
            num_segments: self.segments_written,
            empty: self.total_rows == 0,
            segments_overlap: self.ctx.segments_overlap,
            creation_time,
        };
        debug!(
            rowset_id = %meta.rowset_id,
            version = %meta.version,
            num_rows = meta.num_rows,
            num_segments = meta.num_segments,
            "built rowset"
        );
        Ok(Rowset::open(self.ctx.schema, self.ctx.dir, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ctx(dir: PathBuf, layout: RowsetType) -> RowsetWriterContext {
        RowsetWriterContext {
            rowset_id: RowsetId::new(5, 5),
            tablet_id: 10,
            partition_id: 1,
            tablet_schema_hash: 42,
            rowset_type: layout,
            state: RowsetState::Visible,
            version: Version::new(1, 3),
            version_hash: 77,
            segments_overlap: true,
            dir,
            schema: Arc::new(TabletSchema::for_testing()),
        }
    }

    #[test]
    fn test_writer_meta_reflects_context() {
        let dir = tempdir().unwrap();
        let mut writer = RowsetWriter::new(ctx(dir.path().to_path_buf(), RowsetType::Modern)).unwrap();
        writer.add_row(b"one").unwrap();
        writer.add_row(b"two").unwrap();
        let rowset = writer.build().unwrap();

        let meta = rowset.rowset_meta();
        assert_eq!(meta.version, Version::new(1, 3));
        assert_eq!(meta.version_hash, 77);
        assert!(meta.segments_overlap);
        assert_eq!(meta.num_rows, 2);
        assert_eq!(meta.num_segments, 1);
        assert!(!meta.empty);
    }

    #[test]
    fn test_writer_splits_segments() {
        let dir = tempdir().unwrap();
        let mut writer = RowsetWriter::new(ctx(dir.path().to_path_buf(), RowsetType::Modern)).unwrap();
        for i in 0..(ROWS_PER_SEGMENT + 3) {
            writer.add_row(format!("row-{i}").as_bytes()).unwrap();
        }
        let rowset = writer.build().unwrap();
        assert_eq!(rowset.rowset_meta().num_segments, 2);
        assert_eq!(rowset.read_all_rows().unwrap().len(), ROWS_PER_SEGMENT + 3);
    }

    #[test]
    fn test_add_rowset_streams_rows() {
        let dir = tempdir().unwrap();
        let mut writer = RowsetWriter::new(ctx(dir.path().to_path_buf(), RowsetType::Modern)).unwrap();
        writer.add_row(b"a").unwrap();
        writer.add_row(b"b").unwrap();
        let src = writer.build().unwrap();

        let mut dst_ctx = ctx(dir.path().to_path_buf(), RowsetType::Legacy);
        dst_ctx.rowset_id = RowsetId::new(5, 6);
        let mut writer = RowsetWriter::new(dst_ctx).unwrap();
        writer.add_rowset(&src).unwrap();
        let dst = writer.build().unwrap();

        assert_eq!(dst.read_all_rows().unwrap(), src.read_all_rows().unwrap());
        assert_eq!(dst.rowset_meta().rowset_type, RowsetType::Legacy);
    }

    #[test]
    fn test_writer_requires_existing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = RowsetWriter::new(ctx(missing, RowsetType::Modern)).unwrap_err();
        assert!(matches!(err, TesseraError::DirNotFound { .. }));
    }
}
