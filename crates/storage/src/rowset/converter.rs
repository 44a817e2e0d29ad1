//! Modern-to-Legacy rowset conversion.
//!
//! Old-format clone targets can only ingest the Legacy segment layout.
//! The converter re-emits a Modern rowset's rows as Legacy files under the
//! same rowset id in the destination directory and returns the refreshed
//! meta. Only the snapshot format normaliser calls this.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use tessera_core::{Result, RowsetType, TesseraError};

use crate::rowset::meta::RowsetMeta;
use crate::rowset::rowset::Rowset;
use crate::rowset::writer::{RowsetWriter, RowsetWriterContext};
use crate::tablet::schema::TabletSchema;

/// Re-emits rowsets in the Legacy physical layout.
pub struct RowsetConverter {
    schema: Arc<TabletSchema>,
}

impl RowsetConverter {
    /// Create a converter for rowsets written under `schema`.
    pub fn new(schema: Arc<TabletSchema>) -> Self {
        RowsetConverter { schema }
    }

    /// Convert one Modern rowset in `dir` to the Legacy layout.
    ///
    /// Rows are materialised first because source and destination share
    /// both the directory and the rowset id; the Modern files are removed
    /// before the Legacy files are written. A failure mid-way may leave
    /// partial files behind; callers tear the enclosing directory down.
    pub fn modern_to_legacy(&self, meta: &RowsetMeta, dir: &Path) -> Result<RowsetMeta> {
        if meta.rowset_type != RowsetType::Modern {
            return Err(TesseraError::ConversionFailed {
                rowset_id: meta.rowset_id,
                detail: format!("rowset is already {:?}", meta.rowset_type),
            });
        }

        let source = Rowset::open(self.schema.clone(), dir, meta.clone());
        source.load(false)?;
        let rows = source.read_all_rows()?;
        source.remove()?;

        let ctx = RowsetWriterContext {
            rowset_id: meta.rowset_id,
            tablet_id: meta.tablet_id,
            partition_id: meta.partition_id,
            tablet_schema_hash: meta.tablet_schema_hash,
            rowset_type: RowsetType::Legacy,
            state: meta.state,
            version: meta.version,
            version_hash: meta.version_hash,
            segments_overlap: meta.segments_overlap,
            dir: dir.to_path_buf(),
            schema: self.schema.clone(),
        };
        let mut writer = RowsetWriter::new(ctx)?;
        for row in &rows {
            writer.add_row(row)?;
        }
        let legacy = writer.build()?;
        legacy.load(false)?;

        info!(
            rowset_id = %meta.rowset_id,
            version = %meta.version,
            num_rows = meta.num_rows,
            "converted rowset to legacy layout"
        );
        Ok(legacy.rowset_meta().clone())
    }
}
