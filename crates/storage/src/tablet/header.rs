//! Tablet header files.
//!
//! The header is the tablet's durable metadata: identity, schema, and the
//! visible/incremental rowset meta lists. It is stored as JSON in
//! `<tablet_id>.hdr` and written with write-fsync-rename so a crash never
//! exposes a partial header. Snapshots carry a rewritten copy of the live
//! header; restore rewrites it again after rebinding rowset ids.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tessera_core::{fs_util, Result, SchemaHash, TabletId, TesseraError, Version};

use crate::rowset::meta::RowsetMeta;
use crate::tablet::schema::TabletSchema;

/// Pending schema-change bookkeeping; dropped from snapshot headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterTask {
    /// The tablet being altered into.
    pub related_tablet_id: TabletId,
    /// Schema hash of the altered tablet.
    pub related_schema_hash: SchemaHash,
}

/// Durable tablet metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabletHeader {
    /// Tablet identity.
    pub tablet_id: TabletId,
    /// Schema hash of the identity pair.
    pub schema_hash: SchemaHash,
    /// Schema descriptor.
    pub schema: TabletSchema,
    /// Rowsets participating in the read view (full history).
    pub visible_rowsets: Vec<RowsetMeta>,
    /// Single-delta rowsets retained for shipping individual versions.
    pub incremental_rowsets: Vec<RowsetMeta>,
    /// In-flight schema change, if any.
    pub alter_task: Option<AlterTask>,
    /// Unix seconds at tablet creation.
    pub creation_time: i64,
}

impl TabletHeader {
    /// Create a header for a fresh, empty tablet.
    pub fn new(
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        schema: TabletSchema,
        creation_time: i64,
    ) -> Self {
        TabletHeader {
            tablet_id,
            schema_hash,
            schema,
            visible_rowsets: Vec::new(),
            incremental_rowsets: Vec::new(),
            alter_task: None,
            creation_time,
        }
    }

    /// File name of a tablet's header: `<tablet_id>.hdr`.
    pub fn file_name(tablet_id: TabletId) -> String {
        format!("{tablet_id}.hdr")
    }

    /// Load a header from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TesseraError::DirNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(TesseraError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| TesseraError::HeaderInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Durably write the header to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| TesseraError::HeaderInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        fs_util::atomic_write(path, &json)?;
        debug!(
            tablet_id = self.tablet_id,
            path = %path.display(),
            visible = self.visible_rowsets.len(),
            incremental = self.incremental_rowsets.len(),
            "saved tablet header"
        );
        Ok(())
    }

    /// Highest end-version among the visible rowsets.
    pub fn max_version(&self) -> Option<Version> {
        self.visible_rowsets
            .iter()
            .map(|m| m.version)
            .max_by_key(|v| v.end)
    }

    /// Replace the visible rowset list.
    pub fn revise_visible(&mut self, metas: Vec<RowsetMeta>) {
        self.visible_rowsets = metas;
    }

    /// Replace the incremental rowset list.
    pub fn revise_incremental(&mut self, metas: Vec<RowsetMeta>) {
        self.incremental_rowsets = metas;
    }

    /// Drop any in-flight schema-change bookkeeping.
    pub fn clear_alter_task(&mut self) {
        self.alter_task = None;
    }
}
