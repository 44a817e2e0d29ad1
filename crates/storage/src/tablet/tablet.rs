//! Live tablet handles.
//!
//! A [`Tablet`] owns its directory under a data root and a single
//! `RwLock` — the *header lock* — guarding the header together with the
//! maps of published rowsets. Writers (ingestion, compaction) take the
//! lock exclusively to publish; snapshot selection takes it shared so the
//! rowset list and the header copy it returns describe the same observed
//! state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::info;

use tessera_core::{
    fs_util, PartitionId, Result, SchemaHash, TabletId, TesseraError, Version,
};

use crate::rowset::index_cache::IndexCache;
use crate::rowset::rowset::Rowset;
use crate::tablet::header::TabletHeader;
use crate::tablet::schema::TabletSchema;
use crate::tablet::version_graph::VersionGraph;

/// Header plus published rowsets, guarded by the tablet's header lock.
pub struct TabletState {
    header: TabletHeader,
    visible: HashMap<Version, Arc<Rowset>>,
    incremental: HashMap<Version, Arc<Rowset>>,
}

impl TabletState {
    /// The current header.
    pub fn header(&self) -> &TabletHeader {
        &self.header
    }

    /// Deep copy of the current header, taken under the same lock as any
    /// preceding selection so both describe one observed state.
    pub fn header_copy(&self) -> TabletHeader {
        self.header.clone()
    }

    /// The visible rowset with the highest end-version.
    pub fn rowset_with_max_version(&self) -> Option<Arc<Rowset>> {
        self.visible
            .values()
            .max_by_key(|r| r.version().end)
            .cloned()
    }

    /// The incremental rowset covering exactly `version`.
    pub fn inc_rowset_by_version(&self, version: Version) -> Option<Arc<Rowset>> {
        self.incremental.get(&version).cloned()
    }

    /// Shortest consistent rowset sequence spanning `range`.
    pub fn capture_consistent_rowsets(&self, range: Version) -> Result<Vec<Arc<Rowset>>> {
        let graph = VersionGraph::from_metas(&self.header.visible_rowsets);
        let versions = graph.capture_consistent_versions(range)?;
        versions
            .into_iter()
            .map(|v| {
                self.visible
                    .get(&v)
                    .cloned()
                    .ok_or(TesseraError::SelectionFailed { range })
            })
            .collect()
    }
}

/// A live tablet borrowed by snapshot operations.
pub struct Tablet {
    tablet_id: TabletId,
    schema_hash: SchemaHash,
    partition_id: PartitionId,
    data_dir: PathBuf,
    tablet_dir: PathBuf,
    schema: Arc<TabletSchema>,
    index_cache: Arc<IndexCache>,
    state: RwLock<TabletState>,
}

impl Tablet {
    /// Create a fresh tablet under `data_dir` and persist its header.
    pub fn create(
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        partition_id: PartitionId,
        schema: TabletSchema,
        data_dir: &Path,
        index_cache: Arc<IndexCache>,
    ) -> Result<Arc<Self>> {
        let tablet_dir = data_dir
            .join("data")
            .join(tablet_id.to_string())
            .join(schema_hash.to_string());
        fs_util::create_dir_all(&tablet_dir)?;

        let creation_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let header = TabletHeader::new(tablet_id, schema_hash, schema.clone(), creation_time);
        header.save(&tablet_dir.join(TabletHeader::file_name(tablet_id)))?;

        info!(tablet_id, schema_hash, dir = %tablet_dir.display(), "created tablet");
        Ok(Arc::new(Tablet {
            tablet_id,
            schema_hash,
            partition_id,
            data_dir: data_dir.to_path_buf(),
            tablet_dir,
            schema: Arc::new(schema),
            index_cache,
            state: RwLock::new(TabletState {
                header,
                visible: HashMap::new(),
                incremental: HashMap::new(),
            }),
        }))
    }

    /// Tablet id.
    pub fn tablet_id(&self) -> TabletId {
        self.tablet_id
    }

    /// Schema hash of the identity pair.
    pub fn schema_hash(&self) -> SchemaHash {
        self.schema_hash
    }

    /// Partition the tablet belongs to.
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// The data root this tablet lives under (snapshots go here too).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The directory holding the tablet's header and segment files.
    pub fn tablet_dir(&self) -> &Path {
        &self.tablet_dir
    }

    /// Schema descriptor.
    pub fn schema(&self) -> &Arc<TabletSchema> {
        &self.schema
    }

    /// Shared index cache handles for this tablet's rowsets.
    pub fn index_cache(&self) -> &Arc<IndexCache> {
        &self.index_cache
    }

    /// Acquire the header lock in the shared (reader) role.
    pub fn read_state(&self) -> RwLockReadGuard<'_, TabletState> {
        self.state.read()
    }

    /// Publish a rowset: record its meta in the header (and, for single
    /// deltas kept for incremental clone, in the incremental list too),
    /// then persist the header.
    pub fn add_rowset(&self, rowset: Rowset, keep_incremental: bool) -> Result<()> {
        let rowset = Arc::new(rowset.with_index_cache(self.index_cache.clone()));
        let mut state = self.state.write();

        let meta = rowset.rowset_meta().clone();
        if keep_incremental && !meta.is_single_delta() {
            return Err(TesseraError::invalid_parameter(format!(
                "incremental rowset must be a single delta, got {}",
                meta.version
            )));
        }

        state.header.visible_rowsets.push(meta.clone());
        state.visible.insert(meta.version, rowset.clone());
        if keep_incremental {
            state.header.incremental_rowsets.push(meta.clone());
            state.incremental.insert(meta.version, rowset);
        }
        state
            .header
            .save(&self.tablet_dir.join(TabletHeader::file_name(self.tablet_id)))?;

        info!(
            tablet_id = self.tablet_id,
            version = %meta.version,
            incremental = keep_incremental,
            "published rowset"
        );
        Ok(())
    }
}
