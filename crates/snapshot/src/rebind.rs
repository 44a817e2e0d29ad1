//! Rowset-id rebinding for received snapshots.
//!
//! On the receiving side of a clone, the snapshot directory's rowset ids
//! come from the *source* engine's id space and may collide with ids
//! already live here. Rebinding walks the received header, allocates
//! fresh ids from this engine's generator, physically re-emits each
//! rowset's files under the new id, and rewrites the header to reference
//! them — preserving row content, ordering, overlap flags, and version
//! metadata.
//!
//! The header is read from `<clone_dir>/<new_tablet_id>.hdr`: the file is
//! named after the *target* tablet id even though its body may still
//! carry the source tablet id until this routine rewrites it. That naming
//! convention is the restore contract.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use tessera_core::{Result, RowsetId, SchemaHash, TabletId, TesseraError, Version};
use tessera_storage::rowset::{Rowset, RowsetMeta, RowsetWriter, RowsetWriterContext};
use tessera_storage::tablet::{TabletHeader, TabletSchema};
use tessera_storage::StorageEngine;

/// Rebind every rowset id in `clone_dir`'s header to fresh ids from the
/// engine's generator, rewriting the header in place.
pub(crate) fn convert_rowset_ids(
    engine: &StorageEngine,
    clone_dir: &Path,
    new_tablet_id: TabletId,
    new_schema_hash: SchemaHash,
) -> Result<()> {
    if !clone_dir.is_dir() {
        return Err(TesseraError::DirNotFound {
            path: clone_dir.to_path_buf(),
        });
    }

    let header_path = clone_dir.join(TabletHeader::file_name(new_tablet_id));
    let cloned = TabletHeader::load(&header_path)?;
    let schema = Arc::new(cloned.schema.clone());

    let mut rebound = cloned.clone();
    rebound.visible_rowsets.clear();
    rebound.incremental_rowsets.clear();
    rebound.tablet_id = new_tablet_id;
    rebound.schema_hash = new_schema_hash;

    // A version present in both lists must map to one new id: rebound
    // visible metas are indexed by version, and incremental entries reuse
    // the mapped record instead of re-emitting the rowset.
    let mut by_version: HashMap<Version, RowsetMeta> = HashMap::new();

    for meta in &cloned.visible_rowsets {
        let new_id = engine.next_rowset_id();
        let mut new_meta = rename_rowset(meta, clone_dir, &schema, new_id)?;
        new_meta.tablet_id = new_tablet_id;
        new_meta.tablet_schema_hash = new_schema_hash;
        by_version.insert(new_meta.version, new_meta.clone());
        rebound.visible_rowsets.push(new_meta);
    }

    for meta in &cloned.incremental_rowsets {
        if let Some(shared) = by_version.get(&meta.version) {
            rebound.incremental_rowsets.push(shared.clone());
            continue;
        }
        let new_id = engine.next_rowset_id();
        let mut new_meta = rename_rowset(meta, clone_dir, &schema, new_id)?;
        new_meta.tablet_id = new_tablet_id;
        new_meta.tablet_schema_hash = new_schema_hash;
        rebound.incremental_rowsets.push(new_meta);
    }

    rebound.save(&header_path)?;
    info!(
        tablet_id = new_tablet_id,
        schema_hash = new_schema_hash,
        visible = rebound.visible_rowsets.len(),
        incremental = rebound.incremental_rowsets.len(),
        dir = %clone_dir.display(),
        "rebound rowset ids"
    );
    Ok(())
}

/// Re-emit one rowset's files under `new_id`, returning the fresh meta.
///
/// The existing rowset is opened without the shared index cache: the
/// incoming directory's ids may collide with cached entries belonging to
/// other tablets. The writer inherits partition, schema hash, layout,
/// state, version, version hash, and overlap flag from the old meta; the
/// caller overwrites tablet identity on the returned record. On success
/// the old id has no remaining files in the directory.
fn rename_rowset(
    old_meta: &RowsetMeta,
    dir: &Path,
    schema: &Arc<TabletSchema>,
    new_id: RowsetId,
) -> Result<RowsetMeta> {
    let original = Rowset::open(schema.clone(), dir, old_meta.clone());
    original.load(false)?;

    let ctx = RowsetWriterContext {
        rowset_id: new_id,
        tablet_id: old_meta.tablet_id,
        partition_id: old_meta.partition_id,
        tablet_schema_hash: old_meta.tablet_schema_hash,
        rowset_type: old_meta.rowset_type,
        state: old_meta.state,
        version: old_meta.version,
        version_hash: old_meta.version_hash,
        segments_overlap: old_meta.segments_overlap,
        dir: dir.to_path_buf(),
        schema: schema.clone(),
    };
    let mut writer = RowsetWriter::new(ctx)?;
    writer.add_rowset(&original)?;
    let rebound = writer.build()?;
    rebound.load(false)?;

    let new_meta = rebound.rowset_meta().clone();
    original.remove()?;
    Ok(new_meta)
}
