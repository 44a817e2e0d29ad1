//! Legacy wire-format normalisation.
//!
//! When a requester asks for format V1, every Modern rowset in the
//! snapshot is re-emitted in the Legacy layout inside the snapshot
//! directory and its meta refreshed. Rowsets already in the Legacy layout
//! pass through untouched, and the header list is only replaced when at
//! least one rowset was actually converted. Partial files left by a
//! failed conversion are cleaned up by the materialiser's teardown.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use tessera_core::{Result, RowsetType};
use tessera_storage::rowset::RowsetConverter;
use tessera_storage::tablet::{TabletHeader, TabletSchema};

/// Normalise the mode-relevant rowset list of `header` to the Legacy
/// layout, re-emitting files under `dst_dir`.
pub(crate) fn normalise_to_legacy(
    header: &mut TabletHeader,
    schema: &Arc<TabletSchema>,
    dst_dir: &Path,
    incremental: bool,
) -> Result<()> {
    let metas = if incremental {
        header.incremental_rowsets.clone()
    } else {
        header.visible_rowsets.clone()
    };

    let converter = RowsetConverter::new(schema.clone());
    let mut fresh = Vec::with_capacity(metas.len());
    let mut modified = false;
    for meta in &metas {
        if meta.rowset_type == RowsetType::Modern {
            modified = true;
            fresh.push(converter.modern_to_legacy(meta, dst_dir)?);
        } else {
            fresh.push(meta.clone());
        }
    }

    if modified {
        info!(
            tablet_id = header.tablet_id,
            converted = fresh.len(),
            incremental,
            "normalised snapshot rowsets to legacy layout"
        );
        if incremental {
            header.revise_incremental(fresh);
        } else {
            header.revise_visible(fresh);
        }
    }
    Ok(())
}
