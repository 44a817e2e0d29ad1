//! Consistent rowset selection.
//!
//! The selector holds the tablet's header lock in the shared role for the
//! entire selection *and* the header copy, so the returned rowset list and
//! header describe the same observed state even while writers publish
//! concurrently. Hard links are created after the lock is released;
//! versions published later are invisible to the snapshot.

use std::sync::Arc;

use tracing::warn;

use tessera_core::{Result, TesseraError, Version};
use tessera_storage::rowset::Rowset;
use tessera_storage::tablet::{Tablet, TabletHeader};

use crate::request::SnapshotRequest;

/// Outcome of selection: a consistent rowset list plus the header copy
/// observed under the same lock.
pub(crate) struct SelectedRowsets {
    pub rowsets: Vec<Arc<Rowset>>,
    pub header: TabletHeader,
    pub incremental: bool,
}

/// Select the rowsets a snapshot of `tablet` must carry.
pub(crate) fn select_consistent_rowsets(
    tablet: &Tablet,
    request: &SnapshotRequest,
) -> Result<SelectedRowsets> {
    let state = tablet.read_state();

    if let Some(missing) = &request.missing_versions {
        let mut rowsets = Vec::with_capacity(missing.len());
        for &missed in missing {
            let version = Version::single(missed);
            match state.inc_rowset_by_version(version) {
                Some(rowset) => rowsets.push(rowset),
                None => {
                    warn!(
                        tablet_id = request.tablet_id,
                        schema_hash = request.schema_hash,
                        version = %version,
                        "missing incremental version for snapshot"
                    );
                    return Err(TesseraError::version_not_found(format!(
                        "tablet {} has no incremental rowset for {version}",
                        request.tablet_id
                    )));
                }
            }
        }
        return Ok(SelectedRowsets {
            rowsets,
            header: state.header_copy(),
            incremental: true,
        });
    }

    let last = state.rowset_with_max_version().ok_or_else(|| {
        TesseraError::version_not_found(format!(
            "tablet {} has no visible rowsets",
            request.tablet_id
        ))
    })?;

    let mut end = last.version().end;
    if let Some(requested) = request.version {
        if end < requested {
            warn!(
                tablet_id = request.tablet_id,
                live_version = end,
                requested,
                "snapshot request beyond live version"
            );
            return Err(TesseraError::invalid_parameter(format!(
                "requested version {requested} beyond live version {end}"
            )));
        }
        end = requested;
    }

    let rowsets = state.capture_consistent_rowsets(Version::new(0, end))?;
    Ok(SelectedRowsets {
        rowsets,
        header: state.header_copy(),
        incremental: false,
    })
}
