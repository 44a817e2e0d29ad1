//! Snapshot requests and wire-format negotiation.

use tessera_core::{SchemaHash, TabletId, TesseraError};

/// On-wire physical layout of a snapshot's rowsets.
///
/// `V1` normalises every rowset to the Legacy segment layout for
/// old-format clone targets; `V2` ships rowsets in whatever layout they
/// already have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Legacy-normalised layout.
    V1,
    /// As-is layout.
    V2,
}

impl TryFrom<i32> for SnapshotFormat {
    type Error = TesseraError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SnapshotFormat::V1),
            2 => Ok(SnapshotFormat::V2),
            other => Err(TesseraError::InvalidSnapshotFormat { requested: other }),
        }
    }
}

/// A request to snapshot one tablet.
///
/// Exactly one field is mutated by the manager:
/// [`SnapshotRequest::allow_incremental_clone`] is set true when an
/// incremental-mode snapshot succeeds.
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    /// Tablet to snapshot.
    pub tablet_id: TabletId,
    /// Schema hash of the tablet identity.
    pub schema_hash: SchemaHash,
    /// Target end-version for a full snapshot; latest when unset.
    pub version: Option<i64>,
    /// Versions to ship individually; presence selects incremental mode.
    pub missing_versions: Option<Vec<i64>>,
    /// Snapshot lifetime recorded in the directory name; engine default
    /// when unset.
    pub timeout_secs: Option<i64>,
    /// Requested wire format.
    pub preferred_format: SnapshotFormat,
    /// Output flag: the caller may perform an incremental clone.
    pub allow_incremental_clone: bool,
}

impl SnapshotRequest {
    /// A full-mode request for the tablet's latest version, format V2.
    pub fn full(tablet_id: TabletId, schema_hash: SchemaHash) -> Self {
        SnapshotRequest {
            tablet_id,
            schema_hash,
            version: None,
            missing_versions: None,
            timeout_secs: None,
            preferred_format: SnapshotFormat::V2,
            allow_incremental_clone: false,
        }
    }

    /// An incremental-mode request shipping the given versions, format V2.
    pub fn incremental(
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        missing_versions: Vec<i64>,
    ) -> Self {
        SnapshotRequest {
            missing_versions: Some(missing_versions),
            ..SnapshotRequest::full(tablet_id, schema_hash)
        }
    }

    /// Set the target end-version (builder pattern).
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the wire format (builder pattern).
    pub fn with_format(mut self, format: SnapshotFormat) -> Self {
        self.preferred_format = format;
        self
    }

    /// Set the snapshot lifetime (builder pattern).
    pub fn with_timeout_secs(mut self, secs: i64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Whether this request selects incremental mode.
    pub fn is_incremental(&self) -> bool {
        self.missing_versions.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_wire_value() {
        assert_eq!(SnapshotFormat::try_from(1).unwrap(), SnapshotFormat::V1);
        assert_eq!(SnapshotFormat::try_from(2).unwrap(), SnapshotFormat::V2);
        assert!(matches!(
            SnapshotFormat::try_from(3),
            Err(TesseraError::InvalidSnapshotFormat { requested: 3 })
        ));
    }

    #[test]
    fn test_mode_selection() {
        assert!(!SnapshotRequest::full(10, 42).is_incremental());
        assert!(SnapshotRequest::incremental(10, 42, vec![5, 7]).is_incremental());
        // An empty list still selects incremental mode.
        assert!(SnapshotRequest::incremental(10, 42, vec![]).is_incremental());
    }
}
