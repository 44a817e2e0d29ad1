//! Rowset metadata records.
//!
//! A `RowsetMeta` is the serialised identity of a rowset as it appears in
//! tablet headers, in either the *visible* or the *incremental* sub-list.
//! It is immutable once the rowset is published; clone and restore flows
//! produce fresh records rather than mutating shipped ones.

use serde::{Deserialize, Serialize};
use tessera_core::{
    PartitionId, RowsetId, RowsetState, RowsetType, SchemaHash, TabletId, Version, VersionHash,
};

/// Serialised identity of a rowset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsetMeta {
    /// Globally unique rowset id; also keys the segment file names.
    pub rowset_id: RowsetId,
    /// Owning tablet.
    pub tablet_id: TabletId,
    /// Partition of the owning tablet.
    pub partition_id: PartitionId,
    /// Schema hash the rows were written under.
    pub tablet_schema_hash: SchemaHash,
    /// Physical segment layout.
    pub rowset_type: RowsetType,
    /// Lifecycle state.
    pub state: RowsetState,
    /// Version interval this rowset covers.
    pub version: Version,
    /// Content hash carried through clones.
    pub version_hash: VersionHash,
    /// Total row count across all segments.
    pub num_rows: u64,
    /// Number of segment file pairs.
    pub num_segments: u32,
    /// True when the rowset holds no rows (and therefore no files).
    pub empty: bool,
    /// True when segments may contain overlapping key ranges.
    pub segments_overlap: bool,
    /// Unix seconds at build time.
    pub creation_time: i64,
}

impl RowsetMeta {
    /// Whether this rowset covers exactly one version.
    pub fn is_single_delta(&self) -> bool {
        self.version.is_single_delta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowsetMeta {
        RowsetMeta {
            rowset_id: RowsetId::new(1, 2),
            tablet_id: 10,
            partition_id: 3,
            tablet_schema_hash: 42,
            rowset_type: RowsetType::Modern,
            state: RowsetState::Visible,
            version: Version::new(1, 3),
            version_hash: 0xabcd,
            num_rows: 100,
            num_segments: 1,
            empty: false,
            segments_overlap: false,
            creation_time: 1_700_000_000,
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let meta = sample();
        let json = serde_json::to_string(&meta).unwrap();
        let back: RowsetMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_single_delta() {
        let mut meta = sample();
        assert!(!meta.is_single_delta());
        meta.version = Version::single(5);
        assert!(meta.is_single_delta());
    }
}
