//! Identifier and version types.
//!
//! A *tablet* is identified by `(TabletId, SchemaHash)`. A *rowset* is an
//! immutable batch of rows identified by a globally unique [`RowsetId`] and
//! tagged with a closed [`Version`] interval: `start == end` is a single
//! delta, `start < end` a cumulative one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tablet identifier, assigned by the cluster catalog.
pub type TabletId = i64;

/// Hash of the tablet schema the data was written under.
pub type SchemaHash = i32;

/// Partition the tablet belongs to.
pub type PartitionId = i64;

/// Hash over the row content of a version, carried through clones.
pub type VersionHash = u64;

/// Closed interval of transaction versions covered by a rowset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Version {
    /// First version covered (inclusive).
    pub start: i64,
    /// Last version covered (inclusive).
    pub end: i64,
}

impl Version {
    /// Create a version interval `[start, end]`.
    pub fn new(start: i64, end: i64) -> Self {
        Version { start, end }
    }

    /// Create a single-delta interval `[v, v]`.
    pub fn single(v: i64) -> Self {
        Version { start: v, end: v }
    }

    /// A single delta covers exactly one version.
    pub fn is_single_delta(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: Version) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

/// Globally unique rowset identifier.
///
/// Allocated by the engine's id generator: a random per-process high word
/// plus a monotonically increasing low word. The `Display` form (32 hex
/// digits) is what appears in segment file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowsetId {
    /// Random high word, fixed for the lifetime of an engine process.
    pub hi: u64,
    /// Monotonically increasing low word.
    pub lo: u64,
}

impl RowsetId {
    /// Create a rowset id from its two words.
    pub fn new(hi: u64, lo: u64) -> Self {
        RowsetId { hi, lo }
    }
}

impl fmt::Display for RowsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Physical layout of a rowset's segment files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowsetType {
    /// Older layout: per-row checksums, no file footer.
    Legacy,
    /// Current layout: framed rows with a CRC32 file footer.
    Modern,
}

/// Lifecycle state of a rowset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowsetState {
    /// Written but not yet committed to a version.
    Prepared,
    /// Committed, pending publication.
    Committed,
    /// Published and part of the tablet's read view.
    Visible,
}
