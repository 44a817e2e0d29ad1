//! Unified error type for the Tessera engine.
//!
//! All failures surface as tagged [`TesseraError`] values; nothing is
//! retried internally and no panics occur on non-test paths. Variants are
//! structured so callers can match on the failure kind without parsing
//! messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{RowsetId, SchemaHash, TabletId, Version};

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Unified error type for all Tessera operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// A caller-supplied argument was rejected (e.g. a requested snapshot
    /// version beyond the tablet's live version).
    #[error("invalid parameter: {detail}")]
    InvalidParameter {
        /// What was wrong with the input.
        detail: String,
    },

    /// The tablet manager has no tablet for the given identity.
    #[error("tablet not found: tablet_id={tablet_id} schema_hash={schema_hash}")]
    TabletNotFound {
        /// Requested tablet id.
        tablet_id: TabletId,
        /// Requested schema hash.
        schema_hash: SchemaHash,
    },

    /// A path (directory or file) expected to exist does not.
    #[error("required path missing: '{path}'")]
    DirNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Directory creation failed.
    #[error("cannot create directory '{path}': {source}")]
    CannotCreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A requested version is not present in the tablet.
    #[error("version not found: {detail}")]
    VersionNotFound {
        /// Which version was missing and where.
        detail: String,
    },

    /// The version graph cannot produce a consistent rowset path spanning
    /// the requested range.
    #[error("no consistent rowset path covers {range}")]
    SelectionFailed {
        /// The range that could not be spanned.
        range: Version,
    },

    /// A hard-link syscall failed while materialising a snapshot.
    #[error("hard link failed: '{from}' -> '{to}': {source}")]
    LinkFailed {
        /// Link source.
        from: PathBuf,
        /// Link destination.
        to: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Re-emitting a rowset in another physical layout failed.
    #[error("rowset conversion failed for {rowset_id}: {detail}")]
    ConversionFailed {
        /// The rowset being converted.
        rowset_id: RowsetId,
        /// What went wrong.
        detail: String,
    },

    /// The request carried an unknown snapshot wire-format number.
    #[error("unknown snapshot format: {requested}")]
    InvalidSnapshotFormat {
        /// The rejected wire value.
        requested: i32,
    },

    /// A tablet header file could not be deserialised.
    #[error("invalid tablet header '{path}': {detail}")]
    HeaderInvalid {
        /// Header file path.
        path: PathBuf,
        /// Deserialisation failure detail.
        detail: String,
    },

    /// A rowset writer finished without producing a loadable rowset.
    #[error("failed to build rowset {rowset_id}")]
    RowsetBuildFailed {
        /// The id the writer was building under.
        rowset_id: RowsetId,
    },

    /// A path handed to ReleaseSnapshot is not under any data root's
    /// snapshot tree.
    #[error("path is not under a data root snapshot tree: '{path}'")]
    IllegalPath {
        /// The rejected path.
        path: PathBuf,
    },

    /// A segment data or index file failed validation.
    #[error("segment file corrupt: '{path}': {detail}")]
    SegmentCorrupt {
        /// The corrupt file.
        path: PathBuf,
        /// Validation failure detail.
        detail: String,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TesseraError {
    /// Convenience constructor for [`TesseraError::InvalidParameter`].
    pub fn invalid_parameter(detail: impl Into<String>) -> Self {
        TesseraError::InvalidParameter {
            detail: detail.into(),
        }
    }

    /// Convenience constructor for [`TesseraError::VersionNotFound`].
    pub fn version_not_found(detail: impl Into<String>) -> Self {
        TesseraError::VersionNotFound {
            detail: detail.into(),
        }
    }
}
