//! Core types for the Tessera storage engine
//!
//! This crate holds the vocabulary shared by every other crate in the
//! workspace:
//! - identifier types (tablet ids, rowset ids, version intervals)
//! - the unified [`TesseraError`] type and [`Result`] alias
//! - low-level filesystem helpers (atomic writes, hard links)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fs_util;
pub mod types;

pub use error::{Result, TesseraError};
pub use types::{
    PartitionId, RowsetId, RowsetState, RowsetType, SchemaHash, TabletId, Version, VersionHash,
};
