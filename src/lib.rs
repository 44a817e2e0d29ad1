//! # Tessera
//!
//! A columnar tablet storage engine. Data is horizontally and schema
//! partitioned into *tablets*, each backed by a directory holding a header
//! file plus a set of immutable *rowsets* tagged with version intervals.
//!
//! This crate re-exports the public surface of the engine's internal
//! crates. The snapshot subsystem is the main entry point for
//! backup/clone workflows:
//!
//! ```no_run
//! use tessera::{SnapshotFormat, SnapshotManager, SnapshotRequest, StorageConfig, StorageEngine};
//!
//! fn main() -> tessera::Result<()> {
//!     let engine = StorageEngine::open(StorageConfig::new().with_data_dir("./tessera-data"))?;
//!     let snapshots = SnapshotManager::new(engine.clone());
//!
//!     let mut request = SnapshotRequest::full(10, 42).with_format(SnapshotFormat::V2);
//!     let path = snapshots.make_snapshot(&mut request)?;
//!
//!     // ... ship `path` to another node, then:
//!     snapshots.release_snapshot(&path)?;
//!     Ok(())
//! }
//! ```
//!
//! Internal crates (`tessera-core`, `tessera-storage`, `tessera-snapshot`)
//! are implementation detail; only the surface re-exported here is stable.

pub use tessera_core::{
    Result, RowsetId, RowsetState, RowsetType, SchemaHash, TabletId, TesseraError, Version,
};
pub use tessera_snapshot::{SnapshotFormat, SnapshotManager, SnapshotRequest};
pub use tessera_storage::{StorageConfig, StorageEngine};
