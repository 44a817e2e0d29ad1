//! Snapshot subsystem for the Tessera engine
//!
//! Produces point-in-time, self-contained, on-disk copies of tablets so
//! they can be shipped to or restored on another node. A snapshot is
//! *consistent* (selection and header copy happen under one shared header
//! lock), *cheap* (rowset files are hard-linked, never copied),
//! *rewritable* (rowset identities are rebound to fresh ids on restore),
//! and *format-negotiable* (the wire format can be the legacy V1 layout
//! or the as-is V2 layout).
//!
//! Three operations are exported, all on [`SnapshotManager`]:
//! - `make_snapshot` — materialise a snapshot directory for a tablet
//! - `release_snapshot` — remove a snapshot, enforcing the data-root rule
//! - `convert_rowset_ids` — rebind a received snapshot's rowset ids

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod path_alloc;
pub mod request;

mod normalise;
mod rebind;
mod select;

pub use manager::SnapshotManager;
pub use path_alloc::SnapshotPathAllocator;
pub use request::{SnapshotFormat, SnapshotRequest};
