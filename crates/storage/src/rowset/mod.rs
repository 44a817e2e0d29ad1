//! Rowsets: immutable, versioned batches of rows.
//!
//! A rowset is a set of segment files in a tablet directory plus a
//! [`RowsetMeta`] record in the tablet header. Two physical layouts exist
//! ([`tessera_core::RowsetType`]): the Modern layout used by current
//! writers and the Legacy layout kept for old-format clone targets. The
//! [`RowsetConverter`] re-emits Modern data in the Legacy layout; it is the
//! only component sensitive to the layout tag.

pub mod converter;
pub mod id_generator;
pub mod index_cache;
pub mod meta;
pub mod segment;
#[allow(clippy::module_inception)]
pub mod rowset;
pub mod writer;

pub use converter::RowsetConverter;
pub use id_generator::RowsetIdGenerator;
pub use index_cache::IndexCache;
pub use meta::RowsetMeta;
pub use rowset::Rowset;
pub use writer::{RowsetWriter, RowsetWriterContext};
