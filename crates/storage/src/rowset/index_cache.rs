//! Process-wide cache of loaded segment indexes.
//!
//! Loading a rowset normally goes through this cache so repeated reads of
//! the same tablet reuse offset tables. Restore flows must bypass it:
//! an incoming clone directory can carry rowset ids that collide with ids
//! already cached from a different directory, so `Rowset::load(false)`
//! reads indexes directly from disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_core::{Result, RowsetId, RowsetType};

use crate::rowset::segment::{self, SegmentIndex};

/// Shared segment index cache, keyed by `(rowset_id, segment_no)`.
#[derive(Default)]
pub struct IndexCache {
    entries: Mutex<HashMap<(RowsetId, u32), Arc<SegmentIndex>>>,
}

impl IndexCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        IndexCache::default()
    }

    /// Return the cached index for a segment, loading it on a miss.
    pub fn get_or_load(
        &self,
        dir: &Path,
        id: RowsetId,
        n: u32,
        layout: RowsetType,
    ) -> Result<Arc<SegmentIndex>> {
        if let Some(index) = self.entries.lock().get(&(id, n)) {
            return Ok(index.clone());
        }
        let index = Arc::new(segment::load_index(dir, id, n, layout)?);
        self.entries.lock().insert((id, n), index.clone());
        Ok(index)
    }

    /// Drop all cached segments of one rowset.
    pub fn evict_rowset(&self, id: RowsetId) {
        self.entries.lock().retain(|(cached, _), _| *cached != id);
    }

    /// Number of cached segment indexes.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cache_hit_and_eviction() {
        let dir = tempdir().unwrap();
        let id = RowsetId::new(3, 9);
        segment::write_segment(dir.path(), id, 0, &[b"r".to_vec()], RowsetType::Modern).unwrap();

        let cache = IndexCache::new();
        let first = cache.get_or_load(dir.path(), id, 0, RowsetType::Modern).unwrap();
        let second = cache.get_or_load(dir.path(), id, 0, RowsetType::Modern).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.evict_rowset(id);
        assert!(cache.is_empty());
    }
}
