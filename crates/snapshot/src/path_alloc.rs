//! Snapshot directory path allocation.
//!
//! Snapshot roots are named `<data-root>/snapshot/<YYYYMMDDhhmmss>.<seq>.<timeout>`,
//! e.g. `20260802101530.3.86400`. The timestamp-plus-sequence pair is
//! unique within a process: the sequence counter is read and incremented
//! under a short-lived mutex. The allocator only computes paths; the
//! materialiser creates the directories.

use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use tessera_storage::SNAPSHOT_PREFIX;

/// Allocates unique snapshot directory paths under a data root.
#[derive(Default)]
pub struct SnapshotPathAllocator {
    next_seq: Mutex<u64>,
}

impl SnapshotPathAllocator {
    /// Create an allocator starting at sequence 0.
    pub fn new() -> Self {
        SnapshotPathAllocator::default()
    }

    /// Compute the next snapshot path under `data_dir`.
    pub fn allocate(&self, data_dir: &Path, timeout_secs: i64) -> PathBuf {
        let time_str = Local::now().format("%Y%m%d%H%M%S");
        let seq = {
            let mut guard = self.next_seq.lock();
            let seq = *guard;
            *guard += 1;
            seq
        };
        data_dir
            .join(SNAPSHOT_PREFIX)
            .join(format!("{time_str}.{seq}.{timeout_secs}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique_and_sequenced() {
        let allocator = SnapshotPathAllocator::new();
        let root = Path::new("/data/store0");
        let a = allocator.allocate(root, 60);
        let b = allocator.allocate(root, 60);
        assert_ne!(a, b);

        let name_a = a.file_name().unwrap().to_str().unwrap();
        let name_b = b.file_name().unwrap().to_str().unwrap();
        assert!(name_a.ends_with(".0.60"), "got {name_a}");
        assert!(name_b.ends_with(".1.60"), "got {name_b}");
    }

    #[test]
    fn test_path_shape() {
        let allocator = SnapshotPathAllocator::new();
        let path = allocator.allocate(Path::new("/data/store0"), 86_400);
        assert!(path.starts_with("/data/store0/snapshot"));

        let name = path.file_name().unwrap().to_str().unwrap();
        let parts: Vec<&str> = name.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 14); // YYYYMMDDhhmmss
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2], "86400");
    }

    #[test]
    fn test_concurrent_allocation_is_collision_free() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let allocator = Arc::new(SnapshotPathAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let allocator = allocator.clone();
            handles.push(std::thread::spawn(move || {
                (0..100)
                    .map(|_| allocator.allocate(Path::new("/d"), 1))
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for path in handle.join().unwrap() {
                assert!(seen.insert(path.clone()), "duplicate path {path:?}");
            }
        }
    }
}
