//! Rowset id allocation.
//!
//! Ids must never collide across tablets or across engine restarts: the
//! generator pairs a random 64-bit high word (fixed per process) with an
//! atomically incremented low word. Allocation is lock-free.

use std::sync::atomic::{AtomicU64, Ordering};

use tessera_core::RowsetId;
use uuid::Uuid;

/// Process-wide rowset id generator.
pub struct RowsetIdGenerator {
    hi: u64,
    next_lo: AtomicU64,
}

impl RowsetIdGenerator {
    /// Create a generator with a freshly randomised high word.
    pub fn new() -> Self {
        let (hi, _) = Uuid::new_v4().as_u64_pair();
        RowsetIdGenerator {
            hi,
            next_lo: AtomicU64::new(1),
        }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> RowsetId {
        RowsetId::new(self.hi, self.next_lo.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RowsetIdGenerator {
    fn default() -> Self {
        RowsetIdGenerator::new()
    }
}
