//! Tablet registry.
//!
//! Maps `(tablet_id, schema_hash)` to live tablets. The manager owns
//! tablet lifetimes; snapshot operations borrow a tablet for the duration
//! of one call.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use tessera_core::{SchemaHash, TabletId};

use crate::tablet::tablet::Tablet;

/// Registry of live tablets.
#[derive(Default)]
pub struct TabletManager {
    tablets: RwLock<HashMap<(TabletId, SchemaHash), Arc<Tablet>>>,
}

impl TabletManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        TabletManager::default()
    }

    /// Look up a tablet by identity.
    pub fn get_tablet(&self, tablet_id: TabletId, schema_hash: SchemaHash) -> Option<Arc<Tablet>> {
        let found = self.tablets.read().get(&(tablet_id, schema_hash)).cloned();
        if found.is_none() {
            warn!(tablet_id, schema_hash, "tablet not found");
        }
        found
    }

    /// Register a tablet. Replaces any previous registration for the same
    /// identity.
    pub fn add_tablet(&self, tablet: Arc<Tablet>) {
        self.tablets
            .write()
            .insert((tablet.tablet_id(), tablet.schema_hash()), tablet);
    }

    /// Remove a tablet from the registry, returning it if present.
    pub fn drop_tablet(
        &self,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
    ) -> Option<Arc<Tablet>> {
        self.tablets.write().remove(&(tablet_id, schema_hash))
    }

    /// Number of registered tablets.
    pub fn len(&self) -> usize {
        self.tablets.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tablets.read().is_empty()
    }
}
