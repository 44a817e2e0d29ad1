//! The storage engine service object.
//!
//! One engine instance owns the data roots, the rowset-id generator, the
//! tablet registry, and the shared index cache. There is no process-wide
//! singleton: services needing engine state (the snapshot manager among
//! them) hold an `Arc<StorageEngine>` injected at construction.

use std::sync::Arc;

use tracing::info;

use tessera_core::{PartitionId, Result, RowsetId, SchemaHash, TabletId, TesseraError};

use crate::config::StorageConfig;
use crate::data_dir::DataDir;
use crate::rowset::id_generator::RowsetIdGenerator;
use crate::rowset::index_cache::IndexCache;
use crate::tablet::manager::TabletManager;
use crate::tablet::schema::TabletSchema;
use crate::tablet::tablet::Tablet;

/// Engine-scoped service owning stores, ids, and tablets.
pub struct StorageEngine {
    config: StorageConfig,
    stores: Vec<Arc<DataDir>>,
    id_generator: RowsetIdGenerator,
    tablet_manager: TabletManager,
    index_cache: Arc<IndexCache>,
}

impl StorageEngine {
    /// Open an engine over the configured data roots.
    pub fn open(config: StorageConfig) -> Result<Arc<Self>> {
        config
            .validate()
            .map_err(|e| TesseraError::invalid_parameter(e.to_string()))?;

        let mut stores = Vec::with_capacity(config.data_dirs.len());
        for dir in &config.data_dirs {
            stores.push(Arc::new(DataDir::open(dir)?));
        }
        info!(stores = stores.len(), "opened storage engine");

        Ok(Arc::new(StorageEngine {
            config,
            stores,
            id_generator: RowsetIdGenerator::new(),
            tablet_manager: TabletManager::new(),
            index_cache: Arc::new(IndexCache::new()),
        }))
    }

    /// The engine configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The registered data roots.
    pub fn stores(&self) -> &[Arc<DataDir>] {
        &self.stores
    }

    /// Allocate a fresh, globally unique rowset id.
    pub fn next_rowset_id(&self) -> RowsetId {
        self.id_generator.next_id()
    }

    /// The tablet registry.
    pub fn tablet_manager(&self) -> &TabletManager {
        &self.tablet_manager
    }

    /// The shared segment index cache.
    pub fn index_cache(&self) -> &Arc<IndexCache> {
        &self.index_cache
    }

    /// Create a tablet on the first data root and register it.
    pub fn create_tablet(
        &self,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        partition_id: PartitionId,
        schema: TabletSchema,
    ) -> Result<Arc<Tablet>> {
        let store = self
            .stores
            .first()
            .ok_or_else(|| TesseraError::invalid_parameter("engine has no data dirs"))?;
        let tablet = Tablet::create(
            tablet_id,
            schema_hash,
            partition_id,
            schema,
            store.path(),
            self.index_cache.clone(),
        )?;
        self.tablet_manager.add_tablet(tablet.clone());
        Ok(tablet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_create_tablet() {
        let dir = tempdir().unwrap();
        let engine =
            StorageEngine::open(StorageConfig::new().with_data_dir(dir.path())).unwrap();

        let tablet = engine
            .create_tablet(10, 42, 1, TabletSchema::for_testing())
            .unwrap();
        assert_eq!(tablet.tablet_id(), 10);
        assert!(engine.tablet_manager().get_tablet(10, 42).is_some());
        assert!(dir.path().join("snapshot").is_dir());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = StorageConfig::default();
        config.data_dirs.clear();
        assert!(matches!(
            StorageEngine::open(config),
            Err(TesseraError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_rowset_ids_advance() {
        let dir = tempdir().unwrap();
        let engine =
            StorageEngine::open(StorageConfig::new().with_data_dir(dir.path())).unwrap();
        let a = engine.next_rowset_id();
        let b = engine.next_rowset_id();
        assert_ne!(a, b);
    }
}
