use crate::data::{DatastoreType, DataTreePath, MemoryDataStore, NormalizedNode, ReadWriteTransaction};
use crate::error::RestconfError;
use crate::strategy::{RestconfStrategy, RestconfTransaction};
use std::sync::Arc;
use tracing::trace;

/// Strategy backed by an in-process [`MemoryDataStore`].
#[derive(Debug, Clone)]
pub struct DataStoreStrategy {
    store: Arc<MemoryDataStore>,
}

impl DataStoreStrategy {
    pub fn new(store: Arc<MemoryDataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MemoryDataStore> {
        &self.store
    }
}

impl RestconfStrategy for DataStoreStrategy {
    fn name(&self) -> &'static str {
        "datastore"
    }

    fn begin(&self) -> Result<Box<dyn RestconfTransaction>, RestconfError> {
        let tx = self.store.new_read_write_transaction();
        trace!(tx = tx.id(), "datastore transaction started");
        Ok(Box::new(DataStoreTransaction { tx }))
    }

    fn read(
        &self,
        datastore: DatastoreType,
        path: &DataTreePath,
    ) -> Result<Option<NormalizedNode>, RestconfError> {
        Ok(self.store.read(datastore, path))
    }
}

struct DataStoreTransaction {
    tx: ReadWriteTransaction,
}

impl RestconfTransaction for DataStoreTransaction {
    fn exists(&mut self, path: &DataTreePath) -> Result<bool, RestconfError> {
        Ok(self.tx.exists(DatastoreType::Configuration, path))
    }

    fn put(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.tx.put(DatastoreType::Configuration, path, node)
    }

    fn merge(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.tx.merge(DatastoreType::Configuration, path, node)
    }

    fn delete(&mut self, path: &DataTreePath) -> Result<(), RestconfError> {
        self.tx.delete(DatastoreType::Configuration, path);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), RestconfError> {
        self.tx.commit().map_err(RestconfError::from)
    }

    fn discard(self: Box<Self>) {
        self.tx.cancel();
    }
}
