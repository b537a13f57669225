//! Uniform transactional contract over the two backends.
//!
//! The edit and patch engines only ever see [`RestconfStrategy`] and
//! [`RestconfTransaction`]. Which backend is in effect is decided once per
//! root or mount point by [`select_strategy`].

pub mod datastore;
pub mod netconf;

pub use datastore::DataStoreStrategy;
pub use netconf::{EditOperation, NetconfDataTreeService, NetconfStrategy, RpcError};

use crate::data::{DatastoreType, DataTreePath, MemoryDataStore, NormalizedNode};
use crate::error::RestconfError;
use std::sync::Arc;

/// One open unit of work. Must end in exactly one `commit` or `discard`;
/// both consume the transaction.
pub trait RestconfTransaction: Send {
    /// Whether configuration data exists at `path`.
    fn exists(&mut self, path: &DataTreePath) -> Result<bool, RestconfError>;

    fn put(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError>;

    fn merge(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError>;

    /// Write that the caller has already checked for absence.
    fn create(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.put(path, node)
    }

    fn delete(&mut self, path: &DataTreePath) -> Result<(), RestconfError>;

    /// Delete that tolerates absence.
    fn remove(&mut self, path: &DataTreePath) -> Result<(), RestconfError> {
        if self.exists(path)? {
            self.delete(path)
        } else {
            Ok(())
        }
    }

    fn commit(self: Box<Self>) -> Result<(), RestconfError>;

    fn discard(self: Box<Self>);
}

pub trait RestconfStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn begin(&self) -> Result<Box<dyn RestconfTransaction>, RestconfError>;

    /// Reads outside of any transaction.
    fn read(
        &self,
        datastore: DatastoreType,
        path: &DataTreePath,
    ) -> Result<Option<NormalizedNode>, RestconfError>;
}

/// Prefers the device service; falls back to the generic store.
pub fn select_strategy(
    netconf: Option<Arc<dyn NetconfDataTreeService>>,
    broker: Option<Arc<MemoryDataStore>>,
) -> Option<Arc<dyn RestconfStrategy>> {
    if let Some(service) = netconf {
        return Some(Arc::new(NetconfStrategy::new(service)));
    }
    broker.map(|store| Arc::new(DataStoreStrategy::new(store)) as Arc<dyn RestconfStrategy>)
}
