//! Mount points: nested data stores with their own schema, attached at a
//! path of the parent tree.

use crate::data::{DataTreePath, MemoryDataStore};
use crate::error::RestconfError;
use crate::schema::SchemaContext;
use crate::strategy::{select_strategy, NetconfDataTreeService, RestconfStrategy};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct MountPoint {
    id: DataTreePath,
    schema: Arc<SchemaContext>,
    netconf: Option<Arc<dyn NetconfDataTreeService>>,
    broker: Option<Arc<MemoryDataStore>>,
}

impl fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountPoint")
            .field("id", &self.id)
            .field("schema_generation", &self.schema.generation())
            .field("netconf", &self.netconf.is_some())
            .field("broker", &self.broker.is_some())
            .finish()
    }
}

impl MountPoint {
    pub fn new(id: DataTreePath, schema: Arc<SchemaContext>) -> Self {
        Self {
            id,
            schema,
            netconf: None,
            broker: None,
        }
    }

    pub fn with_netconf(mut self, service: Arc<dyn NetconfDataTreeService>) -> Self {
        self.netconf = Some(service);
        self
    }

    pub fn with_broker(mut self, store: Arc<MemoryDataStore>) -> Self {
        self.broker = Some(store);
        self
    }

    pub fn id(&self) -> &DataTreePath {
        &self.id
    }

    pub fn schema(&self) -> &Arc<SchemaContext> {
        &self.schema
    }

    /// Transaction strategy for the mounted store.
    pub fn strategy(&self) -> Result<Arc<dyn RestconfStrategy>, RestconfError> {
        select_strategy(self.netconf.clone(), self.broker.clone()).ok_or_else(|| {
            RestconfError::not_supported(format!(
                "Mount point {} provides neither a NETCONF service nor a data broker.",
                self.id
            ))
        })
    }
}

pub trait MountRegistry: Send + Sync {
    fn lookup(&self, path: &DataTreePath) -> Option<Arc<MountPoint>>;
}

/// In-memory mount registry keyed by normalized mount path.
#[derive(Debug, Default)]
pub struct MountPointService {
    points: RwLock<HashMap<DataTreePath, Arc<MountPoint>>>,
}

impl MountPointService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `point`, replacing any mount at the same path.
    pub fn register(&self, point: MountPoint) -> Arc<MountPoint> {
        let point = Arc::new(point);
        debug!(path = %point.id, "mount point registered");
        self.points
            .write()
            .insert(point.id.clone(), Arc::clone(&point));
        point
    }

    pub fn unregister(&self, path: &DataTreePath) -> Option<Arc<MountPoint>> {
        let removed = self.points.write().remove(path);
        if removed.is_some() {
            debug!(path = %path, "mount point unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }
}

impl MountRegistry for MountPointService {
    fn lookup(&self, path: &DataTreePath) -> Option<Arc<MountPoint>> {
        self.points.read().get(path).cloned()
    }
}
