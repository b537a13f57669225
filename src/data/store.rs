//! In-process transactional data store.
//!
//! Read-write transactions work on a private snapshot and keep a log of
//! their modifications. Commit replays that log onto the current trees under
//! the write lock, asks every registered cohort for approval and publishes the
//! result in one step.

use crate::data::node::NormalizedNode;
use crate::data::path::DataTreePath;
use crate::error::{BackendError, RestconfError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatastoreType {
    Configuration,
    Operational,
}

impl fmt::Display for DatastoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatastoreType::Configuration => f.write_str("CONFIGURATION"),
            DatastoreType::Operational => f.write_str("OPERATIONAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModificationKind {
    Put(NormalizedNode),
    Merge(NormalizedNode),
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub datastore: DatastoreType,
    pub path: DataTreePath,
    pub kind: ModificationKind,
}

/// Validator consulted before a commit is published. Returning an error
/// vetoes the commit.
pub trait CommitCohort: Send + Sync {
    fn can_commit(
        &self,
        datastore: DatastoreType,
        modifications: &[Modification],
        candidate: &NormalizedNode,
    ) -> Result<(), String>;
}

pub struct MemoryDataStore {
    configuration: RwLock<NormalizedNode>,
    operational: RwLock<NormalizedNode>,
    cohorts: RwLock<Vec<Arc<dyn CommitCohort>>>,
    next_tx: AtomicU64,
}

impl fmt::Debug for MemoryDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDataStore")
            .field("cohorts", &self.cohorts.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self {
            configuration: RwLock::new(NormalizedNode::data_root()),
            operational: RwLock::new(NormalizedNode::data_root()),
            cohorts: RwLock::new(Vec::new()),
            next_tx: AtomicU64::new(1),
        }
    }

    fn tree(&self, datastore: DatastoreType) -> &RwLock<NormalizedNode> {
        match datastore {
            DatastoreType::Configuration => &self.configuration,
            DatastoreType::Operational => &self.operational,
        }
    }

    pub fn register_commit_cohort(&self, cohort: Arc<dyn CommitCohort>) {
        self.cohorts.write().push(cohort);
    }

    pub fn read(&self, datastore: DatastoreType, path: &DataTreePath) -> Option<NormalizedNode> {
        self.tree(datastore).read().find(path).cloned()
    }

    /// Copy of a whole tree.
    pub fn snapshot(&self, datastore: DatastoreType) -> NormalizedNode {
        self.tree(datastore).read().clone()
    }

    pub fn new_read_write_transaction(self: &Arc<Self>) -> ReadWriteTransaction {
        let id = self.next_tx.fetch_add(1, Ordering::Relaxed);
        trace!(tx = id, "opening read-write transaction");
        ReadWriteTransaction {
            id,
            store: Arc::clone(self),
            configuration: self.snapshot(DatastoreType::Configuration),
            operational: self.snapshot(DatastoreType::Operational),
            log: Vec::new(),
        }
    }
}

/// Unit of work against a [`MemoryDataStore`]. Dropping it without a commit
/// discards every modification.
#[derive(Debug)]
pub struct ReadWriteTransaction {
    id: u64,
    store: Arc<MemoryDataStore>,
    configuration: NormalizedNode,
    operational: NormalizedNode,
    log: Vec<Modification>,
}

impl ReadWriteTransaction {
    pub fn id(&self) -> u64 {
        self.id
    }

    fn working(&mut self, datastore: DatastoreType) -> &mut NormalizedNode {
        match datastore {
            DatastoreType::Configuration => &mut self.configuration,
            DatastoreType::Operational => &mut self.operational,
        }
    }

    pub fn read(&self, datastore: DatastoreType, path: &DataTreePath) -> Option<NormalizedNode> {
        let tree = match datastore {
            DatastoreType::Configuration => &self.configuration,
            DatastoreType::Operational => &self.operational,
        };
        tree.find(path).cloned()
    }

    pub fn exists(&self, datastore: DatastoreType, path: &DataTreePath) -> bool {
        let tree = match datastore {
            DatastoreType::Configuration => &self.configuration,
            DatastoreType::Operational => &self.operational,
        };
        tree.find(path).is_some()
    }

    pub fn put(
        &mut self,
        datastore: DatastoreType,
        path: &DataTreePath,
        node: NormalizedNode,
    ) -> Result<(), RestconfError> {
        self.working(datastore).put(path, node.clone())?;
        self.log.push(Modification {
            datastore,
            path: path.clone(),
            kind: ModificationKind::Put(node),
        });
        Ok(())
    }

    pub fn merge(
        &mut self,
        datastore: DatastoreType,
        path: &DataTreePath,
        node: NormalizedNode,
    ) -> Result<(), RestconfError> {
        self.working(datastore).merge(path, node.clone())?;
        self.log.push(Modification {
            datastore,
            path: path.clone(),
            kind: ModificationKind::Merge(node),
        });
        Ok(())
    }

    /// Deleting something that does not exist is a no-op.
    pub fn delete(&mut self, datastore: DatastoreType, path: &DataTreePath) {
        self.working(datastore).remove(path);
        self.log.push(Modification {
            datastore,
            path: path.clone(),
            kind: ModificationKind::Delete,
        });
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.log
    }

    pub fn commit(self) -> Result<(), BackendError> {
        let store = Arc::clone(&self.store);
        let mut configuration = store.configuration.write();
        let mut operational = store.operational.write();

        let mut candidate_config = configuration.clone();
        let mut candidate_oper = operational.clone();
        for modification in &self.log {
            let target = match modification.datastore {
                DatastoreType::Configuration => &mut candidate_config,
                DatastoreType::Operational => &mut candidate_oper,
            };
            let applied = match &modification.kind {
                ModificationKind::Put(node) => target.put(&modification.path, node.clone()),
                ModificationKind::Merge(node) => target.merge(&modification.path, node.clone()),
                ModificationKind::Delete => {
                    target.remove(&modification.path);
                    Ok(())
                }
            };
            applied.map_err(|err| BackendError::new("commit", err.message()))?;
        }

        let cohorts = store.cohorts.read().clone();
        for (datastore, candidate) in [
            (DatastoreType::Configuration, &candidate_config),
            (DatastoreType::Operational, &candidate_oper),
        ] {
            let touched: Vec<Modification> = self
                .log
                .iter()
                .filter(|m| m.datastore == datastore)
                .cloned()
                .collect();
            if touched.is_empty() {
                continue;
            }
            for cohort in &cohorts {
                cohort
                    .can_commit(datastore, &touched, candidate)
                    .map_err(|reason| BackendError::new("commit", reason))?;
            }
        }

        *configuration = candidate_config;
        *operational = candidate_oper;
        debug!(tx = self.id, modifications = self.log.len(), "transaction committed");
        Ok(())
    }

    pub fn cancel(self) {
        trace!(tx = self.id, "transaction cancelled");
    }
}
