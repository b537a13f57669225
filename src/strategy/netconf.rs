//! Strategy that drives a remote device through lock, edit-config, commit
//! and unlock.
//!
//! The device lock is taken when the transaction begins. Any failure after
//! that point discards the candidate changes and releases the lock exactly
//! once before the error is returned; the transaction is then released and
//! rejects further use.

use crate::data::{DatastoreType, DataTreePath, NormalizedNode};
use crate::error::{BackendError, RestconfError};
use crate::strategy::{RestconfStrategy, RestconfTransaction};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// `operation` attribute of an edit-config request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    Create,
    Replace,
    Merge,
    Delete,
    Remove,
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditOperation::Create => "create",
            EditOperation::Replace => "replace",
            EditOperation::Merge => "merge",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{rpc} RPC failed: {message}")]
pub struct RpcError {
    pub rpc: String,
    pub message: String,
}

impl RpcError {
    pub fn new(rpc: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rpc: rpc.into(),
            message: message.into(),
        }
    }
}

impl From<RpcError> for BackendError {
    fn from(err: RpcError) -> Self {
        BackendError::new(err.rpc, err.message)
    }
}

impl From<RpcError> for RestconfError {
    fn from(err: RpcError) -> Self {
        RestconfError::from(BackendError::from(err))
    }
}

/// Operation contract of a remote management device. Wire encoding is the
/// implementor's business.
pub trait NetconfDataTreeService: Send + Sync {
    fn lock(&self) -> Result<(), RpcError>;

    fn unlock(&self) -> Result<(), RpcError>;

    fn get(&self, path: &DataTreePath) -> Result<Option<NormalizedNode>, RpcError>;

    fn get_config(&self, path: &DataTreePath) -> Result<Option<NormalizedNode>, RpcError>;

    fn edit_config(
        &self,
        operation: EditOperation,
        path: &DataTreePath,
        payload: Option<&NormalizedNode>,
    ) -> Result<(), RpcError>;

    fn commit(&self) -> Result<(), RpcError>;

    fn discard_changes(&self) -> Result<(), RpcError>;
}

#[derive(Clone)]
pub struct NetconfStrategy {
    service: Arc<dyn NetconfDataTreeService>,
}

impl fmt::Debug for NetconfStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetconfStrategy").finish_non_exhaustive()
    }
}

impl NetconfStrategy {
    pub fn new(service: Arc<dyn NetconfDataTreeService>) -> Self {
        Self { service }
    }
}

impl RestconfStrategy for NetconfStrategy {
    fn name(&self) -> &'static str {
        "netconf"
    }

    fn begin(&self) -> Result<Box<dyn RestconfTransaction>, RestconfError> {
        // Nothing is held yet, so a failed lock needs no cleanup.
        self.service.lock()?;
        debug!("device lock acquired");
        Ok(Box::new(NetconfTransaction {
            service: Arc::clone(&self.service),
            released: false,
        }))
    }

    fn read(
        &self,
        datastore: DatastoreType,
        path: &DataTreePath,
    ) -> Result<Option<NormalizedNode>, RestconfError> {
        let result = match datastore {
            DatastoreType::Configuration => self.service.get_config(path),
            DatastoreType::Operational => self.service.get(path),
        };
        Ok(result?)
    }
}

struct NetconfTransaction {
    service: Arc<dyn NetconfDataTreeService>,
    released: bool,
}

impl NetconfTransaction {
    fn ensure_open(&self, operation: &str) -> Result<(), RestconfError> {
        if self.released {
            return Err(RestconfError::backend(
                operation,
                "transaction was already released",
            ));
        }
        Ok(())
    }

    /// Discards candidate changes and drops the lock. Runs at most once.
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.service.discard_changes() {
            warn!(error = %err, "discard-changes failed while releasing device lock");
        }
        if let Err(err) = self.service.unlock() {
            warn!(error = %err, "unlock failed while releasing device lock");
        }
        debug!("device changes discarded and lock released");
    }

    fn fail(&mut self, err: RpcError) -> RestconfError {
        self.release();
        err.into()
    }

    fn edit(
        &mut self,
        operation: EditOperation,
        path: &DataTreePath,
        payload: Option<&NormalizedNode>,
    ) -> Result<(), RestconfError> {
        self.ensure_open("edit-config")?;
        self.service
            .edit_config(operation, path, payload)
            .map_err(|err| self.fail(err))
    }
}

impl RestconfTransaction for NetconfTransaction {
    fn exists(&mut self, path: &DataTreePath) -> Result<bool, RestconfError> {
        self.ensure_open("get-config")?;
        match self.service.get_config(path) {
            Ok(found) => Ok(found.is_some()),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn put(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.edit(EditOperation::Replace, path, Some(&node))
    }

    fn merge(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.edit(EditOperation::Merge, path, Some(&node))
    }

    fn create(&mut self, path: &DataTreePath, node: NormalizedNode) -> Result<(), RestconfError> {
        self.edit(EditOperation::Create, path, Some(&node))
    }

    fn delete(&mut self, path: &DataTreePath) -> Result<(), RestconfError> {
        self.edit(EditOperation::Delete, path, None)
    }

    fn remove(&mut self, path: &DataTreePath) -> Result<(), RestconfError> {
        self.edit(EditOperation::Remove, path, None)
    }

    fn commit(mut self: Box<Self>) -> Result<(), RestconfError> {
        self.ensure_open("commit")?;
        if let Err(err) = self.service.commit() {
            warn!(error = %err, "device commit failed");
            return Err(self.fail(err));
        }
        self.released = true;
        if let Err(err) = self.service.unlock() {
            warn!(error = %err, "unlock after successful commit failed");
        }
        debug!("device changes committed");
        Ok(())
    }

    fn discard(mut self: Box<Self>) {
        self.release();
    }
}

impl Drop for NetconfTransaction {
    fn drop(&mut self) {
        self.release();
    }
}
